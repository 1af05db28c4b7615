//! bodmas-viz: client for a BODMAS arithmetic parse service
//!
//! Submits expressions to the evaluation backend, explains rejections and
//! draws the returned parse trees as SVG.
//!
//! Layers, inner to outer:
//! - [`domain`]: parse trees, layout, failure classification
//! - [`render`]: SVG drawing adapter
//! - [`application`]: probes, submission, session and results view
//! - [`infrastructure`]: HTTP and filesystem implementations, DI container
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod render;
pub mod util;
