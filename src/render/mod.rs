//! Drawing adapters: SVG diagram surface and HTML helpers
//!
//! Geometry comes from [`crate::domain::layout`]; this layer only turns it
//! into markup.

pub mod html;
pub mod surface;
pub mod svg;

pub use surface::{DiagramSurface, NodeElement, SvgElement};
pub use svg::{DiagramRenderer, DiagramStyle};
