//! Domain layer: parse trees, layout and failure classification
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod convert;
pub mod entities;
pub mod error;
pub mod examples;
pub mod explain;
pub mod layout;

pub use arena::{Hierarchy, NodeData, TreeNode};
pub use convert::{to_layout, TreeDisplay};
pub use entities::*;
pub use error::DomainError;
pub use examples::{example, ExampleExpression, DEFAULT_EXPRESSION, EXAMPLES};
pub use explain::{classify, ErrorCategory, FailureReport, Guidance};
pub use layout::{compute, tidy_layout, Diagram, Extent, Link, Point, PositionedNode};
