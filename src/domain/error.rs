//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the parse tree and endpoint invariants.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed parse tree at {path}: {reason}")]
    MalformedTree { path: String, reason: String },

    #[error("invalid backend address '{address}': {reason}")]
    InvalidEndpoint { address: String, reason: String },
}

impl DomainError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
