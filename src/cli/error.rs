//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    /// Backend rejected the expression
    #[error("invalid expression: {0}")]
    Rejected(String),

    /// Backend could not be reached or answered unusably
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Rejected(_) => crate::exitcode::DATAERR,
            CliError::Unavailable(_) => crate::exitcode::UNAVAILABLE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Transport(_) => crate::exitcode::UNAVAILABLE,
                InfraError::Application(app) => match app {
                    ApplicationError::EmptyExpression => crate::exitcode::USAGE,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Domain(DomainError::InvalidEndpoint { .. }) => {
                        crate::exitcode::CONFIG
                    }
                    ApplicationError::Domain(DomainError::MalformedTree { .. }) => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_error_kinds_when_mapping_exit_codes_then_sysexits() {
        assert_eq!(CliError::Rejected("x".into()).exit_code(), exitcode::DATAERR);
        assert_eq!(CliError::Unavailable("x".into()).exit_code(), exitcode::UNAVAILABLE);
        assert_eq!(CliError::from(ApplicationError::EmptyExpression).exit_code(), exitcode::USAGE);
        assert_eq!(
            CliError::from(ApplicationError::Config { message: "bad".into() }).exit_code(),
            exitcode::CONFIG
        );
        assert_eq!(
            CliError::from(InfraError::io("write", std::io::Error::other("disk full"))).exit_code(),
            exitcode::IOERR
        );
    }
}
