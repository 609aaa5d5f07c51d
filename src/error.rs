//! Error taxonomy shared by the dispatcher, handlers and collaborators.
//!
//! Only [`GenieError::SetupValidation`] (and a closed stdin during setup) is
//! allowed to escape the dispatcher. Every other variant is caught by the
//! handler layer and printed inline.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenieError {
    /// Missing or malformed input from the user.
    #[error("{0}")]
    UserInput(String),

    /// Transport, quota or content failure reported by the remote service.
    #[error("{0}")]
    Remote(String),

    /// A freshly entered credential was rejected by the remote service.
    #[error("API key validation failed: {0}")]
    SetupValidation(String),

    #[error("{context}: {source}")]
    LocalIo {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Standard input reached end-of-file while a prompt was waiting.
    #[error("input closed")]
    InputClosed,

    #[error("config error: {0}")]
    Config(String),
}

impl GenieError {
    /// Wraps an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::LocalIo {
            context: context.into(),
            source,
        }
    }

    /// True for the failures that must terminate the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SetupValidation(_) | Self::InputClosed)
    }
}

pub type GenieResult<T> = std::result::Result<T, GenieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_validation_message_carries_cause() {
        let err = GenieError::SetupValidation("API key not valid".to_string());
        assert_eq!(err.to_string(), "API key validation failed: API key not valid");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_local_io_includes_context() {
        let err = GenieError::io(
            "Failed to read notes.txt",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().starts_with("Failed to read notes.txt"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_remote_and_user_input_are_not_fatal() {
        assert!(!GenieError::Remote("quota".to_string()).is_fatal());
        assert!(!GenieError::UserInput("empty".to_string()).is_fatal());
    }
}
