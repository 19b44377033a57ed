use std::io;

use protocol::NegotiationError;
use thiserror::Error;

use crate::exit_code::ExitCode;

/// Failure of a command invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    /// An rsync-level failure with the exit code the client should see.
    #[error("{message}")]
    Rsync {
        /// Exit code reported to the client.
        code: ExitCode,
        /// Human-readable description.
        message: String,
    },

    /// Stream or file I/O failed outside a more specific context.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The invocation was destroyed while running.
    #[error("command interrupted")]
    Interrupted,

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl CommandError {
    /// Builds an [`CommandError::Rsync`] error.
    pub fn rsync(code: ExitCode, message: impl Into<String>) -> Self {
        Self::Rsync {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a protocol violation by the client.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::rsync(ExitCode::Protocol, message)
    }
}

impl From<NegotiationError> for CommandError {
    fn from(error: NegotiationError) -> Self {
        Self::protocol(error.to_string())
    }
}
