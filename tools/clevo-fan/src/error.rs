use crate::cli::UsageError;
use ec_protocol::EcError;
use std::io;

/// A `set` value that never reaches the controller.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid duty: {0}")]
    NotANumber(String),
    #[error("Invalid duty: {0}. Must be between 0 and 100")]
    OutOfRange(String),
}

/// Why a command failed.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("ec_init: {0}")]
    Init(#[source] EcError),

    #[error("ec_read: {0}")]
    Read(#[source] EcError),

    #[error("ec_write: {0}")]
    Write(#[source] EcError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CliError {
    /// Usage errors are followed by the command's usage text.
    #[must_use]
    pub const fn wants_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}
