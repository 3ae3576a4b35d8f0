//! Crate-level error.

use std::io;

use thiserror::Error;

use crate::config::loader::{ConfigError, LoadError};
use crate::config::validation::ValidationError;
use crate::task::dispatcher::DispatchError;
use crate::task::resolver::{TaskType, UnsupportedCombinationError};

/// Every failure the command line can report.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file is missing, unreadable or structurally invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A section failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The extract/sink pair has no task type.
    #[error(transparent)]
    UnsupportedCombination(#[from] UnsupportedCombinationError),

    /// The execution engine refused or failed the task.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A mode command was run against a configuration for another task type.
    #[error("command expects a {expected} task but the configuration resolves to {resolved}")]
    CommandMismatch { expected: TaskType, resolved: TaskType },

    #[error("invalid log level '{0}', expected one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render TOML: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Config(e) => Error::Config(e),
            LoadError::Validation(e) => Error::Validation(e),
        }
    }
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Result type for command-line operations.
pub type Result<T> = std::result::Result<T, Error>;
