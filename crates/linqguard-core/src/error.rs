//! Error types for linqguard operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for workspace-level linqguard operations
#[derive(Debug, Error)]
pub enum LinqGuardError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fix could not be applied to a file
    #[error("Fix error in '{path}': {message}")]
    FixError { path: PathBuf, message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    Fix,
}

impl LinqGuardError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinqGuardError::ConfigError { .. } => ErrorKind::Config,
            LinqGuardError::IoError { .. } => ErrorKind::Io,
            LinqGuardError::FixError { .. } => ErrorKind::Fix,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io | ErrorKind::Fix)
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a fix error for a file
    pub fn fix_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FixError {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for LinqGuardError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
