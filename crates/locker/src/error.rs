//! Error types for locker storage

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Locker errors
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O failure reading a locker file
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(code(appstore::locker::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path involved, if any
        path: Option<Box<Path>>,
        /// What was being attempted
        operation: String,
    },

    /// A locker file did not decode
    #[error("Locker file {} is invalid: {message}", path.display())]
    #[diagnostic(
        code(appstore::locker::invalid),
        help("The file must be a JSON array of locker entries")
    )]
    Invalid {
        /// Offending file
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// Locker backend unavailable
    #[error("Locker unavailable: {message}")]
    #[diagnostic(code(appstore::locker::unavailable))]
    Unavailable {
        /// Reason
        message: String,
    },

    /// Core error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] appstore_core::Error),
}

impl Error {
    /// Create an I/O error with path context
    #[must_use]
    pub fn io(source: std::io::Error, path: impl AsRef<Path>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create an invalid-file error
    #[must_use]
    pub fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an unavailable error
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable {
            message: msg.into(),
        }
    }
}

/// Result type for locker operations
pub type Result<T> = std::result::Result<T, Error>;
