//! Error types for the core crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for model, configuration and registry operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(appstore::core::config),
        help("Check the configuration file and APPSTORE_* environment variables")
    )]
    Configuration {
        /// Description of the problem
        message: String,
    },

    /// Input failed validation
    #[error("Validation error: {message}")]
    #[diagnostic(code(appstore::core::validation))]
    Validation {
        /// Description of the problem
        message: String,
    },

    /// A referenced record does not exist
    #[error("{kind} {id} not found")]
    #[diagnostic(code(appstore::core::not_found))]
    NotFound {
        /// Record kind, e.g. "source"
        kind: &'static str,
        /// Record identity
        id: String,
    },

    /// A uniqueness constraint was violated
    #[error("{kind} already exists: {key}")]
    #[diagnostic(code(appstore::core::conflict))]
    Conflict {
        /// Record kind
        kind: &'static str,
        /// Conflicting business key
        key: String,
    },

    /// I/O failure on persisted state
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(appstore::core::io),
        help("Check file permissions and available disk space")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path involved, if any
        path: Option<Box<Path>>,
        /// Operation that failed
        operation: String,
    },

    /// Persisted state could not be encoded or decoded
    #[error("Serialization error: {message}")]
    #[diagnostic(code(appstore::core::serialization))]
    Serialization {
        /// Description of the problem
        message: String,
    },

    /// Failure bubbled up from the disk cache
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] appstore_cache::Error),
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a not-found error
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create a conflict error
    #[must_use]
    pub fn conflict(kind: &'static str, key: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            key: key.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;
