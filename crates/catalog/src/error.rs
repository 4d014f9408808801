//! Error types for catalog transport and search
//!
//! These never cross the public fetcher boundary: [`crate::SourceClient`]
//! logs them and degrades to `None` or an empty list.

use miette::Diagnostic;
use thiserror::Error;

/// Catalog errors
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Network or timeout failure
    #[error("Request to {url} failed")]
    #[diagnostic(
        code(appstore::catalog::transport),
        help("The source may be offline; cached data is used where available")
    )]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response
    #[error("{url} answered HTTP {status}")]
    #[diagnostic(code(appstore::catalog::status))]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// Body did not decode into the expected shape
    #[error("Could not decode response from {url}: {message}")]
    #[diagnostic(code(appstore::catalog::decode))]
    Decode {
        /// Requested URL
        url: String,
        /// Decoder message
        message: String,
    },

    /// Search requested against a source without search-index credentials
    #[error("Source {source_url} has no search-index credentials")]
    #[diagnostic(
        code(appstore::catalog::missing_search_credentials),
        help("Re-seed the default sources or add credentials to the source")
    )]
    MissingSearchCredentials {
        /// Base URL of the source
        source_url: String,
    },

    /// HTTP client could not be built
    #[error("Configuration error: {message}")]
    #[diagnostic(code(appstore::catalog::config))]
    Configuration {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a transport error
    #[must_use]
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Create a status error
    #[must_use]
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Create a decode error
    #[must_use]
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a missing-credentials error
    #[must_use]
    pub fn missing_search_credentials(source_url: impl Into<String>) -> Self {
        Self::MissingSearchCredentials {
            source_url: source_url.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message() {
        let err = Error::status("https://a.test/api/v1/home/apps", 503);
        assert_eq!(
            err.to_string(),
            "https://a.test/api/v1/home/apps answered HTTP 503"
        );
    }

    #[test]
    fn missing_credentials_message() {
        let err = Error::missing_search_credentials("https://a.test/api");
        assert!(err.to_string().contains("https://a.test/api"));
    }
}
