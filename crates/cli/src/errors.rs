//! CLI-specific errors with miette diagnostics

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Invalid command line argument: {argument}")]
    #[diagnostic(code(appstore::cli::invalid_argument))]
    InvalidArgument {
        argument: String,
        #[help]
        suggestion: Option<String>,
    },

    #[error("Nothing found for {what}")]
    #[diagnostic(
        code(appstore::cli::not_found),
        help("Check the id, enable more sources, or retry with --refresh")
    )]
    NotFound { what: String },

    #[error("Failed to render output")]
    #[diagnostic(code(appstore::cli::output))]
    Output {
        #[source]
        source: serde_json::Error,
    },
}

impl CliError {
    pub fn invalid_argument(argument: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_carries_help() {
        let err = CliError::invalid_argument("--hardware", "pass --hardware basalt");
        assert_eq!(err.to_string(), "Invalid command line argument: --hardware");
        assert_eq!(
            err.help().map(|h| h.to_string()).as_deref(),
            Some("pass --hardware basalt")
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = CliError::not_found("app abc");
        assert_eq!(err.to_string(), "Nothing found for app abc");
        assert!(err.code().is_some());
    }
}
