// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regex compilation failed
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A page did not have the structure an extractor expects
    #[error("Extraction error for {context}: {message}")]
    Extract { context: String, message: String },

    /// Pairings page matches neither the bracket nor the table layout
    #[error("Unrecognized pairings layout at {url}")]
    UnknownPairingLayout { url: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an extraction error with context.
    pub fn extract(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extract {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure came from the network and may succeed on retry.
    ///
    /// Local I/O and extraction failures are never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = AppError::Status {
            url: "/x".into(),
            status: 503,
        };
        assert!(err.is_transient());

        let err = AppError::Status {
            url: "/x".into(),
            status: 429,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = AppError::Status {
            url: "/x".into(),
            status: 404,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn local_failures_are_not_transient() {
        let io = AppError::Io(std::io::Error::other("disk full"));
        assert!(!io.is_transient());
        assert!(!AppError::extract("listing", "missing data-max").is_transient());
        assert!(
            !AppError::UnknownPairingLayout {
                url: "/tournament/x/pairings".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn extract_error_display() {
        let err = AppError::extract("standings /tournament/abc", "missing data-name");
        assert_eq!(
            err.to_string(),
            "Extraction error for standings /tournament/abc: missing data-name"
        );
    }
}
