//! Error types for the Aqueduct client.

use thiserror::Error;

/// Result type for Aqueduct operations.
pub type AqueductResult<T> = Result<T, AqueductError>;

/// Errors that can occur when talking to Aqueduct or handling its files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AqueductError {
    /// Experiment or file does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an unexpected status.
    #[error("Aqueduct API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or GraphQL error text.
        message: String,
    },

    /// Service URL could not be parsed.
    #[error("Invalid Aqueduct URL '{0}'")]
    InvalidUrl(String),

    /// Token contains characters not allowed in a header.
    #[error("Invalid API token")]
    InvalidToken,

    /// A result value cannot be written as an integer digit string.
    #[error("Format error: {0}")]
    Format(String),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = AqueductError::NotFound("experiment 'EXP-1'".into());
        assert!(err.to_string().contains("EXP-1"));
    }

    #[test]
    fn test_api_error_display() {
        let err = AqueductError::Api {
            status: 500,
            message: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AqueductError = io.into();
        assert!(matches!(err, AqueductError::Io(_)));
    }
}
