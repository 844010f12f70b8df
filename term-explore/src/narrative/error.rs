//! Errors from the narrative service client.

use thiserror::Error;

/// Errors that can occur when calling the narrative service.
///
/// None of these is fatal: the pipeline turns every one of them into a
/// placeholder narrative.
#[derive(Debug, Error)]
pub enum NarrativeError {
    /// Network error (connection refused, TLS failure, and so on).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The service answered with a non-success status.
    #[error("Service returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The request or response body could not be (de)serialized.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The HTTP client could not be built.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Result type for narrative operations.
pub type NarrativeResult<T> = std::result::Result<T, NarrativeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = NarrativeError::HttpStatus {
            status: 401,
            body: "invalid token".to_string(),
        };
        assert_eq!(err.to_string(), "Service returned HTTP 401: invalid token");
    }
}
