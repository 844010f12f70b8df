//! Error types for the term-explore analysis pipeline.
//!
//! All fatal failures surface as [`TermError`]. Stage-level failures keep their
//! own error types ([`IngestionError`], [`RenderError`], and friends); analysis
//! failures never get here because the runner turns them into degradations.

use thiserror::Error;

use crate::render::RenderError;
use crate::sources::IngestionError;

/// The main error type for term-explore.
///
/// Only ingestion failures, missing credentials, and failures to persist the
/// final report reach this type. Every other problem is recorded as a
/// degradation and the pipeline carries on.
#[derive(Error, Debug)]
pub enum TermError {
    /// The input file could not be read, decoded, or parsed.
    #[error("Ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),

    /// Error related to configuration (for example a missing credential).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, TermError>`.
pub type Result<T> = std::result::Result<T, TermError>;

impl TermError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true when the error originates from reading the input dataset.
    pub fn is_ingestion(&self) -> bool {
        matches!(self, TermError::Ingestion(_))
    }
}

impl From<RenderError> for TermError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(e) => Self::Io(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<TermError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| wrap(msg, e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap(&f(), e.into()))
    }
}

fn wrap(msg: &str, error: TermError) -> TermError {
    match error {
        // Keep the variant so callers can still branch on ingestion and config failures.
        TermError::Configuration(inner) => TermError::Configuration(format!("{msg}: {inner}")),
        TermError::Internal(inner) => TermError::Internal(format!("{msg}: {inner}")),
        other @ TermError::Ingestion(_) => other,
        other => TermError::Internal(format!("{msg}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_configuration_error_display() {
        let err = TermError::configuration("AIPROXY_TOKEN is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: AIPROXY_TOKEN is not set"
        );
    }

    #[test]
    fn test_ingestion_error_converts() {
        let err: TermError = IngestionError::Empty {
            path: PathBuf::from("data.csv"),
        }
        .into();
        assert!(err.is_ingestion());
        assert!(err.to_string().contains("data.csv"));
    }

    #[test]
    fn test_error_context() {
        fn failing_operation() -> Result<()> {
            Err(TermError::Internal("Something went wrong".to_string()))
        }

        let err = failing_operation()
            .context("While writing the report")
            .unwrap_err();
        assert!(err.to_string().contains("While writing the report"));
        assert!(err.to_string().contains("Something went wrong"));
    }

    #[test]
    fn test_report_write_failure_converts() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("README.md");

        let err: TermError = crate::render::persist(&target, b"report").unwrap_err().into();
        assert!(matches!(err, TermError::Io(_)));

        let err: TermError = RenderError::Drawing("bad axis".to_string()).into();
        assert!(matches!(err, TermError::Internal(_)));
    }

    #[test]
    fn test_context_keeps_configuration_variant() {
        let result: Result<()> = Err(TermError::configuration("missing token"));
        let err = result.with_context(|| "Loading settings".to_string()).unwrap_err();
        assert!(matches!(err, TermError::Configuration(_)));
    }
}
