//! Errors raised while producing one image artifact.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Errors that can occur while producing one artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The chart could not be drawn.
    #[error("Drawing failed: {0}")]
    Drawing(String),

    /// The output directory could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The finished file could not be moved into place.
    #[error("Failed to persist artifact: {0}")]
    Persist(String),
}

impl<E> From<DrawingAreaErrorKind<E>> for RenderError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

impl From<tempfile::PersistError> for RenderError {
    fn from(err: tempfile::PersistError) -> Self {
        RenderError::Persist(err.error.to_string())
    }
}
