//! Error types for the analyzer framework.

use thiserror::Error;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur during analyzer operations.
///
/// "Not applicable" is not an error; see [`Applicability`](super::Applicability).
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Data type mismatch or invalid data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error occurred while computing a metric.
    #[error("Failed to compute metric: {0}")]
    MetricComputation(String),

    /// Arrow computation error.
    #[error("Arrow computation failed: {0}")]
    ArrowComputation(#[from] arrow::error::ArrowError),

    /// A clustering algorithm failed.
    #[error(transparent)]
    Clustering(#[from] ClusteringError),
}

impl AnalyzerError {
    /// Creates an invalid data error with the given message.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Creates a metric computation error with the given message.
    pub fn metric_computation(msg: impl Into<String>) -> Self {
        Self::MetricComputation(msg.into())
    }
}

/// Numeric failures inside a clustering algorithm.
///
/// These never abort a run; the pipeline records them and omits the
/// corresponding artifact.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusteringError {
    /// A pairwise distance was NaN or infinite.
    #[error("{algorithm}: encountered a non-finite distance")]
    NonFiniteDistance { algorithm: &'static str },

    /// The input exceeds the configured size limit.
    #[error("{algorithm}: {rows} rows exceed the limit of {limit}")]
    TooManyRows {
        algorithm: &'static str,
        rows: usize,
        limit: usize,
    },

    /// Any other numeric inconsistency.
    #[error("{algorithm}: {message}")]
    Numeric {
        algorithm: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clustering_error_is_transparent() {
        let err: AnalyzerError = ClusteringError::TooManyRows {
            algorithm: "ward",
            rows: 10,
            limit: 5,
        }
        .into();
        assert_eq!(err.to_string(), "ward: 10 rows exceed the limit of 5");
    }
}
