//! Errors raised while reading an input dataset.

use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Errors that abort ingestion. Every variant is fatal to a pipeline run.
#[derive(Error, Debug)]
pub enum IngestionError {
    /// The file could not be opened or read.
    #[error("Cannot read '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not valid in the chosen encoding.
    #[error("Content of '{}' is not valid {encoding}", path.display())]
    Decode { path: PathBuf, encoding: String },

    /// The decoded text is not well-formed delimited data.
    #[error("Malformed tabular data in '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The file has no header row.
    #[error("'{}' contains no header row", path.display())]
    Empty { path: PathBuf },

    /// Building the in-memory table failed.
    #[error("Failed to build table: {0}")]
    Arrow(#[from] ArrowError),
}

impl IngestionError {
    /// Creates a parse error for `path`.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_file() {
        let err = IngestionError::Decode {
            path: PathBuf::from("data.csv"),
            encoding: "UTF-16LE".to_string(),
        };
        assert_eq!(err.to_string(), "Content of 'data.csv' is not valid UTF-16LE");

        let err = IngestionError::parse("data.csv", "record 3 has 2 fields, expected 3");
        assert!(err.to_string().contains("record 3"));
    }
}
