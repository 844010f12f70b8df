//! Reading an input file into a typed [`Table`].
//!
//! The [`Ingestor`] reads the raw bytes, decides their encoding, parses the
//! decoded text as delimited data, and infers a semantic type per column.
//! Any failure here is fatal to a run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use term_explore::sources::Ingestor;
//!
//! let dataset = Ingestor::default().load("data/media.csv").unwrap();
//! println!(
//!     "{} rows in {}",
//!     dataset.table.num_rows(),
//!     dataset.encoding.name()
//! );
//! ```

mod csv;
mod encoding;
mod error;

pub use self::csv::{
    detect_delimiter, parse_delimited, CsvOptions, ParsedCsv, DEFAULT_NA_VALUES,
};
pub use encoding::{detect_encoding, DetectedEncoding, DetectionMethod};
pub use error::IngestionError;

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use encoding_rs::Encoding;
use tracing::{info, instrument};

use crate::analyzers::inference::{parse_boolean, parse_number, TypeInferenceEngine};
use crate::config::AnalysisConfig;
use crate::table::{SemanticType, Table};

/// A parsed dataset together with how it was read.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub table: Table,
    pub encoding: DetectedEncoding,
    pub delimiter: u8,
}

/// Loads delimited files of unknown encoding.
#[derive(Debug, Clone)]
pub struct Ingestor {
    options: CsvOptions,
    default_encoding: &'static Encoding,
    inference: TypeInferenceEngine,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(CsvOptions::default(), encoding_rs::UTF_8)
    }
}

impl Ingestor {
    /// Creates an ingestor with explicit parsing options and fallback encoding.
    pub fn new(options: CsvOptions, default_encoding: &'static Encoding) -> Self {
        Self {
            options,
            default_encoding,
            inference: TypeInferenceEngine::new(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.csv.clone(), config.default_encoding)
    }

    /// Reads, decodes, parses, and types the file at `path`.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadedDataset, IngestionError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| IngestionError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let encoding = detect_encoding(&bytes, self.default_encoding);
        let text = encoding
            .decode(&bytes)
            .ok_or_else(|| IngestionError::Decode {
                path: path.to_path_buf(),
                encoding: encoding.name().to_string(),
            })?;

        let parsed = parse_delimited(&text, &self.options, path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let table = self.build_table(name, parsed.headers, parsed.columns)?;

        info!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            encoding = encoding.name(),
            method = ?encoding.method,
            "Loaded dataset"
        );

        Ok(LoadedDataset {
            table,
            encoding,
            delimiter: parsed.delimiter,
        })
    }

    /// Types raw string columns and assembles them into a [`Table`].
    pub fn build_table(
        &self,
        name: impl Into<String>,
        headers: Vec<String>,
        columns: Vec<Vec<Option<String>>>,
    ) -> Result<Table, IngestionError> {
        let mut typed = Vec::with_capacity(headers.len());
        for (header, cells) in headers.into_iter().zip(columns) {
            let views: Vec<Option<&str>> = cells.iter().map(|c| c.as_deref()).collect();
            let inferred = self.inference.infer(&views);
            tracing::debug!(
                column = %header,
                semantic_type = %inferred.semantic_type,
                confidence = inferred.confidence,
                nulls = inferred.null_count,
                "Inferred column type"
            );
            let array = to_array(&views, inferred.semantic_type);
            typed.push((header, inferred.semantic_type, array));
        }
        Ok(Table::try_new(name, typed)?)
    }
}

fn to_array(values: &[Option<&str>], semantic_type: SemanticType) -> ArrayRef {
    match semantic_type {
        SemanticType::Numeric => Arc::new(
            values
                .iter()
                .map(|v| v.and_then(parse_number))
                .collect::<Float64Array>(),
        ),
        SemanticType::Boolean => Arc::new(
            values
                .iter()
                .map(|v| v.and_then(parse_boolean))
                .collect::<BooleanArray>(),
        ),
        SemanticType::Categorical | SemanticType::Temporal | SemanticType::Unknown => {
            Arc::new(values.iter().copied().collect::<StringArray>())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_load_types_columns() {
        let file = write_file(
            b"id,flag,when,label,empty\n1,yes,2024-01-01,a,\n2,no,2024-01-02,b,NA\n",
        );
        let dataset = Ingestor::default().load(file.path()).unwrap();
        let table = &dataset.table;

        assert_eq!(table.num_rows(), 2);
        assert_eq!(
            table.semantic_types(),
            &[
                SemanticType::Numeric,
                SemanticType::Boolean,
                SemanticType::Temporal,
                SemanticType::Categorical,
                SemanticType::Unknown,
            ]
        );
        assert_eq!(dataset.encoding.method, DetectionMethod::Ascii);
        assert_eq!(dataset.delimiter, b',');
    }

    #[test]
    fn test_missing_file() {
        let err = Ingestor::default()
            .load("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, IngestionError::Open { .. }));
    }

    #[test]
    fn test_table_is_named_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media.csv");
        std::fs::write(&path, "a\n1\n").unwrap();
        let dataset = Ingestor::default().load(&path).unwrap();
        assert_eq!(dataset.table.name(), "media.csv");
    }

    #[test]
    fn test_numeric_missing_cells_are_null() {
        let file = write_file(b"x\n1\n\n3\nNaN\n");
        let dataset = Ingestor::default().load(file.path()).unwrap();
        assert_eq!(dataset.table.numeric_values(0).unwrap(), vec![1.0, 3.0]);
    }
}
