//! The in-memory table shared by every analysis stage.
//!
//! A [`Table`] is an Arrow [`RecordBatch`] plus the semantic type inferred for
//! each column. It is created once by the ingestor and never mutated; derived
//! views (for example a table with cluster labels attached) are new tables.

use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

/// Semantic type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Finite numbers, stored as `Float64`.
    Numeric,
    /// Free text or categories, stored as `Utf8`.
    Categorical,
    /// Boolean literals, stored as `Boolean`.
    Boolean,
    /// Dates and timestamps, stored as their source text.
    Temporal,
    /// No value was present, so no type could be inferred.
    Unknown,
}

impl SemanticType {
    /// The Arrow type used to store a column of this semantic type.
    pub fn storage_type(&self) -> DataType {
        match self {
            SemanticType::Numeric => DataType::Float64,
            SemanticType::Boolean => DataType::Boolean,
            SemanticType::Categorical | SemanticType::Temporal | SemanticType::Unknown => {
                DataType::Utf8
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Numeric => "numeric",
            SemanticType::Categorical => "categorical",
            SemanticType::Boolean => "boolean",
            SemanticType::Temporal => "temporal",
            SemanticType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed, borrowed access to one column's values.
#[derive(Debug, Clone, Copy)]
pub enum ColumnData<'a> {
    Numeric(&'a Float64Array),
    Boolean(&'a BooleanArray),
    Text(&'a StringArray),
}

impl ColumnData<'_> {
    /// Number of null entries.
    pub fn null_count(&self) -> usize {
        match self {
            ColumnData::Numeric(a) => a.null_count(),
            ColumnData::Boolean(a) => a.null_count(),
            ColumnData::Text(a) => a.null_count(),
        }
    }

    /// Renders the value at `row` as text, or `None` when missing.
    pub fn display_value(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Numeric(a) => (!a.is_null(row)).then(|| a.value(row).to_string()),
            ColumnData::Boolean(a) => (!a.is_null(row)).then(|| a.value(row).to_string()),
            ColumnData::Text(a) => (!a.is_null(row)).then(|| a.value(row).to_string()),
        }
    }
}

/// An ordered set of equally long, typed columns.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    batch: RecordBatch,
    types: Vec<SemanticType>,
}

impl Table {
    /// Builds a table from named, typed columns.
    ///
    /// Fails when a column's Arrow type does not match its semantic type or
    /// the columns differ in length.
    pub fn try_new(
        name: impl Into<String>,
        columns: Vec<(String, SemanticType, ArrayRef)>,
    ) -> Result<Self, ArrowError> {
        if columns.is_empty() {
            return Err(ArrowError::InvalidArgumentError(
                "a table needs at least one column".to_string(),
            ));
        }

        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays = Vec::with_capacity(columns.len());
        let mut types = Vec::with_capacity(columns.len());
        for (column_name, semantic_type, array) in columns {
            let expected = semantic_type.storage_type();
            if array.data_type() != &expected {
                return Err(ArrowError::SchemaError(format!(
                    "column '{column_name}' is {semantic_type} but stored as {}, expected {expected}",
                    array.data_type()
                )));
            }
            fields.push(Field::new(column_name, expected, true));
            arrays.push(array);
            types.push(semantic_type);
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self {
            name: name.into(),
            batch,
            types,
        })
    }

    /// Name of the dataset, usually the source file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// The underlying Arrow batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Column names in source order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column_name(&self, index: usize) -> &str {
        self.batch.schema_ref().field(index).name()
    }

    pub fn semantic_type(&self, index: usize) -> SemanticType {
        self.types[index]
    }

    pub fn semantic_types(&self) -> &[SemanticType] {
        &self.types
    }

    /// Index of the column called `name`, if any.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.batch.schema_ref().index_of(name).ok()
    }

    /// Indices of the numeric columns, in source order.
    pub fn numeric_columns(&self) -> Vec<usize> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == SemanticType::Numeric)
            .map(|(i, _)| i)
            .collect()
    }

    /// Typed access to the column at `index`.
    pub fn column(&self, index: usize) -> Result<ColumnData<'_>, ArrowError> {
        let array = self.batch.column(index);
        let name = self.column_name(index);
        let cast_error =
            || ArrowError::CastError(format!("column '{name}' has an unexpected type"));
        match self.types[index] {
            SemanticType::Numeric => array
                .as_any()
                .downcast_ref::<Float64Array>()
                .map(ColumnData::Numeric)
                .ok_or_else(cast_error),
            SemanticType::Boolean => array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .map(ColumnData::Boolean)
                .ok_or_else(cast_error),
            _ => array
                .as_any()
                .downcast_ref::<StringArray>()
                .map(ColumnData::Text)
                .ok_or_else(cast_error),
        }
    }

    /// The non-missing values of a numeric column, in row order.
    pub fn numeric_values(&self, index: usize) -> Result<Vec<f64>, ArrowError> {
        match self.column(index)? {
            ColumnData::Numeric(array) => Ok(array.iter().flatten().collect()),
            _ => Err(ArrowError::CastError(format!(
                "column '{}' is not numeric",
                self.column_name(index)
            ))),
        }
    }

    /// Returns a new table holding `rows` (in the given order) plus a
    /// categorical column of labels. `self` is left untouched.
    pub fn with_cluster_labels(
        &self,
        rows: &[usize],
        labels: &[i32],
        label_column: &str,
    ) -> Result<Table, ArrowError> {
        if rows.len() != labels.len() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "{} rows selected but {} labels supplied",
                rows.len(),
                labels.len()
            )));
        }
        let indices = UInt32Array::from(
            rows.iter()
                .map(|&r| {
                    u32::try_from(r).map_err(|_| {
                        ArrowError::InvalidArgumentError(format!("row index {r} out of range"))
                    })
                })
                .collect::<Result<Vec<u32>, ArrowError>>()?,
        );

        let mut fields: Vec<Field> = self
            .batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        let mut arrays = self
            .batch
            .columns()
            .iter()
            .map(|column| take(column.as_ref(), &indices, None))
            .collect::<Result<Vec<ArrayRef>, ArrowError>>()?;

        // Labels are identifiers, not measurements; keep them out of numeric analyses.
        let label_array: StringArray = labels.iter().map(|l| Some(l.to_string())).collect();
        fields.push(Field::new(label_column, DataType::Utf8, true));
        arrays.push(Arc::new(label_array));

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        let mut types = self.types.clone();
        types.push(SemanticType::Categorical);
        Ok(Table {
            name: self.name.clone(),
            batch,
            types,
        })
    }
}
