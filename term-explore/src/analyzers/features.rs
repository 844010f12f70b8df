//! The numeric, null-free feature matrix shared by projection and clustering.

use arrow::array::Array;
use serde::Serialize;

use super::{AnalyzerError, AnalyzerResult};
use crate::table::{ColumnData, Table};

/// Row-major numeric matrix built from a table's numeric columns.
///
/// Rows with a missing value in any selected column are dropped; `rows`
/// keeps the source index of every retained row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<usize>,
    data: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Selects every numeric column of `table` and its complete rows.
    pub fn from_table(table: &Table) -> AnalyzerResult<Self> {
        let numeric = table.numeric_columns();
        let mut arrays = Vec::with_capacity(numeric.len());
        for &index in &numeric {
            match table.column(index)? {
                ColumnData::Numeric(array) => arrays.push(array),
                _ => {
                    return Err(AnalyzerError::invalid_data(format!(
                        "column '{}' is not stored as numbers",
                        table.column_name(index)
                    )))
                }
            }
        }

        let mut rows = Vec::new();
        let mut data = Vec::new();
        if !arrays.is_empty() {
            for row in 0..table.num_rows() {
                let values: Option<Vec<f64>> = arrays
                    .iter()
                    .map(|array| (!array.is_null(row)).then(|| array.value(row)))
                    .collect();
                if let Some(values) = values {
                    rows.push(row);
                    data.push(values);
                }
            }
        }

        Ok(Self {
            columns: numeric
                .iter()
                .map(|&i| table.column_name(i).to_string())
                .collect(),
            rows,
            data,
        })
    }

    /// Builds a matrix directly from rows of values.
    pub fn from_rows(columns: Vec<String>, data: Vec<Vec<f64>>) -> AnalyzerResult<Self> {
        if let Some(bad) = data.iter().position(|r| r.len() != columns.len()) {
            return Err(AnalyzerError::invalid_data(format!(
                "row {bad} has {} values for {} columns",
                data[bad].len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            rows: (0..data.len()).collect(),
            data,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.data.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.columns.is_empty()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index]
    }

    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    /// Column means.
    pub fn means(&self) -> Vec<f64> {
        let n = self.n_rows().max(1) as f64;
        (0..self.n_cols())
            .map(|j| self.data.iter().map(|r| r[j]).sum::<f64>() / n)
            .collect()
    }

    /// Centers every column and scales it to unit population variance.
    ///
    /// Constant columns are only centered.
    pub fn standardized(&self) -> FeatureMatrix {
        let means = self.means();
        let n = self.n_rows().max(1) as f64;
        let scales: Vec<f64> = (0..self.n_cols())
            .map(|j| {
                let var = self.data.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                if std > 0.0 && std.is_finite() {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        let data = self
            .data
            .iter()
            .map(|r| {
                r.iter()
                    .enumerate()
                    .map(|(j, v)| (v - means[j]) / scales[j])
                    .collect()
            })
            .collect();
        FeatureMatrix {
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            data,
        }
    }
}

/// Euclidean distance between two equally long vectors.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
