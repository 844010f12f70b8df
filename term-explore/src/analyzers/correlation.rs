//! Pairwise Pearson correlation between numeric columns.
//!
//! Each pair uses only the rows where both columns have a value. A
//! coefficient is `None` when a pair has fewer than two such rows or when
//! either side is constant over them.

use arrow::array::Float64Array;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{Analyzer, AnalyzerError, AnalyzerResult, Applicability, NotApplicableReason};
use crate::table::{ColumnData, Table};

/// A correlation coefficient between two named columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub coefficient: f64,
}

/// Square, symmetric matrix of Pearson coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.values.get(row)?.get(column).copied().flatten()
    }

    pub fn get_by_name(&self, left: &str, right: &str) -> Option<f64> {
        let row = self.columns.iter().position(|c| c == left)?;
        let column = self.columns.iter().position(|c| c == right)?;
        self.get(row, column)
    }

    /// The `k` off-diagonal pairs with the largest absolute coefficient.
    pub fn strongest_pairs(&self, k: usize) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..self.size() {
            for j in (i + 1)..self.size() {
                if let Some(coefficient) = self.get(i, j) {
                    pairs.push(CorrelationPair {
                        left: self.columns[i].clone(),
                        right: self.columns[j].clone(),
                        coefficient,
                    });
                }
            }
        }
        pairs.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
        pairs.truncate(k);
        pairs
    }
}

/// Pearson coefficient over the rows where both values are present.
pub fn pearson(x: &Float64Array, y: &Float64Array) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| Some((a?, b?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Computes a [`CorrelationMatrix`] over all numeric columns.
#[derive(Debug, Clone, Default)]
pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Minimum number of numeric columns for a matrix.
    pub const MIN_COLUMNS: usize = 2;

    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for CorrelationAnalyzer {
    type Output = Applicability<CorrelationMatrix>;

    fn name(&self) -> &str {
        "correlation"
    }

    fn description(&self) -> &str {
        "Pairwise-complete Pearson correlation of numeric columns"
    }

    #[instrument(skip(self, table), fields(rows = table.num_rows()))]
    fn analyze(&self, table: &Table) -> AnalyzerResult<Self::Output> {
        let numeric = table.numeric_columns();
        if numeric.len() < Self::MIN_COLUMNS {
            return Ok(Applicability::NotApplicable(
                NotApplicableReason::TooFewNumericColumns {
                    found: numeric.len(),
                    required: Self::MIN_COLUMNS,
                },
            ));
        }

        let arrays = numeric
            .iter()
            .map(|&index| match table.column(index)? {
                ColumnData::Numeric(array) => Ok(array),
                _ => Err(AnalyzerError::invalid_data(format!(
                    "column '{}' is not stored as numbers",
                    table.column_name(index)
                ))),
            })
            .collect::<AnalyzerResult<Vec<&Float64Array>>>()?;

        let size = arrays.len();
        let mut values = vec![vec![None; size]; size];
        for i in 0..size {
            for j in i..size {
                let r = if i == j {
                    pearson(arrays[i], arrays[i]).map(|_| 1.0)
                } else {
                    pearson(arrays[i], arrays[j])
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        let columns: Vec<String> = numeric
            .iter()
            .map(|&index| table.column_name(index).to_string())
            .collect();
        debug!(columns = size, "Computed correlation matrix");
        Ok(Applicability::Applicable(CorrelationMatrix { columns, values }))
    }
}
