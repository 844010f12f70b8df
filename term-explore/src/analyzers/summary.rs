//! Per-column descriptive statistics.
//!
//! Numeric columns get count, mean, sample standard deviation, minimum,
//! quartiles, and maximum. Every other column gets the number of distinct
//! values and the most frequent value. A statistic that cannot be computed
//! (for example the mean of a column with no values) is `None`, never zero.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument};

use super::stats;
use super::types::serialize_pairs;
use super::{Analyzer, AnalyzerResult};
use crate::table::{ColumnData, SemanticType, Table};

/// Statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub semantic_type: SemanticType,
    /// Number of non-missing values.
    pub count: usize,
    pub missing: usize,
    pub distinct: Option<usize>,
    pub top: Option<String>,
    pub freq: Option<usize>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q1: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    fn empty(name: &str, semantic_type: SemanticType, count: usize, missing: usize) -> Self {
        Self {
            name: name.to_string(),
            semantic_type,
            count,
            missing,
            distinct: None,
            top: None,
            freq: None,
            mean: None,
            std: None,
            min: None,
            q1: None,
            median: None,
            q3: None,
            max: None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.semantic_type == SemanticType::Numeric
    }
}

/// Missing-value counts per column, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MissingValueReport {
    #[serde(serialize_with = "serialize_pairs")]
    counts: Vec<(String, usize)>,
}

impl MissingValueReport {
    pub fn get(&self, column: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Total number of missing cells in the table.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Summary of a whole table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnSummary>,
    pub missing: MissingValueReport,
    #[serde(serialize_with = "serialize_pairs")]
    pub column_types: Vec<(String, SemanticType)>,
}

impl DatasetSummary {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Summaries of the numeric columns only. Empty when there are none.
    pub fn numeric_columns(&self) -> Vec<&ColumnSummary> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }
}

/// Computes a [`DatasetSummary`].
#[derive(Debug, Clone, Default)]
pub struct Summarizer;

impl Summarizer {
    pub fn new() -> Self {
        Self
    }

    fn summarize_column(table: &Table, index: usize) -> AnalyzerResult<ColumnSummary> {
        let name = table.column_name(index);
        let semantic_type = table.semantic_type(index);
        let data = table.column(index)?;
        let missing = data.null_count();
        let count = table.num_rows() - missing;
        let mut summary = ColumnSummary::empty(name, semantic_type, count, missing);

        if count == 0 || semantic_type == SemanticType::Unknown {
            return Ok(summary);
        }

        match data {
            ColumnData::Numeric(array) => {
                let values: Vec<f64> = array.iter().flatten().collect();
                let sorted = stats::sorted(&values);
                summary.mean = stats::mean(&values);
                summary.std = stats::sample_std(&values);
                summary.min = sorted.first().copied();
                summary.max = sorted.last().copied();
                if let Some((q1, median, q3)) = stats::quartiles(&sorted) {
                    summary.q1 = Some(q1);
                    summary.median = Some(median);
                    summary.q3 = Some(q3);
                }
            }
            _ => {
                let values = (0..table.num_rows()).filter_map(|row| data.display_value(row));
                let (distinct, top) = frequencies(values);
                summary.distinct = Some(distinct);
                if let Some((value, freq)) = top {
                    summary.top = Some(value);
                    summary.freq = Some(freq);
                }
            }
        }
        Ok(summary)
    }
}

/// Distinct count and most frequent value. Ties go to the value seen first.
fn frequencies(values: impl Iterator<Item = String>) -> (usize, Option<(String, usize)>) {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        let entry = counts.entry(value.clone()).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }

    let mut top: Option<(String, usize)> = None;
    for value in order.iter() {
        let count = counts.get(value).copied().unwrap_or_default();
        if top.as_ref().map_or(true, |(_, best)| count > *best) {
            top = Some((value.clone(), count));
        }
    }
    (order.len(), top)
}

impl Analyzer for Summarizer {
    type Output = DatasetSummary;

    fn name(&self) -> &str {
        "summary"
    }

    fn description(&self) -> &str {
        "Descriptive statistics, missing values, and inferred types per column"
    }

    #[instrument(skip(self, table), fields(rows = table.num_rows(), columns = table.num_columns()))]
    fn analyze(&self, table: &Table) -> AnalyzerResult<DatasetSummary> {
        let mut columns = Vec::with_capacity(table.num_columns());
        for index in 0..table.num_columns() {
            let summary = Self::summarize_column(table, index)?;
            debug!(
                column = %summary.name,
                count = summary.count,
                missing = summary.missing,
                "Summarized column"
            );
            columns.push(summary);
        }

        let missing = MissingValueReport {
            counts: columns.iter().map(|c| (c.name.clone(), c.missing)).collect(),
        };
        let column_types = columns
            .iter()
            .map(|c| (c.name.clone(), c.semantic_type))
            .collect();

        Ok(DatasetSummary {
            row_count: table.num_rows(),
            column_count: table.num_columns(),
            columns,
            missing,
            column_types,
        })
    }
}
