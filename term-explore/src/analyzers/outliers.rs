//! Interquartile-range outlier detection.

use serde::Serialize;
use tracing::{debug, instrument};

use super::stats;
use super::{Analyzer, AnalyzerResult};
use crate::table::Table;

/// Multiplier applied to the IQR to place the fences.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Outlier count for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierEntry {
    pub column: String,
    pub count: usize,
    pub lower_fence: f64,
    pub upper_fence: f64,
}

/// Outlier counts for every numeric column, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutlierReport {
    pub entries: Vec<OutlierEntry>,
}

impl OutlierReport {
    pub fn get(&self, column: &str) -> Option<&OutlierEntry> {
        self.entries.iter().find(|e| e.column == column)
    }

    /// `(column, count)` pairs.
    pub fn counts(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|e| (e.column.as_str(), e.count))
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flags values outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
///
/// The fences are inclusive, so a constant column has no outliers.
#[derive(Debug, Clone, Default)]
pub struct OutlierDetector;

impl OutlierDetector {
    pub fn new() -> Self {
        Self
    }

    /// Counts outliers in a slice of values. Returns `None` for an empty slice.
    pub fn detect(column: &str, values: &[f64]) -> Option<OutlierEntry> {
        let sorted = stats::sorted(values);
        let (q1, _, q3) = stats::quartiles(&sorted)?;
        let iqr = q3 - q1;
        let lower_fence = q1 - IQR_MULTIPLIER * iqr;
        let upper_fence = q3 + IQR_MULTIPLIER * iqr;
        let count = values
            .iter()
            .filter(|&&v| v < lower_fence || v > upper_fence)
            .count();
        Some(OutlierEntry {
            column: column.to_string(),
            count,
            lower_fence,
            upper_fence,
        })
    }
}

impl Analyzer for OutlierDetector {
    type Output = OutlierReport;

    fn name(&self) -> &str {
        "outliers"
    }

    fn description(&self) -> &str {
        "Counts numeric values outside the 1.5 IQR fences"
    }

    #[instrument(skip(self, table), fields(rows = table.num_rows()))]
    fn analyze(&self, table: &Table) -> AnalyzerResult<OutlierReport> {
        let mut entries = Vec::new();
        for index in table.numeric_columns() {
            let values = table.numeric_values(index)?;
            if let Some(entry) = Self::detect(table.column_name(index), &values) {
                debug!(column = %entry.column, outliers = entry.count, "Detected outliers");
                entries.push(entry);
            }
        }
        Ok(OutlierReport { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{categorical_only_table, constant_and_missing_table};

    #[test]
    fn test_detects_extreme_value() {
        let entry = OutlierDetector::detect("x", &[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.lower_fence, -1.5);
        assert_eq!(entry.upper_fence, 8.5);
    }

    #[test]
    fn test_constant_column_has_no_outliers() {
        let entry = OutlierDetector::detect("c", &[7.0; 10]).unwrap();
        assert_eq!(entry.count, 0);
        assert_eq!(entry.lower_fence, 7.0);
        assert_eq!(entry.upper_fence, 7.0);
    }

    #[test]
    fn test_near_constant_column_flags_the_odd_value() {
        let entry = OutlierDetector::detect("c", &[7.0, 7.0, 7.0, 7.0, 7.0, 8.0]).unwrap();
        assert_eq!(entry.count, 1);
    }

    #[test]
    fn test_report_covers_numeric_columns_only() {
        let report = OutlierDetector::new()
            .analyze(&constant_and_missing_table())
            .unwrap();
        let columns: Vec<&str> = report.counts().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["constant", "value"]);
        assert_eq!(report.get("constant").unwrap().count, 0);
        assert_eq!(report.get("value").unwrap().count, 1);
    }

    #[test]
    fn test_no_numeric_columns_gives_empty_report() {
        let report = OutlierDetector::new()
            .analyze(&categorical_only_table())
            .unwrap();
        assert!(report.is_empty());
    }
}
