//! Core analyzer trait.

use std::fmt::Debug;

use super::errors::AnalyzerResult;
use crate::table::Table;

/// A single analysis over a [`Table`].
///
/// Analyzers are synchronous, deterministic, and never mutate the table.
/// Input the analysis cannot handle is reported as a value of the output type
/// (usually [`Applicability::NotApplicable`](super::Applicability)); `Err` is
/// reserved for genuine failures.
///
/// # Example
///
/// ```rust
/// use term_explore::analyzers::{Analyzer, AnalyzerResult};
/// use term_explore::table::Table;
///
/// #[derive(Debug)]
/// struct RowCount;
///
/// impl Analyzer for RowCount {
///     type Output = usize;
///
///     fn name(&self) -> &str {
///         "row_count"
///     }
///
///     fn analyze(&self, table: &Table) -> AnalyzerResult<usize> {
///         Ok(table.num_rows())
///     }
/// }
/// ```
pub trait Analyzer: Send + Sync + Debug {
    /// The result type produced by this analyzer.
    type Output: Send + Sync + Debug;

    /// Returns the name of this analyzer.
    ///
    /// Used for identification in logs and degradation records.
    fn name(&self) -> &str;

    /// Returns a description of what this analyzer computes.
    fn description(&self) -> &str {
        ""
    }

    /// Runs the analysis.
    fn analyze(&self, table: &Table) -> AnalyzerResult<Self::Output>;
}
