//! Runs every analysis over one table and records what could not be produced.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::clustering::{
    ClusterEngine, ClusteringOutcome, ClusteringResults, Dendrogram, DensityClustering,
};
use super::correlation::{CorrelationAnalyzer, CorrelationMatrix};
use super::outliers::{OutlierDetector, OutlierReport};
use super::pca::{DimensionalityReducer, Projection};
use super::summary::{DatasetSummary, Summarizer};
use super::{Analyzer, Applicability, NotApplicableReason};
use crate::config::AnalysisConfig;
use crate::table::Table;

/// Type alias for progress callback function.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// What went wrong with a degraded stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradationDetail {
    /// The stage does not apply to this table.
    NotApplicable { reason: NotApplicableReason },
    /// The stage failed.
    Failed { message: String },
}

/// A stage whose output is missing from, or substituted in, the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Degradation {
    pub stage: String,
    #[serde(flatten)]
    pub detail: DegradationDetail,
}

impl Degradation {
    pub fn not_applicable(stage: impl Into<String>, reason: NotApplicableReason) -> Self {
        Self {
            stage: stage.into(),
            detail: DegradationDetail::NotApplicable { reason },
        }
    }

    pub fn failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            detail: DegradationDetail::Failed {
                message: message.into(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.detail, DegradationDetail::Failed { .. })
    }
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            DegradationDetail::NotApplicable { reason } => {
                write!(f, "{}: not applicable ({reason})", self.stage)
            }
            DegradationDetail::Failed { message } => {
                write!(f, "{}: failed ({message})", self.stage)
            }
        }
    }
}

/// Everything the analysis stages produced for one table.
///
/// A `None` field means the stage failed; the reason is in `degradations`.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResults {
    pub summary: Option<DatasetSummary>,
    pub outliers: Option<OutlierReport>,
    pub correlation: Option<Applicability<CorrelationMatrix>>,
    pub projection: Option<Applicability<Projection>>,
    pub density: Option<Applicability<DensityClustering>>,
    pub hierarchy: Option<Applicability<Dendrogram>>,
    /// The clustered rows with their DBSCAN label in a trailing
    /// [`CLUSTER_COLUMN`](super::CLUSTER_COLUMN) column. The analyzed table
    /// is left as it was.
    pub clustered: Option<Table>,
    pub degradations: Vec<Degradation>,
}

impl AnalysisResults {
    pub fn correlation_matrix(&self) -> Option<&CorrelationMatrix> {
        self.correlation.as_ref()?.applicable()
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()?.applicable()
    }

    pub fn density_clustering(&self) -> Option<&DensityClustering> {
        self.density.as_ref()?.applicable()
    }

    pub fn dendrogram(&self) -> Option<&Dendrogram> {
        self.hierarchy.as_ref()?.applicable()
    }

    pub fn clustered_view(&self) -> Option<&Table> {
        self.clustered.as_ref()
    }
}

/// Orchestrates the analysis stages over one table.
///
/// Stages are independent: a failing or inapplicable stage is recorded as a
/// [`Degradation`] and the remaining stages still run.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use arrow::array::{ArrayRef, Float64Array};
/// use term_explore::analyzers::AnalysisRunner;
/// use term_explore::table::{SemanticType, Table};
///
/// let column = |name: &str, values: Vec<f64>| {
///     (name.to_string(), SemanticType::Numeric, Arc::new(Float64Array::from(values)) as ArrayRef)
/// };
/// let table = Table::try_new(
///     "example.csv",
///     vec![
///         column("x", vec![1.0, 2.0, 3.0, 4.0]),
///         column("y", vec![2.0, 4.0, 5.0, 9.0]),
///     ],
/// )
/// .unwrap();
///
/// let results = AnalysisRunner::default()
///     .on_progress(|p| println!("{:.0}%", p * 100.0))
///     .run(&table);
/// assert!(results.correlation_matrix().is_some());
/// ```
pub struct AnalysisRunner {
    summarizer: Summarizer,
    outliers: OutlierDetector,
    correlation: CorrelationAnalyzer,
    reducer: DimensionalityReducer,
    clusters: ClusterEngine,
    on_progress: Option<ProgressCallback>,
}

impl Default for AnalysisRunner {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl std::fmt::Debug for AnalysisRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisRunner")
            .field("clusters", &self.clusters)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

const STAGE_COUNT: f64 = 5.0;

impl AnalysisRunner {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            summarizer: Summarizer::new(),
            outliers: OutlierDetector::new(),
            correlation: CorrelationAnalyzer::new(),
            reducer: DimensionalityReducer::new(),
            clusters: ClusterEngine::from_config(config),
            on_progress: None,
        }
    }

    /// Sets a progress callback that will be called after each stage.
    ///
    /// The callback receives a float between 0.0 and 1.0 indicating progress.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    fn progress(&self, completed: f64) {
        if let Some(ref callback) = self.on_progress {
            callback(completed / STAGE_COUNT);
        }
    }

    /// Runs every stage. Never fails; problems become degradations.
    #[instrument(skip(self, table), fields(dataset = table.name(), rows = table.num_rows()))]
    pub fn run(&self, table: &Table) -> AnalysisResults {
        info!("Starting analysis");
        let mut results = AnalysisResults::default();

        results.summary = run_stage(&self.summarizer, table, &mut results.degradations);
        self.progress(1.0);

        results.outliers = run_stage(&self.outliers, table, &mut results.degradations);
        self.progress(2.0);

        results.correlation = run_stage(&self.correlation, table, &mut results.degradations)
            .map(|r| note_applicability(self.correlation.name(), r, &mut results.degradations));
        self.progress(3.0);

        results.projection = run_stage(&self.reducer, table, &mut results.degradations)
            .map(|r| note_applicability(self.reducer.name(), r, &mut results.degradations));
        self.progress(4.0);

        if let Some(ClusteringResults { density, hierarchy }) =
            run_stage(&self.clusters, table, &mut results.degradations)
        {
            results.density = note_clustering("dbscan", density, &mut results.degradations);
            let view = results
                .density_clustering()
                .map(|clustering| ClusterEngine::labeled_view(table, clustering));
            match view {
                Some(Ok(view)) => results.clustered = Some(view),
                Some(Err(e)) => {
                    warn!(error = %e, "Failed to label clustered rows");
                    results
                        .degradations
                        .push(Degradation::failed("dbscan", e.to_string()));
                }
                None => {}
            }
            results.hierarchy =
                note_clustering("hierarchical", hierarchy, &mut results.degradations);
        }
        self.progress(5.0);

        info!(degradations = results.degradations.len(), "Analysis completed");
        results
    }
}

fn run_stage<A: Analyzer>(
    analyzer: &A,
    table: &Table,
    degradations: &mut Vec<Degradation>,
) -> Option<A::Output> {
    match analyzer.analyze(table) {
        Ok(output) => Some(output),
        Err(e) => {
            warn!(stage = analyzer.name(), error = %e, "Analysis stage failed");
            degradations.push(Degradation::failed(analyzer.name(), e.to_string()));
            None
        }
    }
}

fn note_applicability<T>(
    stage: &str,
    outcome: Applicability<T>,
    degradations: &mut Vec<Degradation>,
) -> Applicability<T> {
    if let Some(reason) = outcome.reason() {
        warn!(stage, reason = %reason, "Analysis not applicable");
        degradations.push(Degradation::not_applicable(stage, reason));
    }
    outcome
}

fn note_clustering<T>(
    stage: &str,
    outcome: ClusteringOutcome<T>,
    degradations: &mut Vec<Degradation>,
) -> Option<Applicability<T>> {
    match outcome {
        Ok(applicability) => Some(note_applicability(stage, applicability, degradations)),
        Err(e) => {
            degradations.push(Degradation::failed(stage, e.to_string()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::CLUSTER_COLUMN;
    use crate::test_fixtures::{categorical_only_table, mixed_table, numeric_table};
    use std::sync::Mutex;

    #[test]
    fn test_full_run_on_numeric_table() {
        let results = AnalysisRunner::default().run(&numeric_table());

        assert!(results.summary.is_some());
        assert!(results.outliers.is_some());
        assert!(results.correlation_matrix().is_some());
        assert!(results.projection().is_some());
        assert!(results.density_clustering().is_some());
        assert!(results.dendrogram().is_some());
        assert!(results.degradations.is_empty());
    }

    #[test]
    fn test_clustered_view_is_separate_from_input() {
        let table = numeric_table();
        let results = AnalysisRunner::default().run(&table);

        let view = results.clustered_view().unwrap();
        assert_eq!(view.num_columns(), table.num_columns() + 1);
        assert_eq!(view.num_rows(), results.density_clustering().unwrap().labels.len());
        assert_eq!(view.column_name(view.num_columns() - 1), CLUSTER_COLUMN);
        assert_eq!(table.num_columns(), 3);
        assert!(table.column_index(CLUSTER_COLUMN).is_none());
    }

    #[test]
    fn test_single_numeric_column() {
        let results = AnalysisRunner::default().run(&mixed_table());

        let too_few = Some(NotApplicableReason::TooFewNumericColumns {
            found: 1,
            required: 2,
        });
        assert_eq!(results.correlation.as_ref().unwrap().reason(), too_few);
        assert_eq!(results.projection.as_ref().unwrap().reason(), too_few);
        assert!(results.density_clustering().is_some());
        assert!(results.clustered_view().is_some());
    }

    #[test]
    fn test_inapplicable_stages_are_recorded() {
        let results = AnalysisRunner::default().run(&categorical_only_table());

        assert!(results.summary.is_some());
        assert!(results.outliers.as_ref().unwrap().is_empty());
        assert!(results.correlation_matrix().is_none());
        assert!(results.projection().is_none());
        assert!(results.clustered_view().is_none());

        let stages: Vec<&str> = results.degradations.iter().map(|d| d.stage.as_str()).collect();
        assert_eq!(stages, vec!["correlation", "pca", "dbscan", "hierarchical"]);
        assert!(results.degradations.iter().all(|d| !d.is_failure()));
    }

    #[test]
    fn test_clustering_failure_is_isolated() {
        let config = AnalysisConfig::default().with_max_hierarchical_rows(2);
        let results = AnalysisRunner::new(&config).run(&numeric_table());

        assert!(results.density_clustering().is_some());
        assert!(results.hierarchy.is_none());
        assert!(results.projection().is_some());
        let failure = results.degradations.iter().find(|d| d.is_failure()).unwrap();
        assert_eq!(failure.stage, "hierarchical");
    }

    #[test]
    fn test_progress_reaches_one() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        AnalysisRunner::default()
            .on_progress(move |p| sink.lock().unwrap().push(p))
            .run(&numeric_table());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[test]
    fn test_degradation_serialization() {
        let degradation = Degradation::failed("render:pca_plot", "disk full");
        let json = serde_json::to_value(&degradation).unwrap();
        assert_eq!(json["stage"], "render:pca_plot");
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["message"], "disk full");
        assert_eq!(degradation.to_string(), "render:pca_plot: failed (disk full)");
    }
}
