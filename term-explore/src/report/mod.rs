//! Aggregation of every analytical output into one report payload, and the
//! Markdown report written at the end of a run.

mod writer;

pub use writer::{ReportWriter, REPORT_HEADING};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::analyzers::{
    AnalysisResults, CorrelationMatrix, CorrelationPair, DatasetSummary, Degradation,
    MissingValueReport, OutlierReport,
};
use crate::render::{Artifact, RenderOutput};
use crate::table::{SemanticType, Table};

/// Number of strongest correlation pairs listed in the payload.
const STRONGEST_PAIRS: usize = 5;

/// Key figures of the principal component projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionOverview {
    pub columns: Vec<String>,
    pub rows_used: usize,
    pub explained_variance_ratio: [f64; 2],
}

/// Key figures of the density clustering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityOverview {
    pub cluster_count: usize,
    pub noise_count: usize,
    /// Size of each cluster, indexed by label.
    pub cluster_sizes: Vec<usize>,
    pub eps: f64,
    pub min_samples: usize,
}

/// Key figures of the hierarchical clustering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyOverview {
    pub leaf_count: usize,
    pub max_distance: f64,
}

/// Outcome of both clustering views; `None` when a view is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusteringOverview {
    pub density: Option<DensityOverview>,
    pub hierarchy: Option<HierarchyOverview>,
}

/// Everything known about one dataset after analysis and rendering.
///
/// Built once by [`ReportAssembler::assemble`] and then only read.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub dataset: String,
    pub encoding: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub row_count: usize,
    pub column_count: usize,
    #[serde(serialize_with = "crate::analyzers::types::serialize_pairs")]
    pub column_types: Vec<(String, SemanticType)>,
    pub summary: Option<DatasetSummary>,
    pub missing_values: MissingValueReport,
    pub outliers: OutlierReport,
    pub correlation: Option<CorrelationMatrix>,
    pub strongest_correlations: Vec<CorrelationPair>,
    pub projection: Option<ProjectionOverview>,
    pub clustering: ClusteringOverview,
    pub artifacts: Vec<Artifact>,
    pub degradations: Vec<Degradation>,
}

impl ReportPayload {
    /// Artifact file names as linked from the report.
    pub fn artifact_files(&self) -> Vec<String> {
        self.artifacts.iter().map(|a| a.file_name()).collect()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Merges analysis results and rendered artifacts into a [`ReportPayload`].
///
/// Pure aggregation: nothing is recomputed, and any missing input simply
/// leaves the matching field empty.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    encoding: Option<String>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the detected input encoding.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    #[instrument(skip_all, fields(dataset = table.name()))]
    pub fn assemble(
        &self,
        table: &Table,
        results: &AnalysisResults,
        rendered: &RenderOutput,
    ) -> ReportPayload {
        let correlation = results.correlation_matrix().cloned();
        let strongest_correlations = correlation
            .as_ref()
            .map(|m| m.strongest_pairs(STRONGEST_PAIRS))
            .unwrap_or_default();

        let projection = results.projection().map(|p| ProjectionOverview {
            columns: p.columns.clone(),
            rows_used: p.rows.len(),
            explained_variance_ratio: p.explained_variance_ratio,
        });

        let clustering = ClusteringOverview {
            density: results.density_clustering().map(|d| DensityOverview {
                cluster_count: d.cluster_count,
                noise_count: d.noise_count,
                cluster_sizes: (0..d.cluster_count as i32)
                    .map(|label| d.cluster_size(label))
                    .collect(),
                eps: d.eps,
                min_samples: d.min_samples,
            }),
            hierarchy: results.dendrogram().map(|tree| HierarchyOverview {
                leaf_count: tree.leaf_count,
                max_distance: tree.max_distance(),
            }),
        };

        let mut degradations = results.degradations.clone();
        degradations.extend(rendered.failures.iter().cloned());

        let summary = results.summary.clone();
        let missing_values = summary
            .as_ref()
            .map(|s| s.missing.clone())
            .unwrap_or_default();

        debug!(
            artifacts = rendered.artifacts.len(),
            degradations = degradations.len(),
            "Assembled report payload"
        );

        ReportPayload {
            dataset: table.name().to_string(),
            encoding: self.encoding.clone(),
            generated_at: Utc::now(),
            row_count: table.num_rows(),
            column_count: table.num_columns(),
            column_types: table
                .column_names()
                .into_iter()
                .zip(table.semantic_types().iter().copied())
                .collect(),
            summary,
            missing_values,
            outliers: results.outliers.clone().unwrap_or_default(),
            correlation,
            strongest_correlations,
            projection,
            clustering,
            artifacts: rendered.artifacts.clone(),
            degradations,
        }
    }
}
