//! Clustering of the standardized numeric subset of a table.
//!
//! Two independent views are produced from the same feature matrix: a flat
//! density-based partition and a full Ward merge tree. Each is reported on
//! its own, so one failing does not hide the other.

mod dbscan;
mod hierarchical;

pub use dbscan::{Dbscan, DensityClustering, NOISE};
pub use hierarchical::{ward_linkage, Dendrogram, Merge};

use tracing::{instrument, warn};

use super::features::FeatureMatrix;
use super::{Analyzer, AnalyzerResult, Applicability, ClusteringError, NotApplicableReason};
use crate::config::AnalysisConfig;
use crate::table::Table;

/// Name of the label column attached by [`ClusterEngine::labeled_view`].
pub const CLUSTER_COLUMN: &str = "cluster";

/// Outcome of one clustering algorithm.
pub type ClusteringOutcome<T> = Result<Applicability<T>, ClusteringError>;

/// Both clustering views of a table.
#[derive(Debug, Clone)]
pub struct ClusteringResults {
    pub density: ClusteringOutcome<DensityClustering>,
    pub hierarchy: ClusteringOutcome<Dendrogram>,
}

/// Runs density and hierarchical clustering.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    dbscan: Dbscan,
    max_hierarchical_rows: usize,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ClusterEngine {
    pub fn new(dbscan: Dbscan, max_hierarchical_rows: usize) -> Self {
        Self {
            dbscan,
            max_hierarchical_rows,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            Dbscan::new(config.dbscan_eps, config.dbscan_min_samples),
            config.max_hierarchical_rows,
        )
    }

    fn empty_reason(features: &FeatureMatrix) -> Option<NotApplicableReason> {
        if features.n_cols() == 0 {
            Some(NotApplicableReason::NoNumericData)
        } else if features.n_rows() == 0 {
            Some(NotApplicableReason::TooFewRows {
                found: 0,
                required: 1,
            })
        } else {
            None
        }
    }

    /// Density clustering of standardized features.
    pub fn density(&self, features: &FeatureMatrix) -> ClusteringOutcome<DensityClustering> {
        if let Some(reason) = Self::empty_reason(features) {
            return Ok(Applicability::NotApplicable(reason));
        }
        self.dbscan.fit(features).map(Applicability::Applicable)
    }

    /// Ward merge tree of standardized features.
    pub fn hierarchy(&self, features: &FeatureMatrix) -> ClusteringOutcome<Dendrogram> {
        if let Some(reason) = Self::empty_reason(features) {
            return Ok(Applicability::NotApplicable(reason));
        }
        let rows = features.n_rows();
        if rows < 2 {
            return Ok(Applicability::NotApplicable(NotApplicableReason::TooFewRows {
                found: rows,
                required: 2,
            }));
        }
        if rows > self.max_hierarchical_rows {
            return Err(ClusteringError::TooManyRows {
                algorithm: "ward",
                rows,
                limit: self.max_hierarchical_rows,
            });
        }
        ward_linkage(features).map(Applicability::Applicable)
    }

    /// A new table holding the clustered rows plus a `cluster` label column.
    ///
    /// `table` itself is not modified.
    pub fn labeled_view(table: &Table, clustering: &DensityClustering) -> AnalyzerResult<Table> {
        Ok(table.with_cluster_labels(&clustering.rows, &clustering.labels, CLUSTER_COLUMN)?)
    }
}

impl Analyzer for ClusterEngine {
    type Output = ClusteringResults;

    fn name(&self) -> &str {
        "clustering"
    }

    fn description(&self) -> &str {
        "DBSCAN labels and a Ward dendrogram over standardized numeric columns"
    }

    #[instrument(skip(self, table), fields(rows = table.num_rows()))]
    fn analyze(&self, table: &Table) -> AnalyzerResult<ClusteringResults> {
        let features = FeatureMatrix::from_table(table)?.standardized();

        let density = self.density(&features);
        if let Err(e) = &density {
            warn!(error = %e, "Density clustering failed");
        }
        let hierarchy = self.hierarchy(&features);
        if let Err(e) = &hierarchy {
            warn!(error = %e, "Hierarchical clustering failed");
        }

        Ok(ClusteringResults { density, hierarchy })
    }
}
