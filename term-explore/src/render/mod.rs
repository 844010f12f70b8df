//! Rendering of analytical results into image artifacts.
//!
//! Each available result is drawn as an SVG document in memory and then
//! persisted under a deterministic name. Files are written to a temporary
//! file in the output directory and renamed into place, so a report never
//! references a partially written image.
//!
//! # Examples
//!
//! ```rust,no_run
//! use term_explore::analyzers::AnalysisRunner;
//! use term_explore::config::RenderConfig;
//! use term_explore::render::VisualizationRenderer;
//! # fn example(table: &term_explore::table::Table) {
//! let results = AnalysisRunner::default().run(table);
//! let rendered = VisualizationRenderer::new(RenderConfig::default()).render(table, &results);
//! for artifact in &rendered.artifacts {
//!     println!("{} -> {}", artifact.name(), artifact.path.display());
//! }
//! # }
//! ```

mod dendrogram;
mod error;
mod heatmap;
mod scatter;

pub use dendrogram::dendrogram;
pub use error::RenderError;
pub use heatmap::correlation_heatmap;
pub use scatter::{cluster_scatter, pca_scatter};

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

use crate::analyzers::{AnalysisResults, Degradation};
use crate::config::RenderConfig;
use crate::table::Table;

/// The visualizations this crate knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    CorrelationMatrix,
    PcaPlot,
    DbscanClusters,
    HierarchicalClustering,
}

impl ArtifactKind {
    /// Every kind, in rendering order.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::CorrelationMatrix,
        ArtifactKind::PcaPlot,
        ArtifactKind::DbscanClusters,
        ArtifactKind::HierarchicalClustering,
    ];

    /// Logical name, which is also the file stem.
    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::CorrelationMatrix => "correlation_matrix",
            ArtifactKind::PcaPlot => "pca_plot",
            ArtifactKind::DbscanClusters => "dbscan_clusters",
            ArtifactKind::HierarchicalClustering => "hierarchical_clustering",
        }
    }

    /// Human-readable title used in the report.
    pub fn title(&self) -> &'static str {
        match self {
            ArtifactKind::CorrelationMatrix => "Correlation Matrix",
            ArtifactKind::PcaPlot => "PCA Plot",
            ArtifactKind::DbscanClusters => "DBSCAN Clusters",
            ArtifactKind::HierarchicalClustering => "Hierarchical Clustering Dendrogram",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A rendered image on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl Artifact {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// File name relative to the output directory, as linked from the report.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.{}", self.kind.name(), RenderConfig::EXTENSION))
    }
}

/// Artifacts that were written, plus one degradation per artifact that was not.
#[derive(Debug, Clone, Default)]
pub struct RenderOutput {
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<Degradation>,
}

impl RenderOutput {
    pub fn get(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

/// Draws and persists every plottable result.
#[derive(Debug, Clone, Default)]
pub struct VisualizationRenderer {
    config: RenderConfig,
}

impl VisualizationRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders each available result. Failures are logged and recorded; they
    /// never stop the remaining artifacts.
    #[instrument(
        skip_all,
        fields(dataset = table.name(), output_dir = %self.config.output_dir.display())
    )]
    pub fn render(&self, table: &Table, results: &AnalysisResults) -> RenderOutput {
        let mut output = RenderOutput::default();

        for kind in ArtifactKind::ALL {
            let Some(drawn) = self.draw(kind, results) else {
                continue;
            };
            let path = self.config.artifact_path(kind.name());
            match drawn.and_then(|svg| persist(&path, svg.as_bytes())) {
                Ok(()) => {
                    info!(artifact = %kind, path = %path.display(), "Saved artifact");
                    output.artifacts.push(Artifact { kind, path });
                }
                Err(e) => {
                    warn!(artifact = %kind, error = %e, "Failed to render artifact");
                    output
                        .failures
                        .push(Degradation::failed(format!("render:{kind}"), e.to_string()));
                }
            }
        }
        output
    }

    /// Draws one artifact, or `None` when its input is unavailable.
    fn draw(
        &self,
        kind: ArtifactKind,
        results: &AnalysisResults,
    ) -> Option<Result<String, RenderError>> {
        let size = self.config.size;
        match kind {
            ArtifactKind::CorrelationMatrix => results
                .correlation_matrix()
                .map(|matrix| correlation_heatmap(matrix, size)),
            ArtifactKind::PcaPlot => results
                .projection()
                .map(|projection| pca_scatter(projection, size)),
            ArtifactKind::DbscanClusters => results
                .clustered_view()
                .map(|view| cluster_scatter(view, size)),
            ArtifactKind::HierarchicalClustering => {
                results.dendrogram().map(|tree| dendrogram(tree, size))
            }
        }
    }
}

/// Writes `contents` to `path` atomically.
///
/// The data goes to a temporary file in the same directory, which is then
/// renamed over `path`. On failure nothing is left at `path`.
pub fn persist(path: &Path, contents: &[u8]) -> Result<(), RenderError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path)?;
    Ok(())
}
