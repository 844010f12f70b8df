//! End-to-end orchestration of one analysis run.
//!
//! Only ingestion and writing the final report can fail a run. Everything in
//! between degrades instead: inapplicable or failed analyses, artifacts that
//! could not be rendered, and an unavailable narrative service all end up as
//! entries in [`PipelineOutcome::degradations`] or as a placeholder narrative.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::analyzers::{AnalysisRunner, Degradation};
use crate::config::PipelineConfig;
use crate::error::{ErrorContext, Result};
use crate::narrative::{NarrativeGenerator, NarrativeOutcome};
use crate::render::{Artifact, VisualizationRenderer};
use crate::report::{ReportAssembler, ReportPayload, ReportWriter};
use crate::sources::Ingestor;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report_path: PathBuf,
    pub artifacts: Vec<Artifact>,
    pub narrative: NarrativeOutcome,
    pub degradations: Vec<Degradation>,
    pub payload: ReportPayload,
}

impl PipelineOutcome {
    /// True when anything was skipped or substituted.
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty() || self.narrative.is_degraded()
    }
}

/// Runs ingestion, analysis, rendering, narrative generation, and report
/// writing for a single file.
pub struct Pipeline {
    config: PipelineConfig,
    narrator: Arc<dyn NarrativeGenerator>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        Self { config, narrator }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn run(&self, path: &Path) -> Result<PipelineOutcome> {
        let dataset = Ingestor::from_config(&self.config.analysis).load(path)?;
        let table = &dataset.table;

        std::fs::create_dir_all(self.config.output_dir()).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.config.output_dir().display()
            )
        })?;

        let results = AnalysisRunner::new(&self.config.analysis).run(table);
        let rendered =
            VisualizationRenderer::new(self.config.render.clone()).render(table, &results);
        let payload = ReportAssembler::new()
            .with_encoding(dataset.encoding.name())
            .assemble(table, &results, &rendered);

        let narrative = self.narrator.generate(&payload).await;
        if let NarrativeOutcome::Failed(reason) = &narrative {
            warn!(reason = %reason, "Using placeholder narrative");
        }

        let report_path = ReportWriter::new(self.config.report_path())
            .write(&payload, narrative.text())
            .context("Failed to write report")?;

        info!(
            artifacts = payload.artifacts.len(),
            degradations = payload.degradations.len(),
            narrative_degraded = narrative.is_degraded(),
            report = %report_path.display(),
            "Analysis run completed"
        );

        Ok(PipelineOutcome {
            report_path,
            artifacts: payload.artifacts.clone(),
            narrative,
            degradations: payload.degradations.clone(),
            payload,
        })
    }
}
