//! Markdown rendering and atomic writing of the final report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use super::ReportPayload;
use crate::error::{Result, TermError};
use crate::render::persist;

/// First line of every report.
pub const REPORT_HEADING: &str = "# Dataset Analysis";

/// Writes the final Markdown report.
///
/// The file is replaced atomically on every run.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders the report body.
    pub fn render(&self, payload: &ReportPayload, narrative: &str) -> Result<String> {
        let mut output = String::new();
        write_markdown(&mut output, payload, narrative)
            .map_err(|e| TermError::Internal(format!("failed to format report: {e}")))?;
        Ok(output)
    }

    /// Renders and writes the report, returning its path.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn write(&self, payload: &ReportPayload, narrative: &str) -> Result<PathBuf> {
        let contents = self.render(payload, narrative)?;
        persist(&self.path, contents.as_bytes())?;
        info!(bytes = contents.len(), "Report written");
        Ok(self.path.clone())
    }
}

fn write_markdown(out: &mut String, payload: &ReportPayload, narrative: &str) -> std::fmt::Result {
    writeln!(out, "{REPORT_HEADING}")?;
    writeln!(out)?;
    writeln!(out, "{}", narrative.trim())?;
    writeln!(out)?;

    writeln!(out, "## Visualizations")?;
    writeln!(out)?;
    if payload.artifacts.is_empty() {
        writeln!(out, "_No visualizations were produced._")?;
    }
    for artifact in &payload.artifacts {
        writeln!(out, "![{}]({})", artifact.kind.title(), artifact.file_name())?;
        writeln!(out)?;
    }

    if payload.is_degraded() {
        writeln!(out)?;
        writeln!(out, "## Skipped Analyses")?;
        writeln!(out)?;
        for degradation in &payload.degradations {
            writeln!(out, "- {degradation}")?;
        }
    }
    Ok(())
}
