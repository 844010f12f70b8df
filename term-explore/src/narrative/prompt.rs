//! Prompt construction for the narrative request.

use std::fmt::Write as _;

use serde::Serialize;

use crate::report::ReportPayload;

const INSTRUCTIONS: &str = "\
Below is an automated analysis of a dataset. Write an engaging narrative about it with these sections:

1. **The Data Received**: what the dataset appears to represent, its features, and why it matters.
2. **The Analysis Carried Out**: the methods used (missing value review, IQR outlier detection, correlation, PCA, DBSCAN and Ward clustering) and what each reveals.
3. **Key Insights and Discoveries**: the main findings, trends, and anything unexpected.
4. **Implications and Actions**: what the findings mean for decisions and which actions you recommend.
5. **Visualizations**: what each chart shows and how it supports the findings.";

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Builds the single user message sent to the narrative service.
///
/// The message embeds the statistical summary, the missing-value and outlier
/// reports, the headline results of the multivariate analyses, and the list
/// of rendered artifacts.
pub fn build_prompt(payload: &ReportPayload) -> String {
    let mut prompt = String::with_capacity(4096);
    // Writing into a String cannot fail.
    let _ = write_prompt(&mut prompt, payload);
    prompt
}

fn write_prompt(out: &mut String, payload: &ReportPayload) -> std::fmt::Result {
    writeln!(out, "{INSTRUCTIONS}")?;
    writeln!(out)?;

    writeln!(out, "**Dataset**: {}", payload.dataset)?;
    writeln!(
        out,
        "{} rows, {} columns",
        payload.row_count, payload.column_count
    )?;
    if let Some(encoding) = &payload.encoding {
        writeln!(out, "Encoding: {encoding}")?;
    }
    writeln!(out)?;

    writeln!(out, "**Dataset Summary**:")?;
    match &payload.summary {
        Some(summary) => writeln!(out, "{}", json(&summary.columns))?,
        None => writeln!(out, "Not available.")?,
    }
    writeln!(out)?;

    writeln!(out, "**Missing Values**:")?;
    writeln!(out, "{}", json(&payload.missing_values))?;
    writeln!(out)?;

    writeln!(out, "**Outliers** (values outside the 1.5 IQR fences):")?;
    writeln!(out, "{}", json(&payload.outliers))?;
    writeln!(out)?;

    if !payload.strongest_correlations.is_empty() {
        writeln!(out, "**Strongest Correlations**:")?;
        for pair in &payload.strongest_correlations {
            writeln!(
                out,
                "- {} / {}: {:.3}",
                pair.left, pair.right, pair.coefficient
            )?;
        }
        writeln!(out)?;
    }

    if let Some(projection) = &payload.projection {
        let [first, second] = projection.explained_variance_ratio;
        writeln!(
            out,
            "**PCA**: the first two components explain {:.1}% and {:.1}% of the variance over {} rows.",
            first * 100.0,
            second * 100.0,
            projection.rows_used
        )?;
    }
    if let Some(density) = &payload.clustering.density {
        writeln!(
            out,
            "**DBSCAN** (eps {}, min samples {}): {} cluster(s), {} noise point(s).",
            density.eps, density.min_samples, density.cluster_count, density.noise_count
        )?;
    }
    if let Some(hierarchy) = &payload.clustering.hierarchy {
        writeln!(
            out,
            "**Ward clustering**: {} rows merged, largest merge distance {:.3}.",
            hierarchy.leaf_count, hierarchy.max_distance
        )?;
    }
    writeln!(out)?;

    writeln!(out, "**Visualizations**:")?;
    if payload.artifacts.is_empty() {
        writeln!(out, "None.")?;
    }
    for artifact in &payload.artifacts {
        writeln!(out, "- {}: {}", artifact.kind.title(), artifact.file_name())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::AnalysisRunner;
    use crate::render::{Artifact, ArtifactKind, RenderOutput};
    use crate::report::ReportAssembler;
    use crate::test_fixtures::mixed_table;
    use std::path::PathBuf;

    #[test]
    fn test_prompt_embeds_reports_and_artifacts() {
        let table = mixed_table();
        let results = AnalysisRunner::default().run(&table);
        let rendered = RenderOutput {
            artifacts: vec![Artifact {
                kind: ArtifactKind::CorrelationMatrix,
                path: PathBuf::from("correlation_matrix.svg"),
            }],
            failures: Vec::new(),
        };
        let payload = ReportAssembler::new().assemble(&table, &results, &rendered);

        let prompt = build_prompt(&payload);

        assert!(prompt.starts_with("Below is an automated analysis"));
        assert!(prompt.contains("**Dataset**: mixed.csv"));
        assert!(prompt.contains("\"in_stock\": 1"));
        assert!(prompt.contains("Correlation Matrix: correlation_matrix.svg"));
        assert!(prompt.contains("**Outliers**"));
    }
}
