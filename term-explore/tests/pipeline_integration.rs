//! End-to-end tests of a full analysis run with a stub narrator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use term_explore::analyzers::CLUSTER_COLUMN;
use term_explore::config::PipelineConfig;
use term_explore::narrative::{NarrativeGenerator, NarrativeOutcome, FAILED_NARRATIVE};
use term_explore::pipeline::{Pipeline, PipelineOutcome};
use term_explore::render::ArtifactKind;
use term_explore::report::{ReportPayload, REPORT_HEADING};
use term_explore::table::SemanticType;

/// Narrator returning a fixed outcome.
struct Scripted(NarrativeOutcome);

#[async_trait]
impl NarrativeGenerator for Scripted {
    async fn generate(&self, _payload: &ReportPayload) -> NarrativeOutcome {
        self.0.clone()
    }
}

fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

async fn run(input: &Path, out: &Path, narrative: NarrativeOutcome) -> PipelineOutcome {
    Pipeline::new(
        PipelineConfig::default().with_output_dir(out),
        Arc::new(Scripted(narrative)),
    )
    .run(input)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_five_row_numeric_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "scores.csv",
        "a,b,c\n1,2,10\n2,1,8\n3,4,9\n4,3,7\n5,5,6\n",
    );
    let out = dir.path().join("report");

    let outcome = run(
        &input,
        &out,
        NarrativeOutcome::Generated("Scores rise together.".to_string()),
    )
    .await;

    let names: Vec<&str> = outcome.artifacts.iter().map(|a| a.name()).collect();
    assert!(names.contains(&"correlation_matrix"));
    assert!(names.contains(&"pca_plot"));
    assert!(names.contains(&"dbscan_clusters"));
    let known: Vec<&str> = ArtifactKind::ALL.iter().map(|k| k.name()).collect();
    assert!(names.iter().all(|name| known.contains(name)));

    let report = std::fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.starts_with(REPORT_HEADING));
    assert!(report.contains("Scores rise together."));
    for artifact in &outcome.artifacts {
        assert!(artifact.path.exists(), "{} missing", artifact.path.display());
        assert!(report.contains(&format!("({})", artifact.file_name())));
    }

    let payload = &outcome.payload;
    assert_eq!(payload.row_count, 5);
    assert_eq!(payload.column_count, 3);
    assert!(payload
        .column_types
        .iter()
        .all(|(name, _)| name != CLUSTER_COLUMN));
    assert!(payload.missing_values.iter().all(|(_, missing)| missing == 0));
    assert_eq!(payload.encoding.as_deref(), Some("UTF-8"));
    assert!(!outcome.narrative.is_degraded());
}

#[tokio::test]
async fn test_all_missing_column_is_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "sparse.csv",
        "x,y,notes\n1,2,\n2,4,\n3,5,\n4,4,\n6,7,\n",
    );
    let out = dir.path().join("report");

    let outcome = run(&input, &out, NarrativeOutcome::Empty).await;

    let payload = &outcome.payload;
    assert_eq!(
        payload.column_types.last(),
        Some(&("notes".to_string(), SemanticType::Unknown))
    );
    assert_eq!(payload.missing_values.get("notes"), Some(5));
    assert!(payload.correlation.is_some());
    assert!(payload.outliers.get("notes").is_none());
}

#[tokio::test]
async fn test_text_only_dataset_degrades_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "names.csv",
        "name,city\nada,London\ngrace,New York\nlinus,Helsinki\n",
    );
    let out = dir.path().join("report");

    let outcome = run(&input, &out, NarrativeOutcome::Empty).await;

    assert!(outcome.artifacts.is_empty());
    assert!(outcome.is_degraded());
    let stages: Vec<&str> = outcome.degradations.iter().map(|d| d.stage.as_str()).collect();
    assert!(stages.contains(&"correlation"));
    assert!(stages.contains(&"pca"));
    assert!(outcome.degradations.iter().all(|d| !d.is_failure()));

    let report = std::fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.contains("_No visualizations were produced._"));
    assert!(report.contains("## Skipped Analyses"));
}

#[tokio::test]
async fn test_failed_narrative_still_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "pairs.csv", "p,q\n1,3\n2,1\n3,2\n");
    let out = dir.path().join("report");

    let outcome = run(
        &input,
        &out,
        NarrativeOutcome::Failed("connection refused".to_string()),
    )
    .await;

    let report = std::fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.contains(FAILED_NARRATIVE));
    assert!(outcome.narrative.is_degraded());
}

#[tokio::test]
async fn test_rerun_overwrites_previous_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "pairs.csv", "p,q\n1,3\n2,1\n3,2\n");
    let out = dir.path().join("report");

    let first = NarrativeOutcome::Generated("narrative-one".to_string());
    run(&input, &out, first).await;
    let second = NarrativeOutcome::Generated("narrative-two".to_string());
    let outcome = run(&input, &out, second).await;

    let report = std::fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.contains("narrative-two"));
    assert!(!report.contains("narrative-one"));
}

#[tokio::test]
async fn test_malformed_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "broken.csv", "a,b\n1,2,3\n");
    let out = dir.path().join("report");

    let err = Pipeline::new(
        PipelineConfig::default().with_output_dir(&out),
        Arc::new(Scripted(NarrativeOutcome::Empty)),
    )
    .run(&input)
    .await
    .unwrap_err();

    assert!(err.is_ingestion());
    assert!(!out.join("README.md").exists());
}
