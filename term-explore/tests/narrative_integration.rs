//! Integration tests for the chat-completions narrative client.
//!
//! These tests use mockito to stand in for the remote service.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use mockito::{Matcher, Server};
use serde_json::json;
use term_explore::analyzers::AnalysisRunner;
use term_explore::config::{NarrativeConfig, PipelineConfig};
use term_explore::narrative::{
    ChatCompletionClient, NarrativeError, NarrativeGenerator, NarrativeOutcome, BLANK_NARRATIVE,
    FAILED_NARRATIVE,
};
use term_explore::pipeline::Pipeline;
use term_explore::render::RenderOutput;
use term_explore::report::{ReportAssembler, ReportPayload};
use term_explore::table::{SemanticType, Table};

const PATH: &str = "/openai/v1/chat/completions";

fn client(server: &Server) -> ChatCompletionClient {
    let config =
        NarrativeConfig::new("test-token").with_endpoint(format!("{}{PATH}", server.url()));
    ChatCompletionClient::new(config).expect("Failed to create test client")
}

fn payload() -> ReportPayload {
    let column = |name: &str, values: Vec<f64>| {
        (
            name.to_string(),
            SemanticType::Numeric,
            Arc::new(Float64Array::from(values)) as ArrayRef,
        )
    };
    let table = Table::try_new(
        "sales.csv",
        vec![
            column("units", vec![3.0, 5.0, 4.0, 8.0, 6.0]),
            column("revenue", vec![30.0, 52.0, 41.0, 79.0, 63.0]),
        ],
    )
    .unwrap();
    let results = AnalysisRunner::default().run(&table);
    ReportAssembler::new().assemble(&table, &results, &RenderOutput::default())
}

fn completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_generated_narrative() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 2000
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("Revenue tracks units sold."))
        .create_async()
        .await;

    let outcome = client(&server).generate(&payload()).await;

    mock.assert_async().await;
    assert_eq!(
        outcome,
        NarrativeOutcome::Generated("Revenue tracks units sold.".to_string())
    );
}

#[tokio::test]
async fn test_prompt_mentions_dataset() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::Regex("sales\\.csv".to_string()))
        .with_status(200)
        .with_body(completion("ok"))
        .create_async()
        .await;

    let text = client(&server).complete("Describe sales.csv").await.unwrap();

    mock.assert_async().await;
    assert_eq!(text.as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_empty_choices_is_empty_outcome() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(json!({"choices": []}).to_string())
        .create_async()
        .await;

    let outcome = client(&server).generate(&payload()).await;
    assert_eq!(outcome, NarrativeOutcome::Empty);
}

#[tokio::test]
async fn test_blank_content_is_blank_outcome() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(completion(""))
        .create_async()
        .await;

    let outcome = client(&server).generate(&payload()).await;
    assert_eq!(outcome, NarrativeOutcome::Blank);
    assert_eq!(outcome.text(), BLANK_NARRATIVE);
}

#[tokio::test]
async fn test_server_error_is_failed_outcome() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let err = client(&server).complete("hello").await.unwrap_err();
    assert!(matches!(err, NarrativeError::HttpStatus { status: 500, .. }));

    let outcome = client(&server).generate(&payload()).await;
    assert!(matches!(outcome, NarrativeOutcome::Failed(_)));
    assert_eq!(outcome.text(), FAILED_NARRATIVE);
}

#[tokio::test]
async fn test_non_json_body_is_failed_outcome() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client(&server).complete("hello").await.unwrap_err();
    assert!(matches!(err, NarrativeError::Serialization { .. }));
}

#[tokio::test]
async fn test_pipeline_writes_placeholder_when_service_fails() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pairs.csv");
    std::fs::write(&input, "p,q\n1,3\n2,1\n3,2\n4,6\n").unwrap();
    let out = dir.path().join("report");

    let pipeline = Pipeline::new(
        PipelineConfig::default().with_output_dir(&out),
        Arc::new(client(&server)),
    );
    let outcome = pipeline.run(&input).await.unwrap();

    assert!(matches!(outcome.narrative, NarrativeOutcome::Failed(_)));
    let report = std::fs::read_to_string(outcome.report_path).unwrap();
    assert!(report.contains(FAILED_NARRATIVE));
    assert!(!report.contains("Service Unavailable"));
}
