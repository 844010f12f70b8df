//! Narrative generation by a remote text-generation service.
//!
//! The service is an external collaborator: it receives the assembled
//! [`ReportPayload`] and returns prose. Its failure never aborts a run;
//! instead the report carries a fixed placeholder sentence. A failed call, a
//! reply without any message content, and a reply whose content is blank are
//! kept apart as [`NarrativeOutcome::Failed`], [`NarrativeOutcome::Empty`] and
//! [`NarrativeOutcome::Blank`].

mod client;
mod error;
mod prompt;

pub use client::ChatCompletionClient;
pub use error::{NarrativeError, NarrativeResult};
pub use prompt::build_prompt;

use async_trait::async_trait;
use serde::Serialize;

use crate::report::ReportPayload;

/// Placeholder used when the service answered without any message content.
pub const EMPTY_NARRATIVE: &str = "No narrative generated.";

/// Placeholder used when the message content is present but blank.
pub const BLANK_NARRATIVE: &str =
    "Error: Narrative generation failed. Please verify the AI service.";

/// Placeholder used when the service could not be reached or refused the request.
pub const FAILED_NARRATIVE: &str =
    "Error: Unable to generate narrative. Please check the AI service.";

/// Result of one narrative request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum NarrativeOutcome {
    /// Prose returned by the service.
    Generated(String),
    /// The service succeeded but returned no message content.
    Empty,
    /// The message content was empty or whitespace.
    Blank,
    /// The request failed; carries the error message.
    Failed(String),
}

impl NarrativeOutcome {
    /// Classifies the text returned by a successful call.
    pub fn from_text(text: Option<String>) -> Self {
        match text {
            Some(text) if text.trim().is_empty() => NarrativeOutcome::Blank,
            Some(text) => NarrativeOutcome::Generated(text),
            None => NarrativeOutcome::Empty,
        }
    }

    /// Text to place in the report.
    pub fn text(&self) -> &str {
        match self {
            NarrativeOutcome::Generated(text) => text,
            NarrativeOutcome::Empty => EMPTY_NARRATIVE,
            NarrativeOutcome::Blank => BLANK_NARRATIVE,
            NarrativeOutcome::Failed(_) => FAILED_NARRATIVE,
        }
    }

    /// True when the report will carry a placeholder.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, NarrativeOutcome::Generated(_))
    }
}

/// Produces a narrative for an assembled report.
///
/// Implementations must not fail: every problem is folded into the outcome.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use term_explore::narrative::{NarrativeGenerator, NarrativeOutcome};
/// use term_explore::report::ReportPayload;
///
/// struct Fixed;
///
/// #[async_trait]
/// impl NarrativeGenerator for Fixed {
///     async fn generate(&self, payload: &ReportPayload) -> NarrativeOutcome {
///         let text = format!("{} has {} rows.", payload.dataset, payload.row_count);
///         NarrativeOutcome::Generated(text)
///     }
/// }
/// ```
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, payload: &ReportPayload) -> NarrativeOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_distinct() {
        assert_eq!(NarrativeOutcome::Empty.text(), "No narrative generated.");
        assert_eq!(
            NarrativeOutcome::Failed("timeout".into()).text(),
            "Error: Unable to generate narrative. Please check the AI service."
        );
        assert_eq!(
            NarrativeOutcome::Blank.text(),
            "Error: Narrative generation failed. Please verify the AI service."
        );
        assert_ne!(
            NarrativeOutcome::Empty,
            NarrativeOutcome::Failed(String::new())
        );
    }

    #[test]
    fn test_from_text() {
        assert_eq!(
            NarrativeOutcome::from_text(Some("Story".into())),
            NarrativeOutcome::Generated("Story".into())
        );
        assert_eq!(
            NarrativeOutcome::from_text(Some("  \n".into())),
            NarrativeOutcome::Blank
        );
        assert_eq!(
            NarrativeOutcome::from_text(Some(String::new())),
            NarrativeOutcome::Blank
        );
        assert_eq!(NarrativeOutcome::from_text(None), NarrativeOutcome::Empty);
        assert!(!NarrativeOutcome::Generated("x".into()).is_degraded());
        assert!(NarrativeOutcome::Empty.is_degraded());
        assert!(NarrativeOutcome::Blank.is_degraded());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(NarrativeOutcome::Failed("boom".into())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["detail"], "boom");
    }
}
