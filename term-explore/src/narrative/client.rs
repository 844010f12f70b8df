use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::prompt::build_prompt;
use super::{NarrativeError, NarrativeGenerator, NarrativeOutcome, NarrativeResult};
use crate::config::NarrativeConfig;
use crate::logging::truncate_field;
use crate::report::ReportPayload;

const MAX_LOGGED_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// The subset of a chat-completions response that carries the text.
#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
///
/// Requests are sent once, without a client-side timeout or retries.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    config: Arc<NarrativeConfig>,
    client: Client,
}

impl ChatCompletionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NarrativeConfig) -> NarrativeResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| NarrativeError::Configuration {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    /// Sends `prompt` as a single user message and returns the generated text.
    ///
    /// `Ok(None)` means the service answered successfully but the response
    /// carried no text.
    pub async fn complete(&self, prompt: &str) -> NarrativeResult<Option<String>> {
        let request = ChatRequest {
            model: self.config.model(),
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens(),
            temperature: self.config.temperature(),
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(self.config.token().expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| NarrativeError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrativeError::HttpStatus {
                status: status.as_u16(),
                body: truncate_field(&body, MAX_LOGGED_BODY),
            });
        }

        let body: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| NarrativeError::Serialization {
                    message: e.to_string(),
                })?;
        Ok(body.into_text())
    }
}

#[async_trait]
impl NarrativeGenerator for ChatCompletionClient {
    #[instrument(skip_all, fields(model = self.config.model(), dataset = %payload.dataset))]
    async fn generate(&self, payload: &ReportPayload) -> NarrativeOutcome {
        let prompt = build_prompt(payload);
        debug!(
            prompt_chars = prompt.len(),
            prompt = %truncate_field(&prompt, MAX_LOGGED_BODY),
            "Requesting narrative"
        );

        match self.complete(&prompt).await {
            Ok(text) => {
                let outcome = NarrativeOutcome::from_text(text);
                match &outcome {
                    NarrativeOutcome::Generated(text) => {
                        info!(chars = text.len(), "Narrative generated")
                    }
                    _ => warn!("Narrative service returned no text"),
                }
                outcome
            }
            Err(e) => {
                warn!(error = %e, "Narrative generation failed");
                NarrativeOutcome::Failed(e.to_string())
            }
        }
    }
}
