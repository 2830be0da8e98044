//! Generation capability: one deterministic completion per intake request.
//!
//! The pipeline sends exactly one request per document — no retry, no
//! sampling spread. A failed or useless reply ends the request with a
//! diagnostic response instead of burning tokens on a second attempt; the
//! tolerant parser downstream already absorbs the common formatting
//! deviations that a retry would be re-rolling against.
//!
//! [`TextGenerator`] is the seam for tests: the orchestrator only ever sees
//! the trait, so a deterministic fake can stand in for the HTTP client.

use crate::config::IntakeConfig;
use crate::error::IntakeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// A text-generation capability: prompt in, free-form reply out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Request a single completion for the given system + user content.
    ///
    /// Returns the reply's primary text payload, which may be empty; the
    /// reply parser decides what empty means.
    async fn generate(&self, system: &str, user: &str) -> Result<String, IntakeError>;
}

/// Generator backed by the OpenAI chat-completions API.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl OpenAiGenerator {
    /// Build a generator from the intake config.
    ///
    /// Fails when no credential was injected — the pipeline never falls
    /// back to ambient environment lookup.
    pub fn from_config(config: &IntakeConfig) -> Result<Self, IntakeError> {
        if config.api_key.is_empty() {
            return Err(IntakeError::InvalidConfig(
                "no generation credential configured; set api_key or inject a generator".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| IntakeError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, system: &str, user: &str) -> Result<String, IntakeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let start = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| IntakeError::GenerationFailed {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntakeError::GenerationFailed {
                detail: format!("HTTP {}: {}", status, body),
            });
        }

        let reply: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| IntakeError::GenerationFailed {
                    detail: format!("unreadable response body: {}", e),
                })?;

        if let Some(usage) = &reply.usage {
            debug!(
                "Generation: {} input tokens, {} output tokens, {:?}",
                usage.prompt_tokens,
                usage.completion_tokens,
                start.elapsed()
            );
        }

        Ok(reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}
