//! Remote explanation service client.
//!
//! Speaks the OpenAI-compatible `POST {base_url}/chat/completions` contract.
//! Each configured model name becomes one [`RemoteVariant`]; variants share a
//! single HTTP client.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ExplanationRequest;
use super::chain::Strategy;
use super::prompt;
use crate::error::{AssessError, Result};
use crate::utils::format::truncate_string;

/// Shortest explanation cap that still leaves text next to the ellipsis.
pub const MIN_EXPLANATION_CHARS: usize = 4;

/// Failure of one remote attempt. Always recovered by advancing the chain.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty explanation")]
    Empty,
}

/// Connection settings for the remote service.
#[derive(Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub max_chars: usize,
    pub temperature: f32,
}

impl std::fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("max_chars", &self.max_chars)
            .field("temperature", &self.temperature)
            .finish()
    }
}

pub struct CompletionClient {
    endpoint: String,
    api_key: String,
    max_tokens: u32,
    max_chars: usize,
    temperature: f32,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("endpoint", &self.endpoint)
            .field("max_tokens", &self.max_tokens)
            .field("max_chars", &self.max_chars)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionClient {
    pub fn new(settings: &RemoteSettings) -> Result<Self> {
        let base_url = settings.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(AssessError::Config("explain.base_url is empty".to_string()));
        }
        if settings.max_chars < MIN_EXPLANATION_CHARS {
            return Err(AssessError::Config(format!(
                "explain.max_chars must be at least {MIN_EXPLANATION_CHARS}, got {}",
                settings.max_chars
            )));
        }
        if base_url.starts_with("http://") {
            tracing::warn!("explanation endpoint uses plain HTTP, the API key is sent unencrypted");
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout.max(Duration::from_millis(100)))
            .build()
            .map_err(|err| AssessError::Config(format!("explanation http client: {err}")))?;

        Ok(Self {
            endpoint: format!("{base_url}/chat/completions"),
            api_key: settings.api_key.clone(),
            max_tokens: settings.max_tokens,
            max_chars: settings.max_chars,
            temperature: settings.temperature,
            client,
        })
    }

    /// One completion call against `model`. Never retried.
    pub fn complete(
        &self,
        model: &str,
        request: &ExplanationRequest,
    ) -> std::result::Result<String, RemoteError> {
        let user_prompt = prompt::render(request);
        let body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::Malformed("no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let text = truncate_string(content.trim(), self.max_chars);
        if text.trim_end_matches('.').trim().is_empty() {
            return Err(RemoteError::Empty);
        }
        Ok(text)
    }
}

/// A named model variant at the shared endpoint.
#[derive(Debug, Clone)]
pub struct RemoteVariant {
    model: String,
    client: Arc<CompletionClient>,
}

impl RemoteVariant {
    pub fn new(model: impl Into<String>, client: Arc<CompletionClient>) -> Self {
        Self {
            model: model.into(),
            client,
        }
    }
}

impl Strategy<ExplanationRequest> for RemoteVariant {
    type Output = String;
    type Error = RemoteError;

    fn name(&self) -> &str {
        &self.model
    }

    fn attempt(&self, input: &ExplanationRequest) -> std::result::Result<String, RemoteError> {
        self.client.complete(&self.model, input)
    }
}
