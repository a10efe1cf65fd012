//! Mock chat-completion server for remote explanation tests.
//!
//! Wraps an `httpmock` server and registers one mock per model variant,
//! matched on the `"model"` field of the request body.
//!
//! # Example
//! ```ignore
//! let server = CompletionServer::start();
//! server.fail("variant-a", 500);
//! let ok = server.reply("variant-b", "Deny permissions the feature does not need.");
//! let client = CompletionClient::new(&settings_for(&server))?;
//! ```

use std::time::Duration;

use httpmock::Mock;
use httpmock::prelude::*;
use serde_json::json;

use crate::explain::RemoteSettings;

pub const TEST_API_KEY: &str = "test-key";

pub struct CompletionServer {
    server: MockServer,
}

impl CompletionServer {
    /// Start a new mock server on a random available port.
    pub fn start() -> Self {
        Self {
            server: MockServer::start(),
        }
    }

    pub fn base_url(&self) -> String {
        self.server.base_url()
    }

    fn model_marker(model: &str) -> String {
        format!("\"model\":\"{model}\"")
    }

    /// Answer requests for `model` with a chat completion containing `content`.
    pub fn reply(&self, model: &str, content: &str) -> Mock<'_> {
        let marker = Self::model_marker(model);
        let content = content.to_string();
        self.server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_includes(marker);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
                }));
        })
    }

    /// Answer requests for `model` with a bare status code.
    pub fn fail(&self, model: &str, status: u16) -> Mock<'_> {
        let marker = Self::model_marker(model);
        self.server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_includes(marker);
            then.status(status).body("upstream unavailable");
        })
    }

    /// Answer requests for `model` with a raw 200 body.
    pub fn raw(&self, model: &str, body: &str) -> Mock<'_> {
        let marker = Self::model_marker(model);
        let body = body.to_string();
        self.server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_includes(marker);
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        })
    }

    /// Answer requests for `model` with `content`, but only after `delay`.
    pub fn stall(&self, model: &str, delay: Duration, content: &str) -> Mock<'_> {
        let marker = Self::model_marker(model);
        let content = content.to_string();
        self.server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_includes(marker);
            then.status(200)
                .delay(delay)
                .header("content-type", "application/json")
                .json_body(json!({
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
                }));
        })
    }

    /// Answer only when the bearer key is present and the prompt mentions
    /// `question`.
    pub fn expect_prompt(&self, model: &str, question: &str) -> Mock<'_> {
        let marker = Self::model_marker(model);
        let question = question.to_string();
        self.server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", format!("Bearer {TEST_API_KEY}"))
                .body_includes(marker)
                .body_includes(question);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "ok"}}]
                }));
        })
    }
}

/// Remote settings pointing at `server` with short timeouts.
pub fn settings_for(server: &CompletionServer) -> RemoteSettings {
    RemoteSettings {
        base_url: server.base_url(),
        api_key: TEST_API_KEY.to_string(),
        timeout: Duration::from_secs(5),
        max_tokens: 200,
        max_chars: 1200,
        temperature: 0.2,
    }
}
