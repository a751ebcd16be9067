//! # Chat Completions Client
//!
//! Blocking client for OpenAI-compatible `/chat/completions` endpoints.
//! Each prompt is sent as a single user message at temperature zero so the
//! same context yields the same answer as far as the service allows.

use std::time::Duration;

use animerec_core::{RecommenderError, TextGenerator};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LlmError, Result};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Bearer token.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API root, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: 0.0,
        }
    }
}

impl LlmConfig {
    /// Configuration with the given key and defaults elsewhere.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
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
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// OpenAI-compatible chat completion client.
pub struct OpenAiClient {
    client: Client,
    config: LlmConfig,
}

impl OpenAiClient {
    /// Builds a client.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiKey` if the key is blank, or
    /// `LlmError::Http` if the HTTP client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// The client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Sends `prompt` as a single user message and returns the reply.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Http` on transport failures, `LlmError::Api` on a
    /// non-success status and `LlmError::EmptyResponse` if no text came back.
    pub fn chat(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending chat request");
        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "chat request rejected");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<ChatResponse>()?.into_text()
    }
}

impl TextGenerator for OpenAiClient {
    fn complete(&self, prompt: &str) -> animerec_core::Result<String> {
        self.chat(prompt).map_err(RecommenderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_single_user_message() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn response_yields_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Watch Trigun."}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Watch Trigun.");
    }

    #[test]
    fn response_without_content_is_empty() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(response.into_text(), Err(LlmError::EmptyResponse)));

        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(response.into_text(), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn blank_key_is_rejected() {
        assert!(matches!(
            OpenAiClient::new(LlmConfig::new("  ")),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let config = LlmConfig::new("k").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(LlmConfig::default().endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn builder_sets_fields() {
        let client = OpenAiClient::new(
            LlmConfig::new("sk-test")
                .with_model("gpt-4o")
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(client.config().model, "gpt-4o");
        assert_eq!(client.config().timeout, Duration::from_secs(5));
        assert_eq!(client.config().temperature, 0.0);
    }

    #[test]
    fn unreachable_server_is_generation_error() {
        let client = OpenAiClient::new(
            LlmConfig::new("sk-test")
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let err = client.complete("prompt").unwrap_err();
        assert!(matches!(err, RecommenderError::Generation(_)));
    }
}
