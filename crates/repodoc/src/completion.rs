//! Chat-completion client
//!
//! The generator talks to the model through [`CompletionClient`]. The
//! production implementation, [`OpenAiClient`], speaks the OpenAI
//! `/chat/completions` wire format, which most hosted providers accept.

use crate::error::DocError;
use crate::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_USER_AGENT, OPENAI_API_URL};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Turns a prompt into generated text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Model identifier sent with each request
    fn model(&self) -> &str;

    /// Send a system instruction and a user prompt, return the first choice
    ///
    /// A response without choices yields an empty string, not an error.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, DocError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
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
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `{"error": {"message": ...}}` body returned on failure
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

impl ChatResponse {
    fn into_text(self) -> String {
        self.choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

/// Builder for [`OpenAiClient`]
#[derive(Debug, Clone)]
pub struct OpenAiClientBuilder {
    api_key: String,
    base_url: Option<Url>,
    model: String,
    temperature: f32,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl OpenAiClientBuilder {
    /// Override the API base URL (default `https://api.openai.com/v1`)
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Apply a total timeout to every request. No timeout by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<OpenAiClient, DocError> {
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DocError::ClientBuildError)?;

        let base_url = self
            .base_url
            .map(|url| url.as_str().trim_end_matches('/').to_string())
            .unwrap_or_else(|| OPENAI_API_URL.to_string());

        Ok(OpenAiClient {
            client,
            endpoint: format!("{}/chat/completions", base_url),
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
        })
    }
}

/// Client for OpenAI-compatible chat-completion endpoints
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Create a builder with the given API key
    pub fn builder(api_key: impl Into<String>) -> OpenAiClientBuilder {
        OpenAiClientBuilder {
            api_key: api_key.into(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            user_agent: None,
            timeout: None,
        }
    }

    /// Sampling temperature sent with each request
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, DocError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Requesting completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocError::Completion(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DocError::Completion(e.to_string()))?;

        if !status.is_success() {
            return Err(DocError::Completion(provider_error_message(
                status.as_u16(),
                &body,
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| DocError::Completion(format!("Malformed completion response: {}", e)))?;

        Ok(parsed.into_text())
    }
}

/// Prefer the provider's own message, fall back to the status code
fn provider_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ProviderErrorBody>(body) {
        Ok(parsed) => format!("{} {}", status, parsed.error.message),
        Err(_) => format!("HTTP {}", status),
    }
}
