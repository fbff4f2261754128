use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use postwise_core::config::{LlmConfig, LlmProvider};
use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured for provider `{0}`")]
    MissingApiKey(String),
    #[error("chat completion failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("chat completion returned no choices")]
    EmptyResponse,
}

/// OpenAI-compatible `chat/completions` client (Groq, OpenAI, Ollama).
pub struct ChatCompletionClient {
    http: HttpClient,
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client for chat completions")?;
        let base_url = config.effective_base_url();

        Ok(Self {
            http,
            provider: config.provider,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for ChatCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let has_key =
            self.api_key.as_ref().is_some_and(|key| !key.expose_secret().trim().is_empty());
        if self.provider.requires_api_key() && !has_key {
            return Err(LlmError::MissingApiKey(self.provider.to_string()).into());
        }

        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            top_p: 1.0,
            max_tokens: self.max_tokens,
            stream: false,
        };
        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        debug!(
            event_name = "llm.completion.request",
            provider = %self.provider,
            model = %self.model,
            messages = messages.len(),
            "sending chat completion"
        );
        let response = builder.send().await.context("chat completion request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status: status.as_u16(), body }.into());
        }

        let parsed: CompletionResponse =
            response.json().await.context("chat completion response was not valid JSON")?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::EmptyResponse.into())
    }
}
