//! LLM API interaction for the translation stage.
//!
//! This module provides a minimal interface for communicating with an
//! OpenAI-compatible chat-completion API.
//!
//! # Architecture
//!
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`ChatClient`]: `reqwest` implementation posting to `/chat/completions`
//!
//! Each prompt is sent exactly once. A failed call is reported to the
//! caller, which decides how to degrade; there is no retry layer.

use crate::config::TranslatorConfig;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

/// Trait for async LLM interaction.
///
/// Implementors send a single-turn prompt to a model and return its reply
/// text. The translator is generic over this trait so tests can script the
/// model's behaviour.
#[allow(async_fn_in_trait)]
pub trait AskAsync {
    /// Send `prompt` as one user message and return the reply text.
    async fn ask(&self, prompt: &str) -> Result<String, ApiError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl ChatClient {
    /// Build a client from the translator configuration.
    ///
    /// A missing API key is not an error here; it surfaces on the first
    /// call instead.
    pub fn new(config: &TranslatorConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            endpoint: chat_endpoint(&config.api_base)?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl AskAsync for ChatClient {
    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &str) -> Result<String, ApiError> {
        let api_key = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;

        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let t0 = Instant::now();
        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        // read as text first so an error body is not lost to a JSON failure
        let text = resp.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = dt.as_millis() as u64,
                "API call failed"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ApiError::MissingContent)?;

        debug!(
            elapsed_ms = dt.as_millis() as u64,
            bytes = content.len(),
            "API call succeeded"
        );
        Ok(content)
    }
}

/// `{api_base}/chat/completions`, tolerating a trailing slash on the base.
pub fn chat_endpoint(api_base: &str) -> Result<Url, ApiError> {
    let base = Url::parse(&format!("{}/", api_base.trim_end_matches('/')))?;
    Ok(base.join("chat/completions")?)
}

/// Pull `error.message` out of an error body, falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
