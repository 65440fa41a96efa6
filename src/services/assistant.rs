// src/services/assistant.rs
//! Resume-grounded chat replies from a hosted chat-completion API.
//!
//! Each call is one round-trip: the fixed portfolio prompt plus the latest
//! user message. Earlier turns are never forwarded.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;
use crate::error::UpstreamError;

pub const PORTFOLIO_CONTEXT: &str = include_str!("../../prompts/portfolio_context.txt");

pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't process that request.";

#[async_trait]
pub trait Assistant: Send + Sync {
    async fn reply(&self, user_message: &str) -> Result<String, UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiAssistant {
    client: Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiAssistant {
    pub fn new(config: OpenAiConfig) -> Self {
        if config.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set, chat replies will use the fallback message");
        }
        Self {
            client: Client::new(),
            api_url: config.api_url,
            model: config.model,
            api_key: config.api_key,
        }
    }

    fn request_body<'a>(&'a self, user_message: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                WireMessage { role: "system", content: PORTFOLIO_CONTEXT },
                WireMessage { role: "user", content: user_message },
            ],
        }
    }
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    async fn reply(&self, user_message: &str) -> Result<String, UpstreamError> {
        let key = self.api_key.as_deref().ok_or(UpstreamError::MissingApiKey)?;

        tracing::debug!(model = %self.model, content_len = user_message.len(), "sending LLM request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(key)
            .json(&self.request_body(user_message))
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Decode("response has no choices".to_string()))?;

        let text = choice
            .message
            .content
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string());

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
