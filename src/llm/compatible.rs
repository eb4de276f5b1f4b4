//! Generic OpenAI-compatible provider.
//! Most hosted LLM APIs follow the same `/chat/completions` format, so a
//! single implementation covers OpenAI itself plus the long tail of
//! compatible gateways.

use crate::llm::http_client::build_provider_client;
use crate::llm::scrub::sanitize_api_error;
use crate::llm::traits::Provider;
use crate::llm::types::ChatMessage;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OpenAiCompatibleProvider {
    name: String,
    /// Pre-computed `Authorization` header value (avoids `format!` per request).
    cached_auth: String,
    /// Pre-computed chat completions URL (avoids `format!` per request).
    cached_chat_url: String,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &str, base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let cached_chat_url = if base_url.contains("chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            name: name.to_string(),
            cached_auth: format!("Bearer {api_key}"),
            cached_chat_url,
            client: build_provider_client(timeout_secs),
        }
    }

    fn chat_completions_url(&self) -> &str {
        &self.cached_chat_url
    }

    async fn call_chat_completions(&self, request: &ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let response = self
            .client
            .post(self.chat_completions_url())
            .header("Authorization", &self.cached_auth)
            .json(request)
            .send()
            .await
            .with_context(|| format!("{} chat completions request failed", self.name))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            let sanitized_error = sanitize_api_error(&error);
            anyhow::bail!("{} API error ({status}): {sanitized_error}", self.name);
        }

        response
            .json()
            .await
            .with_context(|| format!("{} chat completions JSON decode failed", self.name))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let request = ChatRequest {
            model,
            messages: messages
                .iter()
                .map(|message| WireMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            temperature,
        };

        let chat_response = self.call_chat_completions(&request).await?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No response from {}", self.name))?;

        // A present-but-empty content field is the caller's concern, not a
        // transport failure.
        Ok(choice.message.content.unwrap_or_default())
    }
}
