//! Google Gemini provider speaking the `generateContent` API.

use crate::llm::http_client::build_provider_client;
use crate::llm::scrub::sanitize_api_error;
use crate::llm::traits::Provider;
use crate::llm::types::{ChatMessage, MessageRole};
use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl GeminiProvider {
    /// `base_url` is the API version root, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: build_provider_client(timeout_secs),
        }
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn generate_url(&self, model: &str) -> String {
        let model_name = Self::model_name(model);
        format!(
            "{}/{model_name}:generateContent?key={}",
            self.base_url, self.api_key
        )
    }

    fn build_request(messages: &[ChatMessage], temperature: f64) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: messages
                .iter()
                .map(|message| Content {
                    // Gemini knows "user" and "model"; system text rides
                    // along as user content.
                    role: match message.role {
                        MessageRole::Assistant => "model",
                        MessageRole::User | MessageRole::System => "user",
                    },
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                })
                .collect(),
            generation_config: GenerationConfig { temperature },
        }
    }

    fn extract_text(result: &GenerateContentResponse) -> anyhow::Result<String> {
        let candidate = result
            .candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| anyhow::anyhow!("No response from Gemini"))?;

        let mut out = String::new();
        for part in &candidate.content.parts {
            if let Some(text) = &part.text {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }

        // A candidate with no text is an empty response; the caller layer
        // decides what to do with it.
        Ok(out)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let request = Self::build_request(messages, temperature);

        let response = self
            .client
            .post(self.generate_url(model))
            .json(&request)
            .send()
            .await
            .context("Gemini request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let sanitized_error = sanitize_api_error(&error_text);
            anyhow::bail!("Gemini API error ({status}): {sanitized_error}");
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .context("Gemini response JSON decode failed")?;

        if let Some(err) = result.error.as_ref() {
            anyhow::bail!("Gemini API error: {}", sanitize_api_error(&err.message));
        }

        Self::extract_text(&result)
    }
}
