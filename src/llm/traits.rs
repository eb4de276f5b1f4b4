use crate::llm::types::ChatMessage;
use async_trait::async_trait;

/// A remote text-generation capability: send role-tagged messages, get text
/// back. Implementations report transport and API failures as errors; retry
/// policy lives in [`crate::llm::ModelCaller`], not here.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai", "gemini").
    fn name(&self) -> &str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String>;
}
