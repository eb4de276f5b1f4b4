//! The retrying boundary around a provider. Callers receive an explicit
//! success/failure value; provider errors never escape `invoke`.

use crate::config::ModelConfig;
use crate::llm::traits::Provider;
use crate::llm::types::ChatMessage;

/// Stand-in text for a call that succeeded but carried no content.
pub const NO_RESPONSE_PLACEHOLDER: &str = "[no response received from the model]";

/// Outcome of a model invocation. `#[must_use]` so calling code cannot
/// silently drop a failure.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success(String),
    /// All attempts failed; details were already logged.
    Failure,
}

impl CallOutcome {
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Success(text) => Some(text),
            Self::Failure => None,
        }
    }
}

/// One provider plus its immutable configuration. Instantiated twice per
/// agent run: once for planning, once for execution.
pub struct ModelCaller {
    provider: Box<dyn Provider>,
    config: ModelConfig,
}

impl ModelCaller {
    pub fn new(provider: Box<dyn Provider>, config: ModelConfig) -> Self {
        Self { provider, config }
    }

    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    /// Send the messages, retrying on any failure up to the configured
    /// attempt count with no backoff. Exhausted retries degrade to
    /// [`CallOutcome::Failure`] rather than an error.
    pub async fn invoke(&self, messages: &[ChatMessage]) -> CallOutcome {
        let max_attempts = self.config.max_retries;

        for attempt in 1..=max_attempts {
            tracing::info!(
                provider = self.provider.name(),
                model = %self.config.model_id,
                attempt,
                max_attempts,
                "calling model"
            );

            match self
                .provider
                .complete(messages, &self.config.model_id, self.config.temperature)
                .await
            {
                Ok(text) => {
                    if text.trim().is_empty() {
                        tracing::warn!(
                            provider = self.provider.name(),
                            "model returned an empty response"
                        );
                        return CallOutcome::Success(NO_RESPONSE_PLACEHOLDER.to_string());
                    }
                    tracing::debug!(chars = text.len(), "model responded");
                    return CallOutcome::Success(text);
                }
                Err(error) => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        attempt,
                        max_attempts,
                        "model call failed: {error:#}"
                    );
                }
            }
        }

        tracing::error!(
            provider = self.provider.name(),
            model = %self.config.model_id,
            "all attempts failed; giving up"
        );
        CallOutcome::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvTriple;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const UNSET_ENV: EnvTriple = EnvTriple {
        model_id: "PLANSOLVE_TEST_UNSET_MODEL",
        api_key: "PLANSOLVE_TEST_UNSET_KEY",
        base_url: "PLANSOLVE_TEST_UNSET_URL",
    };

    fn test_config(max_retries: u32) -> ModelConfig {
        ModelConfig::resolve(
            &UNSET_ENV,
            Some("test-model"),
            Some("test-key"),
            Some("https://example.invalid"),
            0.0,
        )
        .unwrap()
        .with_max_retries(max_retries)
    }

    struct MockProvider {
        calls: Arc<AtomicUsize>,
        fail_until_attempt: usize,
        response: &'static str,
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _model: &str,
            _temperature: f64,
        ) -> anyhow::Result<String> {
            let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.fail_until_attempt {
                anyhow::bail!("temporary failure");
            }
            Ok(self.response.to_string())
        }
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let caller = ModelCaller::new(
            Box::new(MockProvider {
                calls: Arc::clone(&calls),
                fail_until_attempt: 0,
                response: "ok",
            }),
            test_config(3),
        );

        let outcome = caller.invoke(&[ChatMessage::user("hello")]).await;
        assert_eq!(outcome, CallOutcome::Success("ok".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_recovers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let caller = ModelCaller::new(
            Box::new(MockProvider {
                calls: Arc::clone(&calls),
                fail_until_attempt: 2,
                response: "recovered",
            }),
            test_config(3),
        );

        let outcome = caller.invoke(&[ChatMessage::user("hello")]).await;
        assert_eq!(outcome, CallOutcome::Success("recovered".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_failure_after_exhausting_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let caller = ModelCaller::new(
            Box::new(MockProvider {
                calls: Arc::clone(&calls),
                fail_until_attempt: usize::MAX,
                response: "never",
            }),
            test_config(3),
        );

        let outcome = caller.invoke(&[ChatMessage::user("hello")]).await;
        assert_eq!(outcome, CallOutcome::Failure);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_response_becomes_placeholder_not_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let caller = ModelCaller::new(
            Box::new(MockProvider {
                calls: Arc::clone(&calls),
                fail_until_attempt: 0,
                response: "   ",
            }),
            test_config(3),
        );

        let outcome = caller.invoke(&[ChatMessage::user("hello")]).await;
        assert_eq!(
            outcome,
            CallOutcome::Success(NO_RESPONSE_PLACEHOLDER.to_string())
        );
        // No retries: an empty response is a warning, not a failure.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn into_text_maps_failure_to_none() {
        assert_eq!(
            CallOutcome::Success("x".into()).into_text(),
            Some("x".to_string())
        );
        assert_eq!(CallOutcome::Failure.into_text(), None);
    }
}
