//! Model configuration resolved from explicit arguments with environment
//! fallback. Validation happens here, at construction, so a misconfigured
//! caller never gets as far as its first request.

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Planning wants reproducible-leaning output; execution favors fluency.
pub const PLANNER_TEMPERATURE: f64 = 0.2;
pub const EXECUTOR_TEMPERATURE: f64 = 1.0;

/// The environment variable names one model reads its triple from.
#[derive(Debug, Clone, Copy)]
pub struct EnvTriple {
    pub model_id: &'static str,
    pub api_key: &'static str,
    pub base_url: &'static str,
}

/// Planner-side model (OpenAI-compatible endpoint).
pub const PLANNER_ENV: EnvTriple = EnvTriple {
    model_id: "GPT_MODEL_ID",
    api_key: "MODEL_API_KEY",
    base_url: "GPT_API_URL",
};

/// Executor-side model (Gemini endpoint).
pub const EXECUTOR_ENV: EnvTriple = EnvTriple {
    model_id: "GEMINI_MODEL_ID",
    api_key: "MODEL_API_KEY",
    base_url: "GEMINI_API_URL",
};

/// Immutable per-model configuration. `model_id`, `api_key` and `base_url`
/// are guaranteed non-empty once a value of this type exists.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_id: String,
    pub api_key: String,
    pub base_url: String,
    pub temperature: f64,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl ModelConfig {
    /// Resolve a config from explicit overrides, falling back to the given
    /// environment variables for any field left as `None`.
    pub fn resolve(
        env: &EnvTriple,
        model_id: Option<&str>,
        api_key: Option<&str>,
        base_url: Option<&str>,
        temperature: f64,
    ) -> Result<Self, ConfigError> {
        let model_id = resolve_field("model_id", env.model_id, model_id)?;
        let api_key = resolve_field("api_key", env.api_key, api_key)?;
        let base_url = resolve_field("base_url", env.base_url, base_url)?;

        Ok(Self {
            model_id,
            api_key,
            base_url,
            temperature,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Planner-side config from `GPT_MODEL_ID` / `MODEL_API_KEY` /
    /// `GPT_API_URL`.
    pub fn planner_from_env() -> Result<Self, ConfigError> {
        Self::resolve(&PLANNER_ENV, None, None, None, PLANNER_TEMPERATURE)
    }

    /// Executor-side config from `GEMINI_MODEL_ID` / `MODEL_API_KEY` /
    /// `GEMINI_API_URL`.
    pub fn executor_from_env() -> Result<Self, ConfigError> {
        Self::resolve(&EXECUTOR_ENV, None, None, None, EXECUTOR_TEMPERATURE)
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }
}

fn resolve_field(
    field: &'static str,
    env_var: &'static str,
    explicit: Option<&str>,
) -> Result<String, ConfigError> {
    let value = explicit
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .unwrap_or_default();

    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { field, env_var });
    }
    Ok(value)
}
