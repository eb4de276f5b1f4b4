use thiserror::Error;

// ─── Config errors ───────────────────────────────────────────────────────────

/// Raised at `ModelConfig` construction when a required field is absent.
///
/// Configuration problems are the one fatal error class: everything past
/// construction degrades instead of propagating.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("model configuration is missing required field `{field}` (set {env_var} or pass it explicitly)")]
    MissingField {
        field: &'static str,
        env_var: &'static str,
    },
}

// ─── Prompt / Template errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("template render failed: {0}")]
    Render(String),
}

// ─── Plan parsing errors ────────────────────────────────────────────────────

/// Failures while turning the planner model's raw reply into a step list.
/// The planner collapses all of these to an empty plan.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("no ```python fenced block found in the model output")]
    FenceMissing,

    #[error("plan literal is malformed: {0}")]
    Malformed(String),

    #[error("plan literal is not a list")]
    NotAList,

    #[error("plan step {index} is not a string literal")]
    NonStringStep { index: usize },
}
