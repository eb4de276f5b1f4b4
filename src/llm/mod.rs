// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod traits;
pub mod types;

// ── Retry boundary ──────────────────────────────────────────────────────────
pub mod caller;

// ── Provider implementations ────────────────────────────────────────────────
pub mod compatible;
pub mod gemini;

// ── Re-exports ──────────────────────────────────────────────────────────────
pub use caller::{CallOutcome, ModelCaller, NO_RESPONSE_PLACEHOLDER};
pub use compatible::OpenAiCompatibleProvider;
pub use gemini::GeminiProvider;
pub use http_client::build_provider_client;
pub use scrub::sanitize_api_error;
pub use traits::Provider;
pub use types::{ChatMessage, MessageRole};
