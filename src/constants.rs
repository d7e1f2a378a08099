//! Compile-time constants and tunables shared across the crate.

/// Application name used for config directories and log targets.
pub const APP_NAME: &str = "agent-studio";

/// Default OpenAI model used for personality suggestions.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default Gemini model used for personality suggestions.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Soft word limit requested from the model for a suggested personality.
pub const SUGGESTION_WORD_LIMIT: usize = 100;
/// Upper bound on a single suggestion request, so a hung call still settles.
pub const SUGGEST_TIMEOUT_SECS: u64 = 60;

/// Maximum number of log entries kept in the activity panel.
pub const MAX_LOGS: usize = 1000;

/// Env var naming a file that receives `tracing` output.
pub const LOG_FILE_VAR: &str = "AGENT_STUDIO_LOG";
/// Default `tracing` filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "agent_studio=debug";
