//! Personality suggestions — the adapter between an agent's name and an
//! external text-generation service.
//!
//! Every backend implements [`PersonalitySuggester`]: one call, one prompt,
//! the generated text returned verbatim.  Nothing here retries; a failed
//! suggestion is surfaced and the user can simply ask again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;
use tracing::warn;

use crate::constants::{SUGGEST_TIMEOUT_SECS, SUGGESTION_WORD_LIMIT};
use crate::gemini::{GeminiClient, extract_candidate_text};
use crate::openai::{OpenAiClient, extract_output_items, extract_output_text};

/// Why a suggestion could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: &'static str },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} error {status}: {body}")]
    Service {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response contained no text")]
    EmptyResponse,
}

/// Generates a personality description from a character name.
#[async_trait]
pub trait PersonalitySuggester: Send + Sync {
    /// `character_name` is already trimmed and non-empty.
    async fn suggest(&self, character_name: &str) -> Result<String, SuggestError>;

    /// Short human-readable backend description for status displays.
    fn label(&self) -> String;
}

/// The fixed prompt sent for `character_name`.
pub fn personality_prompt(character_name: &str) -> String {
    format!(
        "You are an expert character designer. Write a short, first-person personality \
         description for a character named \"{character_name}\". The description should be \
         under {SUGGESTION_WORD_LIMIT} words and define their core traits, how they speak, \
         and their general attitude."
    )
}

pub(crate) fn build_http_client() -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(SUGGEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|err| {
            warn!("falling back to default HTTP client: {err}");
            HttpClient::new()
        })
}

fn non_empty(text: String) -> Result<String, SuggestError> {
    if text.is_empty() {
        Err(SuggestError::EmptyResponse)
    } else {
        Ok(text)
    }
}

// ── Backends ─────────────────────────────────────────────────────────

pub struct OpenAiSuggester {
    client: OpenAiClient,
    key: String,
}

impl OpenAiSuggester {
    pub fn new(client: OpenAiClient, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
        }
    }
}

#[async_trait]
impl PersonalitySuggester for OpenAiSuggester {
    async fn suggest(&self, character_name: &str) -> Result<String, SuggestError> {
        let input = [json!({
            "role": "user",
            "content": personality_prompt(character_name),
        })];
        let response = self.client.response(&self.key, &input).await?;
        non_empty(extract_output_text(&extract_output_items(&response)))
    }

    fn label(&self) -> String {
        format!("openai/{}", self.client.model)
    }
}

pub struct GeminiSuggester {
    client: GeminiClient,
    key: String,
}

impl GeminiSuggester {
    pub fn new(client: GeminiClient, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
        }
    }
}

#[async_trait]
impl PersonalitySuggester for GeminiSuggester {
    async fn suggest(&self, character_name: &str) -> Result<String, SuggestError> {
        let response = self
            .client
            .generate_content(&self.key, &personality_prompt(character_name))
            .await?;
        non_empty(extract_candidate_text(&response))
    }

    fn label(&self) -> String {
        format!("gemini/{}", self.client.model)
    }
}

/// Stand-in used when no API key is available; every call fails.
pub struct UnconfiguredSuggester {
    pub provider: &'static str,
}

#[async_trait]
impl PersonalitySuggester for UnconfiguredSuggester {
    async fn suggest(&self, _character_name: &str) -> Result<String, SuggestError> {
        Err(SuggestError::MissingApiKey {
            provider: self.provider,
        })
    }

    fn label(&self) -> String {
        format!("{} (no key)", self.provider)
    }
}
