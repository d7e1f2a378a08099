//! Google Gemini client — one-shot `generateContent` calls.

use reqwest::Client as HttpClient;
use serde_json::{Value, json};
use tracing::debug;

use crate::suggest::{SuggestError, build_http_client};
use crate::util::join_url;

#[derive(Clone)]
pub struct GeminiClient {
    pub model: String,
    pub base_url: String,
    http_client: HttpClient,
}

impl GeminiClient {
    pub fn with_endpoint(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        GeminiClient {
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: build_http_client(),
        }
    }

    /// Send a single-turn prompt and return the raw JSON response.
    pub async fn generate_content(&self, key: &str, prompt: &str) -> Result<Value, SuggestError> {
        let url = join_url(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        );
        debug!(%url, "Gemini request");

        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
        });
        let response = self
            .http_client
            .post(url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SuggestError::Service {
                provider: "Gemini",
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|err| SuggestError::Malformed(err.to_string()))
    }
}

/// Concatenate the text parts of the first candidate, skipping thought parts.
pub fn extract_candidate_text(response: &Value) -> String {
    let Some(parts) = response
        .pointer("/candidates/0/content/parts")
        .and_then(|v| v.as_array())
    else {
        return String::new();
    };
    parts
        .iter()
        .filter(|part| part.get("thought").and_then(|v| v.as_bool()) != Some(true))
        .filter_map(|part| part.get("text").and_then(|v| v.as_str()))
        .collect()
}
