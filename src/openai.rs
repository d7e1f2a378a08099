//! OpenAI API client — one-shot Responses calls and response helpers.

use reqwest::Client as HttpClient;
use serde_json::{Value, json};
use tracing::debug;

use crate::suggest::{SuggestError, build_http_client};
use crate::util::join_url;

/// Thin wrapper around the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiClient {
    pub model: String,
    pub base_url: String,
    http_client: HttpClient,
}

impl OpenAiClient {
    pub fn with_endpoint(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        OpenAiClient {
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: build_http_client(),
        }
    }

    /// Run a single Responses API call with the given input items.
    pub async fn response(&self, key: &str, input: &[Value]) -> Result<Value, SuggestError> {
        let body = json!({
            "model": self.model,
            "input": input,
        });
        self.request(key, "responses", body).await
    }

    async fn request(&self, key: &str, path: &str, body: Value) -> Result<Value, SuggestError> {
        let url = join_url(&self.base_url, path);
        debug!(%url, model = %self.model, "OpenAI request");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SuggestError::Service {
                provider: "OpenAI",
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|err| SuggestError::Malformed(err.to_string()))
    }
}

/// Pull the top-level `output` array from an OpenAI response.
pub fn extract_output_items(response: &Value) -> Vec<Value> {
    response
        .get("output")
        .and_then(|value| value.as_array())
        .cloned()
        .unwrap_or_default()
}

/// Concatenate all `output_text` blocks from the output items into a single string.
pub fn extract_output_text(output_items: &[Value]) -> String {
    let mut parts = Vec::new();
    for item in output_items {
        let item_type = item.get("type").and_then(|v| v.as_str());
        if item_type != Some("message") {
            continue;
        }
        let content = match item.get("content").and_then(|v| v.as_array()) {
            Some(content) => content,
            None => continue,
        };
        for block in content {
            if block.get("type").and_then(|v| v.as_str()) == Some("output_text") {
                if let Some(text) = block.get("text").and_then(|v| v.as_str()) {
                    parts.push(text.to_string());
                }
            }
        }
    }
    parts.join("\n")
}
