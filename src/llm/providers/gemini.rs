//! Google Gemini provider (`models/{model}:generateContent`).
//!
//! Prior turns go out as `contents` with roles `user` / `model`; the prompt
//! is the final `user` entry.  The key is sent in the `x-goog-api-key`
//! header, never in the URL.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::llm::{ChatMessage, ChatRole, ProviderError};

use super::classify_http_error;

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn new(
        api_base_url: String,
        model: String,
        temperature: f32,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, temperature, api_key })
    }

    pub(crate) fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub async fn chat(&self, history: &[ChatMessage], prompt: &str) -> Result<String, ProviderError> {
        let payload = build_request(history, prompt, self.temperature);
        let url = self.endpoint();

        debug!(model = %self.model, history = history.len(), prompt_len = prompt.len(), "sending generateContent request");

        let mut req = self.client.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.header("x-goog-api-key", key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %url, error = %e, "Gemini HTTP request failed (transport)");
            ProviderError::Request(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(env) => format!("HTTP {status} [{}]: {}", env.error.status, env.error.message),
                Err(_) => format!("HTTP {status}: {body}"),
            };
            error!(%status, %message, "Gemini request returned HTTP error");
            return Err(classify_http_error(status, message));
        }

        let parsed = response.json::<GenerateContentResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize Gemini response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        extract_text(parsed)
    }
}

fn build_request(history: &[ChatMessage], prompt: &str, temperature: f32) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|m| Content {
            role: match m.role {
                ChatRole::User => "user".to_string(),
                ChatRole::Assistant => "model".to_string(),
            },
            parts: vec![Part { text: m.content.clone() }],
        })
        .collect();
    contents.push(Content {
        role: "user".to_string(),
        parts: vec![Part { text: prompt.to_string() }],
    });
    GenerateContentRequest {
        contents,
        generation_config: GenerationConfig { temperature },
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderError::Request("empty or missing content in response".into()));
    }
    Ok(text.to_string())
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_maps_roles_and_appends_prompt() {
        let history = [ChatMessage::assistant("welcome"), ChatMessage::user("hi")];
        let json = serde_json::to_value(build_request(&history, "next", 0.5)).unwrap();
        let contents = json["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "model");
        assert_eq!(contents[1]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "next");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "Hello there");
    }

    #[test]
    fn extract_text_rejects_empty_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(extract_text(parsed).is_err());
    }

    #[test]
    fn endpoint_includes_model() {
        let p = GeminiProvider::new(
            "https://generativelanguage.googleapis.com/v1beta/".into(),
            "gemini-2.5-flash".into(),
            0.7,
            5,
            None,
        )
        .unwrap();
        assert_eq!(
            p.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(!p.has_api_key());
    }
}
