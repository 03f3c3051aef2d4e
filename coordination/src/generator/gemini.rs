//! Google Gemini `generateContent` backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{GeneratorError, TextGenerator};

/// Gemini REST client bound to one model.
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeneratorError::Client(e.to_string()))?;
        Ok(Self {
            api_key,
            model,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the first candidate's text out of a raw response body.
fn extract_text(body: &str) -> Result<String, GeneratorError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GeneratorError::ParseError(e.to_string()))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GeneratorError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        let start = Instant::now();

        let request_body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GeneratorError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeneratorError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(GeneratorError::from_status(status.as_u16(), body));
        }

        let text = extract_text(&body)?;
        debug!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "gemini completion"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world." }] }
            }]
        }"#;
        assert_eq!(extract_text(body).unwrap(), "Hello world.");
    }

    #[test]
    fn test_extract_text_no_candidates_is_empty() {
        assert!(matches!(
            extract_text(r#"{"candidates": []}"#),
            Err(GeneratorError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#),
            Err(GeneratorError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_text_malformed() {
        assert!(matches!(
            extract_text("not json"),
            Err(GeneratorError::ParseError(_))
        ));
    }

    #[test]
    fn test_endpoint_uses_model_and_base_url() {
        let gen = GeminiGenerator::new(
            "key".into(),
            "gemini-1.5-flash".into(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url("http://localhost:9999/v1beta/");
        assert_eq!(
            gen.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(gen.model(), "gemini-1.5-flash");
    }
}
