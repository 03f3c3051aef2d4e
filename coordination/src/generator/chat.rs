//! OpenAI-compatible `/v1/chat/completions` backend (local routers, proxies).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GeneratorError, TextGenerator};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat-completions client; the whole prompt is sent as one user message.
pub struct ChatCompletionsGenerator {
    url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    client: reqwest::Client,
}

impl ChatCompletionsGenerator {
    pub fn new(
        url: String,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeneratorError::Client(e.to_string()))?;
        Ok(Self {
            url,
            model,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            temperature: 0.7,
            client,
        })
    }
}

fn extract_content(body: &str) -> Result<String, GeneratorError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GeneratorError::ParseError(e.to_string()))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(GeneratorError::EmptyResponse);
    }
    Ok(content)
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
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

        extract_content(&body)
    }
}
