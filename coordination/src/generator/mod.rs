//! Text generation boundary.
//!
//! Everything that talks to a language model goes through [`TextGenerator`]:
//! one prompt in, one completion out. Participants and the adjudicator hold
//! an `Arc<dyn TextGenerator>` so tests can swap in [`ScriptedGenerator`].

pub mod chat;
pub mod gemini;
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{GeneratorConfig, Provider};

pub use chat::ChatCompletionsGenerator;
pub use gemini::GeminiGenerator;
pub use mock::ScriptedGenerator;

/// Errors from a text generation backend.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("authentication rejected ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("quota exhausted or rate limited: {0}")]
    QuotaExhausted(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("response parse error: {0}")]
    ParseError(String),

    #[error("backend returned an empty response")]
    EmptyResponse,

    #[error("API key not configured for {0}")]
    MissingApiKey(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl GeneratorError {
    /// Map a non-success HTTP status to the matching error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status, body },
            429 => Self::QuotaExhausted(body),
            _ => Self::Api { status, body },
        }
    }
}

/// An opaque prompt → text capability.
///
/// Implementations fail fast: no retries, no fallback text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete a single prompt.
    async fn complete(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// Build the HTTP-backed generator selected by `config`.
pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn TextGenerator>, GeneratorError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    match config.provider {
        Provider::Gemini => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| GeneratorError::MissingApiKey("gemini".to_string()))?;
            Ok(Arc::new(GeminiGenerator::new(
                api_key,
                config.model(),
                timeout,
            )?))
        }
        Provider::ChatCompletions => Ok(Arc::new(ChatCompletionsGenerator::new(
            config.router_url.clone(),
            config.model(),
            config.api_key.clone(),
            timeout,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            GeneratorError::from_status(401, String::new()),
            GeneratorError::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            GeneratorError::from_status(403, String::new()),
            GeneratorError::Unauthorized { .. }
        ));
        assert!(matches!(
            GeneratorError::from_status(429, "slow down".into()),
            GeneratorError::QuotaExhausted(_)
        ));
        assert!(matches!(
            GeneratorError::from_status(500, String::new()),
            GeneratorError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let config = GeneratorConfig {
            provider: Provider::Gemini,
            api_key: None,
            ..Default::default()
        };
        let err = build_generator(&config).err().unwrap();
        assert!(matches!(err, GeneratorError::MissingApiKey(_)));

        let blank = GeneratorConfig {
            provider: Provider::Gemini,
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(build_generator(&blank).is_err());
    }

    #[test]
    fn test_chat_completions_needs_no_key() {
        let config = GeneratorConfig {
            provider: Provider::ChatCompletions,
            api_key: None,
            ..Default::default()
        };
        assert!(build_generator(&config).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = GeneratorError::MissingApiKey("gemini".into());
        assert_eq!(err.to_string(), "API key not configured for gemini");
        assert_eq!(
            GeneratorError::EmptyResponse.to_string(),
            "backend returned an empty response"
        );
    }
}
