//! Run configuration.
//!
//! Layering, lowest to highest priority: built-in defaults, an optional
//! TOML file, environment variables, then whatever the caller sets
//! explicitly (CLI flags). Nothing here reads process state implicitly;
//! `from_env` is the only entry point that touches the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which text generation backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Google Gemini `generateContent`.
    #[default]
    Gemini,
    /// Any OpenAI-compatible `/v1/chat/completions` endpoint.
    ChatCompletions,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::ChatCompletions => "default",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::ChatCompletions => write!(f, "chat_completions"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "chat" | "chat_completions" | "chat-completions" | "openai" | "router" => {
                Ok(Self::ChatCompletions)
            }
            other => Err(ConfigError::Invalid(format!("unknown provider '{}'", other))),
        }
    }
}

/// Text generation backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub provider: Provider,
    /// Model identifier; `None` means the provider's default.
    pub model: Option<String>,
    /// API key. Required for Gemini, optional for chat-completions routers.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Full chat-completions URL (only used by `ChatCompletions`).
    pub router_url: String,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_key: None,
            router_url: "http://localhost:8000/v1/chat/completions".to_string(),
            timeout_secs: 120,
        }
    }
}

impl GeneratorConfig {
    /// The configured model, or the provider default.
    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }
}

/// Parameters for one debate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Last round number; the exchange ends once the round exceeds it.
    pub max_rounds: u32,
    /// A new utterance more similar than this to an earlier one by the same
    /// speaker is replaced by the skip sentinel.
    pub similarity_threshold: f64,
    /// Word cap per utterance.
    pub max_words: usize,
    /// Display wrap width.
    pub wrap_width: usize,
    /// Append-only audit log.
    pub log_path: PathBuf,
    /// Write a resumable checkpoint here after every turn.
    pub checkpoint_path: Option<PathBuf>,
    pub generator: GeneratorConfig,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: 8,
            similarity_threshold: 0.8,
            max_words: 18,
            wrap_width: 80,
            log_path: PathBuf::from("logs/debate_log.txt"),
            checkpoint_path: None,
            generator: GeneratorConfig::default(),
        }
    }
}

impl DebateConfig {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Overlay values from `lookup` (normally the process environment).
    ///
    /// Unparseable numeric values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("LOG_FILE") {
            self.log_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("DEBATE_CHECKPOINT") {
            self.checkpoint_path = Some(PathBuf::from(path));
        }
        if let Some(n) = lookup("DEBATE_MAX_ROUNDS").and_then(|v| v.parse().ok()) {
            self.max_rounds = n;
        }
        if let Some(t) = lookup("DEBATE_SIMILARITY_THRESHOLD").and_then(|v| v.parse().ok()) {
            self.similarity_threshold = t;
        }
        if let Some(provider) = lookup("DEBATE_PROVIDER").and_then(|v| v.parse().ok()) {
            self.generator.provider = provider;
        }
        if let Some(secs) = lookup("DEBATE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.generator.timeout_secs = secs;
        }
        if let Some(url) = lookup("ROUTER_URL") {
            self.generator.router_url = url;
        }

        let (model_var, key_var) = match self.generator.provider {
            Provider::Gemini => ("GEMINI_MODEL", "GEMINI_API_KEY"),
            Provider::ChatCompletions => ("ROUTER_MODEL", "ROUTER_API_KEY"),
        };
        if let Some(model) = lookup(model_var) {
            self.generator.model = Some(model);
        }
        if let Some(key) = lookup(key_var) {
            self.generator.api_key = Some(key);
        }
    }

    /// Reject values the moderator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rounds == 0 {
            return Err(ConfigError::Invalid("max_rounds must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "similarity_threshold {} outside [0, 1]",
                self.similarity_threshold
            )));
        }
        if self.max_words == 0 {
            return Err(ConfigError::Invalid("max_words must be at least 1".into()));
        }
        if self.wrap_width == 0 {
            return Err(ConfigError::Invalid("wrap_width must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DebateConfig::default();
        assert_eq!(config.max_rounds, 8);
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.max_words, 18);
        assert_eq!(config.wrap_width, 80);
        assert_eq!(config.log_path, PathBuf::from("logs/debate_log.txt"));
        assert!(config.checkpoint_path.is_none());
        assert_eq!(config.generator.provider, Provider::Gemini);
        assert_eq!(config.generator.model(), "gemini-1.5-flash");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overlay() {
        let mut config = DebateConfig::default();
        config.apply_env(lookup(&[
            ("LOG_FILE", "/tmp/debate.txt"),
            ("DEBATE_MAX_ROUNDS", "4"),
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("ROUTER_MODEL", "ignored-for-gemini"),
        ]));
        assert_eq!(config.log_path, PathBuf::from("/tmp/debate.txt"));
        assert_eq!(config.max_rounds, 4);
        assert_eq!(config.generator.api_key.as_deref(), Some("secret"));
        assert_eq!(config.generator.model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_env_switches_provider_keys() {
        let mut config = DebateConfig::default();
        config.apply_env(lookup(&[
            ("DEBATE_PROVIDER", "openai"),
            ("ROUTER_URL", "http://10.0.0.31:8000/v1/chat/completions"),
            ("ROUTER_MODEL", "qwen"),
            ("GEMINI_API_KEY", "not-used"),
        ]));
        assert_eq!(config.generator.provider, Provider::ChatCompletions);
        assert_eq!(config.generator.model(), "qwen");
        assert!(config.generator.api_key.is_none());
        assert!(config.generator.router_url.starts_with("http://10.0.0.31"));
    }

    #[test]
    fn test_env_ignores_garbage_numbers() {
        let mut config = DebateConfig::default();
        config.apply_env(lookup(&[("DEBATE_MAX_ROUNDS", "lots")]));
        assert_eq!(config.max_rounds, 8);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DebateConfig::from_toml_str(
            r#"
max_rounds = 4
log_path = "out/log.txt"

[generator]
provider = "chat_completions"
model = "local"
"#,
        )
        .unwrap();
        assert_eq!(config.max_rounds, 4);
        assert_eq!(config.max_words, 18);
        assert_eq!(config.log_path, PathBuf::from("out/log.txt"));
        assert_eq!(config.generator.provider, Provider::ChatCompletions);
        assert_eq!(config.generator.model(), "local");
        assert_eq!(config.generator.timeout_secs, 120);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            DebateConfig::from_toml_str("max_rounds = \"eight\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = DebateConfig::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_rounds = DebateConfig {
            max_rounds: 0,
            ..Default::default()
        };
        assert!(zero_rounds.validate().is_err());

        let bad_threshold = DebateConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());
    }

    #[test]
    fn test_provider_parse_and_display() {
        assert_eq!("Gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!(
            "chat".parse::<Provider>().unwrap(),
            Provider::ChatCompletions
        );
        assert!("carrier-pigeon".parse::<Provider>().is_err());
        assert_eq!(Provider::ChatCompletions.to_string(), "chat_completions");
    }
}
