//! Provider-agnostic prompt and result shapes.
//!
//! [`ModelConfig`] and [`PromptState`] describe what the user wants to send;
//! [`NormalizedResponse`] is what every successful call comes back as,
//! regardless of which provider answered.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::provider::{ProviderKind, ProviderRegistry};

/// Desired shape of the model's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Markdown,
    Json,
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => f.write_str("markdown"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("Unknown response format: {other}. Supported: markdown, json")),
        }
    }
}

/// Generation settings for one call.
///
/// `temperature` is nominally in `[0, 2]` but is passed through unchecked;
/// providers reject out-of-range values themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ModelConfig {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            ..Self::default()
        }
    }

    /// Switches provider and resets the model to the new provider's first
    /// known model (empty when the provider's models are discovered
    /// dynamically).
    pub fn set_provider(&mut self, provider: ProviderKind, registry: &ProviderRegistry) {
        self.provider = provider;
        self.model = registry.first_model(provider).unwrap_or_default().to_string();
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }
}

/// Playground state: one system/user prompt pair plus settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PromptState {
    pub system_prompt: String,
    pub user_prompt: String,
    pub response_format: ResponseFormat,
    pub model_config: ModelConfig,
}

/// Token accounting. All three counts are always present; providers that
/// report nothing yield zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Builds usage from granular counts; the total is their sum.
    pub fn from_counts(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// The provider-agnostic result of a successful call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub content: String,
    pub format: ResponseFormat,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub provider: ProviderKind,
    pub model: String,
    pub token_usage: TokenUsage,
    /// Seconds.
    pub response_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Locality;

    #[test]
    fn default_model_config_matches_fresh_session() {
        let config = ModelConfig::default();
        assert_eq!(config.provider, ProviderKind::OpenAI);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 2048);
    }

    #[test]
    fn switching_provider_resets_model() {
        let registry = ProviderRegistry::new(Locality::Local);
        let mut config = ModelConfig::default();
        config.temperature = 1.3;

        config.set_provider(ProviderKind::DeepSeek, &registry);
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.temperature, 1.3);

        config.set_provider(ProviderKind::Ollama, &registry);
        assert_eq!(config.model, "");

        config.set_model("llama3");
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.model, "llama3");
    }

    #[test]
    fn response_format_parses() {
        assert_eq!("JSON".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert_eq!("md".parse::<ResponseFormat>().unwrap(), ResponseFormat::Markdown);
        assert!("yaml".parse::<ResponseFormat>().is_err());
    }

    #[test]
    fn usage_total_is_sum_of_counts() {
        let usage = TokenUsage::from_counts(12, 30);
        assert_eq!(usage.total_tokens, 42);
        assert_eq!(TokenUsage::default().total_tokens, 0);
    }
}
