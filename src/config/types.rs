//! Struct definitions and serde defaults for promptbench configuration.

use serde::{Deserialize, Serialize};

use crate::prompt::ResponseFormat;
use crate::provider::ProviderKind;

/// Root configuration for promptbench, deserialized from `config.toml`.
///
/// Every field is optional; defaults are applied when values are read, so a
/// project file only overrides what it actually sets.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Default provider name (e.g. "openai", "ollama").
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Default model identifier, optionally as `provider/model`.
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature for new prompts.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Output token cap for new prompts.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Default response format for `ask`.
    #[serde(default)]
    pub response_format: Option<ResponseFormat>,
    /// System prompt for playground sends and chats outside a workspace.
    /// Unset means the built-in default.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Overrides the same-host check that gates Ollama.
    #[serde(default)]
    pub local_inference: Option<bool>,
    /// Origin advertised to OpenRouter as `HTTP-Referer`.
    #[serde(default)]
    pub site_origin: Option<String>,
    /// Per-provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Provider-specific configuration map.
///
/// Each field corresponds to a supported provider. Only providers the user
/// has configured will be `Some`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    pub openai: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
    pub perplexity: Option<ProviderEntry>,
    pub deepseek: Option<ProviderEntry>,
    pub grok: Option<ProviderEntry>,
    pub qwen: Option<ProviderEntry>,
    /// Local Ollama server; only `base_url` is meaningful.
    pub ollama: Option<ProviderEntry>,
}

impl ProviderConfig {
    pub fn entry(&self, provider: ProviderKind) -> Option<&ProviderEntry> {
        self.slot(provider).as_ref()
    }

    fn slot(&self, provider: ProviderKind) -> &Option<ProviderEntry> {
        match provider {
            ProviderKind::OpenAI => &self.openai,
            ProviderKind::OpenRouter => &self.openrouter,
            ProviderKind::Perplexity => &self.perplexity,
            ProviderKind::DeepSeek => &self.deepseek,
            ProviderKind::Grok => &self.grok,
            ProviderKind::Qwen => &self.qwen,
            ProviderKind::Ollama => &self.ollama,
        }
    }

    pub(super) fn slot_mut(&mut self, provider: ProviderKind) -> &mut Option<ProviderEntry> {
        match provider {
            ProviderKind::OpenAI => &mut self.openai,
            ProviderKind::OpenRouter => &mut self.openrouter,
            ProviderKind::Perplexity => &mut self.perplexity,
            ProviderKind::DeepSeek => &mut self.deepseek,
            ProviderKind::Grok => &mut self.grok,
            ProviderKind::Qwen => &mut self.qwen,
            ProviderKind::Ollama => &mut self.ollama,
        }
    }
}

/// Connection details for a single provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProviderEntry {
    /// API key for authentication. Can also be set via `<PROVIDER>_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Custom base URL (only honoured for Ollama).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Extra model ids offered alongside the built-in list (OpenRouter).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_models: Vec<String>,
}

