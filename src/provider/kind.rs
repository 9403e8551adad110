//! Provider kind enumeration.
//!
//! Defines [`ProviderKind`], the closed set of LLM backends promptbench can
//! talk to. Every lookup table in the crate is keyed by this enum so adding
//! a provider is checked for exhaustiveness by the compiler.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// Identifies which LLM provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI (GPT models).
    OpenAI,
    /// OpenRouter (multi-provider gateway).
    OpenRouter,
    /// Perplexity (Sonar models).
    Perplexity,
    /// DeepSeek.
    DeepSeek,
    /// xAI Grok.
    Grok,
    /// Alibaba Qwen via DashScope's OpenAI-compatible mode.
    Qwen,
    /// Ollama (local inference server, native chat API).
    Ollama,
}

impl ProviderKind {
    /// Every provider, in display order.
    pub const ALL: [ProviderKind; 7] = [
        Self::OpenAI,
        Self::OpenRouter,
        Self::Perplexity,
        Self::DeepSeek,
        Self::Grok,
        Self::Qwen,
        Self::Ollama,
    ];

    /// Stable lowercase identifier, as used in config files and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Perplexity => "perplexity",
            Self::DeepSeek => "deepseek",
            Self::Grok => "grok",
            Self::Qwen => "qwen",
            Self::Ollama => "ollama",
        }
    }

    /// Human-facing name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::OpenRouter => "OpenRouter",
            Self::Perplexity => "Perplexity",
            Self::DeepSeek => "DeepSeek",
            Self::Grok => "Grok",
            Self::Qwen => "Qwen",
            Self::Ollama => "Ollama",
        }
    }

    /// Whether this is the local-inference provider.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Ollama)
    }

    /// Environment variable consulted first for this provider's API key.
    pub fn env_key(&self) -> String {
        format!("{}_API_KEY", self.as_str().to_uppercase())
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    /// Parses a provider name. Matching is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| {
                let supported: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                anyhow!(
                    "Unknown provider: {s}. Supported: {}",
                    supported.join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!(" ollama ".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert_eq!("DEEPSEEK".parse::<ProviderKind>().unwrap(), ProviderKind::DeepSeek);
    }

    #[test]
    fn unknown_provider_lists_supported() {
        let err = "anthropic".parse::<ProviderKind>().unwrap_err().to_string();
        assert!(err.contains("Unknown provider: anthropic"));
        assert!(err.contains("openrouter"));
    }

    #[test]
    fn serde_names_match_cli_names() {
        for kind in ProviderKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn env_key_is_uppercased() {
        assert_eq!(ProviderKind::OpenRouter.env_key(), "OPENROUTER_API_KEY");
        assert_eq!(ProviderKind::Grok.env_key(), "GROK_API_KEY");
    }
}
