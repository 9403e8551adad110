//! Typed failures of a provider call.

use thiserror::Error;

use crate::provider::ProviderKind;

/// Why a dispatch failed. The `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// A required API key is missing.
    #[error("API key for {provider} is not set")]
    Configuration { provider: ProviderKind },

    /// The local-inference provider was selected from a non-local context.
    #[error(
        "{provider} is only available when running locally. Please use a cloud-based provider."
    )]
    Unavailable { provider: ProviderKind },

    /// The provider answered with a non-2xx status, or with a success body
    /// that could not be read.
    #[error("{provider} error{}: {message}", status_suffix(.status))]
    Provider {
        provider: ProviderKind,
        status: Option<u16>,
        message: String,
    },

    /// The request never completed.
    #[error("network error calling {provider}: {message}. Check your connection.")]
    Network {
        provider: ProviderKind,
        message: String,
    },

    #[error("unexpected error calling {provider}: {message}")]
    Unknown {
        provider: ProviderKind,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

impl DispatchError {
    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::Configuration { provider }
            | Self::Unavailable { provider }
            | Self::Provider { provider, .. }
            | Self::Network { provider, .. }
            | Self::Unknown { provider, .. } => *provider,
        }
    }

    /// A short suggestion for errors the user can fix themselves.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Configuration { provider } => Some(format!(
                "set {} or add api_key under [provider.{provider}] in config.toml",
                provider.env_key()
            )),
            Self::Unavailable { .. } => {
                Some("switch to a cloud provider, or run promptbench next to Ollama".to_string())
            }
            _ => None,
        }
    }
}
