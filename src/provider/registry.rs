//! Static provider catalog.
//!
//! [`ProviderRegistry`] answers three questions about a [`ProviderKind`]:
//! where to send a request (and how to build its headers), which models are
//! known up front, and whether a credential or a local context is needed.
//! All lookups are pure.

use crate::constants::{DEFAULT_SITE_ORIGIN, OLLAMA_DEFAULT_BASE_URL, OPENROUTER_SITE_TITLE};
use crate::models;

use super::kind::ProviderKind;

/// Whether calls to a provider must carry an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialPolicy {
    Required,
    None,
}

/// Whether this client runs where the local inference server is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    Local,
    Remote,
}

impl Locality {
    /// Same-host check: the inference server is local when its base URL
    /// points at a loopback host.
    pub fn detect(base_url: &str) -> Self {
        let host = reqwest::Url::parse(base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned));
        match host.as_deref() {
            Some("localhost" | "127.0.0.1" | "[::1]" | "::1") => Self::Local,
            _ => Self::Remote,
        }
    }

    pub fn from_flag(local: bool) -> Self {
        if local { Self::Local } else { Self::Remote }
    }

    pub fn is_local(self) -> bool {
        self == Self::Local
    }
}

/// How request headers are built for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderRule {
    /// `Content-Type` only; no credential is sent.
    ContentTypeOnly,
    /// `Content-Type` plus `Authorization: Bearer <key>`.
    Bearer,
    /// Bearer auth plus OpenRouter's site identification pair.
    BearerWithSiteIdentity { referer: String },
}

impl HeaderRule {
    /// Builds the header list. `Authorization` is only emitted when the rule
    /// calls for it and a credential was supplied.
    pub fn build(&self, credential: Option<&str>) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        let bearer = |headers: &mut Vec<(String, String)>| {
            if let Some(key) = credential {
                headers.push(("Authorization".to_string(), format!("Bearer {key}")));
            }
        };
        match self {
            Self::ContentTypeOnly => {}
            Self::Bearer => bearer(&mut headers),
            Self::BearerWithSiteIdentity { referer } => {
                bearer(&mut headers);
                headers.push(("HTTP-Referer".to_string(), referer.clone()));
                headers.push(("X-Title".to_string(), OPENROUTER_SITE_TITLE.to_string()));
            }
        }
        headers
    }
}

/// Where and how to reach a provider's chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub header_rule: HeaderRule,
}

/// Catalog of supported providers.
///
/// Holds the few runtime facts the catalog depends on: the Ollama base URL,
/// the site origin advertised to OpenRouter, whether the local server is
/// reachable, and any user-added OpenRouter model ids.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    ollama_base_url: String,
    site_origin: String,
    locality: Locality,
    custom_openrouter_models: Vec<String>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(Locality::detect(OLLAMA_DEFAULT_BASE_URL))
    }
}

impl ProviderRegistry {
    pub fn new(locality: Locality) -> Self {
        Self {
            ollama_base_url: OLLAMA_DEFAULT_BASE_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            locality,
            custom_openrouter_models: Vec::new(),
        }
    }

    pub fn with_ollama_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.ollama_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_site_origin(mut self, origin: impl Into<String>) -> Self {
        self.site_origin = origin.into();
        self
    }

    pub fn with_custom_openrouter_models(mut self, models: Vec<String>) -> Self {
        self.custom_openrouter_models = models;
        self
    }

    pub fn locality(&self) -> Locality {
        self.locality
    }

    pub fn ollama_base_url(&self) -> &str {
        &self.ollama_base_url
    }

    /// Chat endpoint and header rule for `provider`.
    pub fn endpoint(&self, provider: ProviderKind) -> Endpoint {
        let (url, header_rule) = match provider {
            ProviderKind::OpenAI => (
                "https://api.openai.com/v1/chat/completions".to_string(),
                HeaderRule::Bearer,
            ),
            ProviderKind::OpenRouter => (
                "https://openrouter.ai/api/v1/chat/completions".to_string(),
                HeaderRule::BearerWithSiteIdentity {
                    referer: self.site_origin.clone(),
                },
            ),
            ProviderKind::Perplexity => (
                "https://api.perplexity.ai/chat/completions".to_string(),
                HeaderRule::Bearer,
            ),
            ProviderKind::DeepSeek => (
                "https://api.deepseek.com/v1/chat/completions".to_string(),
                HeaderRule::Bearer,
            ),
            ProviderKind::Grok => (
                "https://api.x.ai/v1/chat/completions".to_string(),
                HeaderRule::Bearer,
            ),
            ProviderKind::Qwen => (
                "https://dashscope-intl.aliyuncs.com/compatible-mode/v1/chat/completions"
                    .to_string(),
                HeaderRule::Bearer,
            ),
            ProviderKind::Ollama => (
                format!("{}/api/chat", self.ollama_base_url),
                HeaderRule::ContentTypeOnly,
            ),
        };
        Endpoint { url, header_rule }
    }

    /// URL of Ollama's model listing endpoint.
    pub fn ollama_tags_url(&self) -> String {
        format!("{}/api/tags", self.ollama_base_url)
    }

    pub fn credential_policy(&self, provider: ProviderKind) -> CredentialPolicy {
        if provider.is_local() {
            CredentialPolicy::None
        } else {
            CredentialPolicy::Required
        }
    }

    pub fn requires_credential(&self, provider: ProviderKind) -> bool {
        self.credential_policy(provider) == CredentialPolicy::Required
    }

    /// Whether the provider can be attempted from this context. Only the
    /// local-inference provider is ever unavailable.
    pub fn is_available(&self, provider: ProviderKind) -> bool {
        !provider.is_local() || self.locality.is_local()
    }

    /// Statically known models. Empty means "discover dynamically".
    pub fn available_models(&self, provider: ProviderKind) -> &'static [&'static str] {
        match provider {
            ProviderKind::OpenAI => models::OPENAI_MODELS,
            ProviderKind::OpenRouter => models::OPENROUTER_MODELS,
            ProviderKind::Perplexity => models::PERPLEXITY_MODELS,
            ProviderKind::DeepSeek => models::DEEPSEEK_MODELS,
            ProviderKind::Grok => models::GROK_MODELS,
            ProviderKind::Qwen => models::QWEN_MODELS,
            ProviderKind::Ollama => &[],
        }
    }

    /// First statically known model, used when the user switches provider.
    pub fn first_model(&self, provider: ProviderKind) -> Option<&'static str> {
        self.available_models(provider).first().copied()
    }

    /// Built-in OpenRouter models followed by the user's custom ids.
    pub fn openrouter_models(&self) -> Vec<String> {
        combined_openrouter_models(&self.custom_openrouter_models)
    }
}

/// Built-in OpenRouter models merged with `custom` ids, deduplicated by the
/// full model id with first-occurrence order preserved.
pub fn combined_openrouter_models(custom: &[String]) -> Vec<String> {
    let mut combined: Vec<String> = Vec::new();
    let builtin = models::OPENROUTER_MODELS.iter().map(|m| m.to_string());
    for id in builtin.chain(custom.iter().cloned()) {
        if !combined.contains(&id) {
            combined.push(id);
        }
    }
    combined
}
