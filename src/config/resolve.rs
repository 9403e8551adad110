//! Environment variable substitution and credential resolution.

use std::str::FromStr;

use super::types::{Config, ProviderEntry};
use crate::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_SITE_ORIGIN, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
    OLLAMA_DEFAULT_BASE_URL,
};
use crate::prompt::ResponseFormat;
use crate::provider::{split_shorthand, Credentials, Locality, ProviderKind, ProviderRegistry};

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.resolve_substitutions_with(&process_env);
    }

    pub(super) fn resolve_substitutions_with(&mut self, env: &dyn Fn(&str) -> Option<String>) {
        for field in [
            &mut self.model,
            &mut self.system_prompt,
            &mut self.default_provider,
            &mut self.site_origin,
        ] {
            if let Some(value) = field {
                *value = resolve_str_with(value, env);
            }
        }
        for kind in ProviderKind::ALL {
            Self::resolve_provider_entry(self.provider.slot_mut(kind), env);
        }
    }

    /// Resolves `{env:VAR}` patterns in a single provider entry's `api_key` and `base_url`.
    fn resolve_provider_entry(
        entry: &mut Option<ProviderEntry>,
        env: &dyn Fn(&str) -> Option<String>,
    ) {
        if let Some(ref mut e) = entry {
            if let Some(ref mut key) = e.api_key {
                *key = resolve_str_with(key, env);
            }
            if let Some(ref mut url) = e.base_url {
                *url = resolve_str_with(url, env);
            }
        }
    }

    /// Resolve API key for a provider: env var first, then config value.
    pub(super) fn resolve_api_key_with(
        &self,
        provider: ProviderKind,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Option<String> {
        if provider.is_local() {
            return None;
        }
        if let Some(val) = env(&provider.env_key()) {
            if !val.trim().is_empty() {
                return Some(val);
            }
        }
        self.provider
            .entry(provider)
            .and_then(|e| e.api_key.clone())
            .filter(|key| !key.trim().is_empty())
    }

    /// Every credential the environment and config can supply.
    pub fn credentials(&self) -> Credentials {
        self.credentials_with(&process_env)
    }

    pub(super) fn credentials_with(&self, env: &dyn Fn(&str) -> Option<String>) -> Credentials {
        ProviderKind::ALL
            .into_iter()
            .filter_map(|kind| self.resolve_api_key_with(kind, env).map(|key| (kind, key)))
            .collect()
    }

    pub fn ollama_base_url(&self) -> &str {
        self.provider
            .ollama
            .as_ref()
            .and_then(|o| o.base_url.as_deref())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(OLLAMA_DEFAULT_BASE_URL)
    }

    /// `local_inference` wins; otherwise inferred from the Ollama host.
    pub fn locality(&self) -> Locality {
        match self.local_inference {
            Some(flag) => Locality::from_flag(flag),
            None => Locality::detect(self.ollama_base_url()),
        }
    }

    /// Build the provider registry this config describes.
    pub fn registry(&self) -> ProviderRegistry {
        let custom = self
            .provider
            .openrouter
            .as_ref()
            .map(|e| e.custom_models.clone())
            .unwrap_or_default();
        ProviderRegistry::new(self.locality())
            .with_ollama_base_url(self.ollama_base_url())
            .with_site_origin(self.site_origin.as_deref().unwrap_or(DEFAULT_SITE_ORIGIN))
            .with_custom_openrouter_models(custom)
    }

    /// Get the configured default provider name, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// The configured model and the provider it belongs to, when known.
    ///
    /// An explicit `default_provider` owns the model; only its own name is
    /// stripped as a prefix (never for OpenRouter, whose ids carry vendor
    /// prefixes). Without one, a known provider prefix selects the provider,
    /// so `openai/gpt-4o` splits while `meta-llama/llama-3` does not.
    pub fn model_name(&self) -> Option<(Option<ProviderKind>, String)> {
        let m = self.model.as_deref()?.trim();
        if m.is_empty() {
            return None;
        }
        let explicit = self
            .provider_name()
            .and_then(|name| ProviderKind::from_str(name).ok());
        if let Some(kind) = explicit {
            let model = match split_shorthand(m, Some(kind)) {
                Some((prefix, rest)) if prefix == kind => rest,
                _ => m,
            };
            return Some((Some(kind), model.to_string()));
        }
        match split_shorthand(m, None) {
            Some((kind, model)) => Some((Some(kind), model.to_string())),
            None => Some((None, m.to_string())),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn response_format(&self) -> ResponseFormat {
        self.response_format.unwrap_or_default()
    }

    /// Configured system prompt, the built-in default when unset, `None`
    /// when set blank.
    pub fn system_prompt(&self) -> Option<&str> {
        let prompt = self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        (!prompt.trim().is_empty()).then_some(prompt)
    }
}

/// Replace {env:VAR} with the variable's value, or nothing when unset.
pub(super) fn resolve_str_with(s: &str, env: &dyn Fn(&str) -> Option<String>) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("{env:") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 5..start + end];
        let value = env(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        from = start + value.len();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn substitutes_env_placeholders() {
        let env = env_of(&[("HOST", "example.org")]);
        assert_eq!(
            resolve_str_with("https://{env:HOST}/v1", &env),
            "https://example.org/v1"
        );
        assert_eq!(resolve_str_with("{env:MISSING}", &env), "");
        assert_eq!(resolve_str_with("{env:UNCLOSED", &env), "{env:UNCLOSED");
    }

    #[test]
    fn substituted_value_is_not_rescanned() {
        let env = env_of(&[("A", "{env:A}")]);
        assert_eq!(resolve_str_with("{env:A}", &env), "{env:A}");
    }

    #[test]
    fn env_var_beats_config_key() {
        let config: Config = toml::from_str(
            r#"
            [provider.openai]
            api_key = "from-config"
            [provider.grok]
            api_key = "grok-config"
            "#,
        )
        .unwrap();
        let env = env_of(&[("OPENAI_API_KEY", "from-env"), ("GROK_API_KEY", "  ")]);

        assert_eq!(
            config.resolve_api_key_with(ProviderKind::OpenAI, &env).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            config.resolve_api_key_with(ProviderKind::Grok, &env).as_deref(),
            Some("grok-config")
        );
        assert_eq!(config.resolve_api_key_with(ProviderKind::Qwen, &env), None);
    }

    #[test]
    fn unresolved_placeholder_yields_no_credential() {
        let mut config: Config =
            toml::from_str("[provider.deepseek]\napi_key = \"{env:DEEPSEEK_API_KEY}\"\n").unwrap();
        let env = env_of(&[]);
        config.resolve_substitutions_with(&env);

        let credentials = config.credentials_with(&env);
        assert!(!credentials.has(ProviderKind::DeepSeek));
    }

    #[test]
    fn credentials_cover_every_configured_provider() {
        let config = Config::default();
        let env = env_of(&[("PERPLEXITY_API_KEY", "pplx"), ("QWEN_API_KEY", "qw")]);
        let credentials = config.credentials_with(&env);

        assert_eq!(credentials.get(ProviderKind::Perplexity), Some("pplx"));
        assert_eq!(credentials.get(ProviderKind::Qwen), Some("qw"));
        assert!(!credentials.has(ProviderKind::OpenAI));
        assert!(!credentials.has(ProviderKind::Ollama));
    }

    #[test]
    fn locality_follows_host_unless_overridden() {
        let mut config: Config =
            toml::from_str("[provider.ollama]\nbase_url = \"http://gpu-box:11434\"\n").unwrap();
        assert_eq!(config.locality(), Locality::Remote);

        config.local_inference = Some(true);
        assert_eq!(config.locality(), Locality::Local);

        assert_eq!(Config::default().locality(), Locality::Local);
    }

    #[test]
    fn registry_carries_custom_openrouter_models() {
        let config: Config = toml::from_str(
            "[provider.openrouter]\ncustom_models = [\"acme/house-model\"]\n",
        )
        .unwrap();
        let registry = config.registry();
        assert!(registry
            .openrouter_models()
            .contains(&"acme/house-model".to_string()));
    }

    #[test]
    fn model_prefix_only_splits_on_known_providers() {
        let mut config = Config {
            model: Some("deepseek/deepseek-chat".into()),
            ..Config::default()
        };
        assert_eq!(
            config.model_name(),
            Some((Some(ProviderKind::DeepSeek), "deepseek-chat".to_string()))
        );

        config.model = Some("meta-llama/llama-3-8b".into());
        assert_eq!(
            config.model_name(),
            Some((None, "meta-llama/llama-3-8b".to_string()))
        );

        config.model = Some("  ".into());
        assert_eq!(config.model_name(), None);
    }

    #[test]
    fn explicit_default_provider_owns_configured_model() {
        let mut config = Config {
            default_provider: Some("openrouter".into()),
            model: Some("openai/gpt-oss-20b".into()),
            ..Config::default()
        };
        assert_eq!(
            config.model_name(),
            Some((
                Some(ProviderKind::OpenRouter),
                "openai/gpt-oss-20b".to_string()
            ))
        );

        config.default_provider = Some("grok".into());
        config.model = Some("grok/grok-3".into());
        assert_eq!(
            config.model_name(),
            Some((Some(ProviderKind::Grok), "grok-3".to_string()))
        );
    }

    #[test]
    fn blank_system_prompt_is_absent() {
        let mut config = Config::default();
        assert_eq!(config.system_prompt(), Some(DEFAULT_SYSTEM_PROMPT));
        config.system_prompt = Some("   ".into());
        assert_eq!(config.system_prompt(), None);
    }
}
