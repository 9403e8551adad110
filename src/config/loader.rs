//! File loading and merging for promptbench configuration.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::types::{Config, ProviderEntry};
use crate::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE, OLLAMA_DEFAULT_BASE_URL,
};
use crate::provider::ProviderKind;

/// The config written on first run, with `{env:VAR}` placeholders for
/// every credentialed provider.
pub(super) fn default_config_toml() -> String {
    let mut toml = format!(
        r#"# default_provider = "openai"
# model = "gpt-4o"
temperature = {DEFAULT_TEMPERATURE}
max_tokens = {DEFAULT_MAX_TOKENS}
system_prompt = "{DEFAULT_SYSTEM_PROMPT}"

[provider]
"#
    );
    for kind in ProviderKind::ALL {
        if kind.is_local() {
            let _ = write!(
                toml,
                "\n[provider.{kind}]\nbase_url = \"{OLLAMA_DEFAULT_BASE_URL}\"\n"
            );
        } else {
            let _ = write!(
                toml,
                "\n[provider.{kind}]\napi_key = \"{{env:{}}}\"\n",
                kind.env_key()
            );
        }
    }
    toml
}

impl Config {
    /// Loads the global config from `~/.config/promptbench/config.toml`.
    ///
    /// If no config file exists, creates one with defaults and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let default_toml = default_config_toml();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &default_toml)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            let config: Config = toml::from_str(&default_toml)
                .with_context(|| "Failed to parse default config".to_string())?;
            return Ok(config);
        }
        Self::load_file(&path)
    }

    pub(super) fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// Look for promptbench.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                return Self::load_file(&candidate).map(Some);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Merge project config over global config.
    /// Project values win when present, provider entries field by field.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        let mut provider = global.provider;
        for kind in ProviderKind::ALL {
            let theirs = project.provider.entry(kind).cloned();
            let slot = provider.slot_mut(kind);
            *slot = match (slot.take(), theirs) {
                (Some(ours), Some(theirs)) => Some(merge_entry(ours, theirs)),
                (ours, theirs) => theirs.or(ours),
            };
        }

        Config {
            default_provider: project.default_provider.or(global.default_provider),
            model: project.model.or(global.model),
            temperature: project.temperature.or(global.temperature),
            max_tokens: project.max_tokens.or(global.max_tokens),
            response_format: project.response_format.or(global.response_format),
            system_prompt: project.system_prompt.or(global.system_prompt),
            local_inference: project.local_inference.or(global.local_inference),
            site_origin: project.site_origin.or(global.site_origin),
            provider,
        }
    }
}

fn merge_entry(global: ProviderEntry, project: ProviderEntry) -> ProviderEntry {
    ProviderEntry {
        api_key: project.api_key.or(global.api_key),
        base_url: project.base_url.or(global.base_url),
        custom_models: if project.custom_models.is_empty() {
            global.custom_models
        } else {
            project.custom_models
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_with_placeholders() {
        let config: Config = toml::from_str(&default_config_toml()).unwrap();
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.max_tokens, Some(2048));
        assert_eq!(
            config.provider.openrouter.unwrap().api_key.as_deref(),
            Some("{env:OPENROUTER_API_KEY}")
        );
        let ollama = config.provider.ollama.unwrap();
        assert_eq!(ollama.base_url.as_deref(), Some(OLLAMA_DEFAULT_BASE_URL));
        assert!(ollama.api_key.is_none());
    }

    #[test]
    fn project_values_win_field_by_field() {
        let global: Config = toml::from_str(
            r#"
            default_provider = "openai"
            temperature = 0.7
            system_prompt = "global rules"

            [provider.openrouter]
            api_key = "global-key"
            custom_models = ["a/one"]
            "#,
        )
        .unwrap();
        let project: Config = toml::from_str(
            r#"
            default_provider = "grok"

            [provider.openrouter]
            custom_models = ["b/two"]

            [provider.ollama]
            base_url = "http://127.0.0.1:9999"
            "#,
        )
        .unwrap();

        let merged = Config::merge(global, project);
        assert_eq!(merged.default_provider.as_deref(), Some("grok"));
        assert_eq!(merged.temperature, Some(0.7));
        assert_eq!(merged.system_prompt.as_deref(), Some("global rules"));
        let openrouter = merged.provider.openrouter.unwrap();
        assert_eq!(openrouter.api_key.as_deref(), Some("global-key"));
        assert_eq!(openrouter.custom_models, vec!["b/two".to_string()]);
        assert_eq!(
            merged.provider.ollama.unwrap().base_url.as_deref(),
            Some("http://127.0.0.1:9999")
        );
    }

    #[test]
    fn project_prompt_equal_to_default_still_overrides_global() {
        let global: Config = toml::from_str("system_prompt = \"global rules\"\n").unwrap();
        let project = Config {
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            ..Config::default()
        };

        let merged = Config::merge(global, project);
        assert_eq!(merged.system_prompt(), Some(DEFAULT_SYSTEM_PROMPT));
    }

    #[test]
    fn unset_prompt_falls_through_to_global() {
        let global: Config = toml::from_str("system_prompt = \"global rules\"\n").unwrap();
        let merged = Config::merge(global, Config::default());
        assert_eq!(merged.system_prompt(), Some("global rules"));
    }
}
