//! Model resolution logic for promptbench.
//!
//! Resolves which provider and model to use based on CLI flags, config file,
//! and the catalog defaults. Supports `provider/model` shorthand syntax.

use std::str::FromStr;

use anyhow::Result;

use super::kind::ProviderKind;
use super::registry::ProviderRegistry;
use crate::config::Config;
use crate::constants::{DEFAULT_MODEL, DEFAULT_PROVIDER};

/// Resolved provider + model pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelection {
    pub provider: ProviderKind,
    pub model: String,
}

/// Splits `provider/model` shorthand when the prefix names a known provider.
///
/// OpenRouter's own ids look like `openai/gpt-oss-20b`, so when `current` is
/// OpenRouter nothing is split and the whole string stays a model id.
pub fn split_shorthand(
    value: &str,
    current: Option<ProviderKind>,
) -> Option<(ProviderKind, &str)> {
    if current == Some(ProviderKind::OpenRouter) {
        return None;
    }
    let (prefix, model) = value.split_once('/')?;
    let provider = ProviderKind::from_str(prefix).ok()?;
    Some((provider, model))
}

/// Resolve which provider and model to use.
/// Priority: CLI flags > config.toml > defaults.
///
/// Accepts these formats:
///   --model deepseek/deepseek-chat  (shorthand, only when --provider is omitted
///                                    and the prefix names a known provider)
///   --provider openrouter --model "org/model-name"  (slash preserved as model name)
///   --model openai/gpt-oss-20b  (kept whole when the default provider is openrouter)
///   --provider grok --model grok-3-mini
///   --provider perplexity  (uses the provider's first catalog model)
///   (nothing)  (uses config.toml, then the built-in default)
pub fn resolve_model(
    cli_provider: Option<&str>,
    cli_model: Option<&str>,
    config: &Config,
    registry: &ProviderRegistry,
) -> Result<ModelSelection> {
    let configured = config.model_name();
    let config_provider = match config.provider_name() {
        Some(name) => ProviderKind::from_str(name)?,
        None => configured
            .as_ref()
            .and_then(|(prefix, _)| *prefix)
            .unwrap_or(ProviderKind::from_str(DEFAULT_PROVIDER)?),
    };

    if cli_provider.is_none() {
        if let Some((provider, model)) =
            cli_model.and_then(|m| split_shorthand(m, Some(config_provider)))
        {
            return Ok(ModelSelection {
                provider,
                model: model.to_string(),
            });
        }
    }

    let provider = match cli_provider {
        Some(name) => ProviderKind::from_str(name)?,
        None => config_provider,
    };

    // A configured model only applies to the provider it was configured for.
    let from_config = configured.and_then(|(prefix, model)| {
        let owner = prefix.unwrap_or(config_provider);
        (owner == provider).then_some(model)
    });

    let model = cli_model
        .map(String::from)
        .or(from_config)
        .or_else(|| {
            if provider == ProviderKind::from_str(DEFAULT_PROVIDER).ok()? {
                Some(DEFAULT_MODEL.to_string())
            } else {
                registry.first_model(provider).map(String::from)
            }
        })
        .unwrap_or_default();

    Ok(ModelSelection { provider, model })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::default()
    }

    #[test]
    fn shorthand_splits_known_provider_prefix() {
        let sel =
            resolve_model(None, Some("grok/grok-3"), &Config::default(), &registry()).unwrap();
        assert_eq!(sel.provider, ProviderKind::Grok);
        assert_eq!(sel.model, "grok-3");
    }

    #[test]
    fn unknown_prefix_is_kept_as_model_id() {
        let config = Config {
            default_provider: Some("openrouter".into()),
            ..Config::default()
        };
        let sel = resolve_model(None, Some("anthropic/claude-3.5-sonnet"), &config, &registry())
            .unwrap();
        assert_eq!(sel.provider, ProviderKind::OpenRouter);
        assert_eq!(sel.model, "anthropic/claude-3.5-sonnet");
    }

    #[test]
    fn explicit_provider_keeps_slash_in_model() {
        let sel = resolve_model(
            Some("openrouter"),
            Some("openai/gpt-4o"),
            &Config::default(),
            &registry(),
        )
        .unwrap();
        assert_eq!(sel.provider, ProviderKind::OpenRouter);
        assert_eq!(sel.model, "openai/gpt-4o");
    }

    #[test]
    fn falls_back_to_config_then_catalog() {
        let config = Config {
            default_provider: Some("deepseek".into()),
            model: Some("deepseek-reasoner".into()),
            ..Config::default()
        };
        let sel = resolve_model(None, None, &config, &registry()).unwrap();
        assert_eq!(sel.provider, ProviderKind::DeepSeek);
        assert_eq!(sel.model, "deepseek-reasoner");

        let sel = resolve_model(Some("perplexity"), None, &config, &registry()).unwrap();
        assert_eq!(sel.provider, ProviderKind::Perplexity);
        assert_eq!(
            sel.model,
            registry().first_model(ProviderKind::Perplexity).unwrap()
        );
    }

    #[test]
    fn prefixed_config_model_selects_provider() {
        let config = Config {
            model: Some("qwen/qwen-plus".into()),
            ..Config::default()
        };
        let sel = resolve_model(None, None, &config, &registry()).unwrap();
        assert_eq!(sel.provider, ProviderKind::Qwen);
        assert_eq!(sel.model, "qwen-plus");
    }

    #[test]
    fn defaults_to_openai() {
        let sel = resolve_model(None, None, &Config::default(), &registry()).unwrap();
        assert_eq!(sel.provider, ProviderKind::OpenAI);
        assert_eq!(sel.model, "gpt-4o");
    }

    #[test]
    fn ollama_without_model_resolves_empty() {
        let sel = resolve_model(Some("ollama"), None, &Config::default(), &registry()).unwrap();
        assert_eq!(sel.provider, ProviderKind::Ollama);
        assert!(sel.model.is_empty());
    }

    #[test]
    fn unknown_provider_is_an_error() {
        assert!(resolve_model(Some("anthropic"), None, &Config::default(), &registry()).is_err());
    }

    fn openrouter_config(model: &str) -> Config {
        Config {
            default_provider: Some("openrouter".into()),
            model: Some(model.into()),
            ..Config::default()
        }
    }

    #[test]
    fn openrouter_default_keeps_configured_vendor_id() {
        let config = openrouter_config("openai/gpt-oss-20b");
        let sel = resolve_model(None, None, &config, &registry()).unwrap();
        assert_eq!(sel.provider, ProviderKind::OpenRouter);
        assert_eq!(sel.model, "openai/gpt-oss-20b");
    }

    #[test]
    fn openrouter_default_keeps_cli_vendor_id() {
        let config = openrouter_config("perplexity/sonar");
        let sel = resolve_model(None, Some("openai/gpt-oss-20b"), &config, &registry()).unwrap();
        assert_eq!(sel.provider, ProviderKind::OpenRouter);
        assert_eq!(sel.model, "openai/gpt-oss-20b");
    }

    #[test]
    fn explicit_default_provider_owns_prefixed_model() {
        let config = Config {
            default_provider: Some("deepseek".into()),
            model: Some("deepseek/deepseek-reasoner".into()),
            ..Config::default()
        };
        let sel = resolve_model(None, None, &config, &registry()).unwrap();
        assert_eq!(sel.provider, ProviderKind::DeepSeek);
        assert_eq!(sel.model, "deepseek-reasoner");
    }

    #[test]
    fn shorthand_is_not_split_for_openrouter() {
        assert_eq!(
            split_shorthand("openai/gpt-4o", Some(ProviderKind::OpenRouter)),
            None
        );
        assert_eq!(
            split_shorthand("openai/gpt-4o", Some(ProviderKind::Grok)),
            Some((ProviderKind::OpenAI, "gpt-4o"))
        );
        assert_eq!(split_shorthand("meta-llama/llama-3", None), None);
    }
}
