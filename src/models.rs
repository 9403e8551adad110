//! Built-in model catalog for promptbench.
//!
//! Static model lists per provider. This is the single source of truth for
//! the [`ProviderRegistry`](crate::provider::ProviderRegistry); Ollama has no
//! entry here because its models are discovered from the running server.

/// Known OpenAI models.
pub const OPENAI_MODELS: &[&str] = &[
    "gpt-5",
    "gpt-5-mini",
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-3.5-turbo",
];

/// Known OpenRouter models. User-configured custom ids are merged in by
/// [`ProviderRegistry::openrouter_models`](crate::provider::ProviderRegistry::openrouter_models).
pub const OPENROUTER_MODELS: &[&str] = &[
    "perplexity/sonar",
    "deepseek/deepseek-r1-0528:free",
    "deepseek/deepseek-r1-0528-qwen3-8b:free",
    "anthropic/claude-3.7-sonnet",
    "mistralai/mistral-7b-instruct",
    "openai/gpt-oss-20b",
    "meta-llama/llama-3.3-70b-instruct:free",
    "meta-llama/llama-3.3-70b-instruct",
];

/// Known Perplexity models.
pub const PERPLEXITY_MODELS: &[&str] = &[
    "sonar",
    "sonar-small",
    "sonar-pro",
    "sonar-deep-research",
    "r1-1776",
    "llama-2-13b-chat",
    "llama-3.1-sonar-small-128k-online",
];

/// Known DeepSeek models.
pub const DEEPSEEK_MODELS: &[&str] = &["deepseek-chat", "deepseek-coder"];

/// Known Grok (xAI) models.
pub const GROK_MODELS: &[&str] = &["grok-3", "grok-3-mini"];

/// Known Qwen (DashScope) models.
pub const QWEN_MODELS: &[&str] = &["qwen-plus", "qwen-turbo"];
