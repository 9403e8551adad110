//! Centralized constants for promptbench.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "promptbench";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "promptbench.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

// --- Model defaults ---

/// Default provider when none is configured.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Default model identifier for a fresh prompt session.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default cap on output tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Default workspace-level system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

// --- Provider wiring ---

/// Default base URL for the local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Site origin sent to OpenRouter as `HTTP-Referer` when none is configured.
pub const DEFAULT_SITE_ORIGIN: &str = "http://localhost";

/// Site title sent to OpenRouter as `X-Title`.
pub const OPENROUTER_SITE_TITLE: &str = "AI Prompt Testing Platform";

/// Fallback message when an upstream error body cannot be parsed.
pub const GENERIC_PROVIDER_ERROR: &str = "Failed to get response from API";

/// Fallback message when Ollama fails without a parseable error body.
pub const GENERIC_OLLAMA_ERROR: &str =
    "Failed to connect to Ollama. Make sure Ollama is running on localhost:11434";

// --- Threads ---

/// Maximum characters taken from the first user message for a thread title.
pub const THREAD_TITLE_MAX_CHARS: usize = 50;

/// Number of id characters shown for threads and saved prompts.
pub const SHORT_ID_LEN: usize = 8;
