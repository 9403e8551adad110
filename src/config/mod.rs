//! Configuration types and path resolution for promptbench.
//!
//! Promptbench stores its settings as TOML at the platform's XDG config path
//! (e.g. `~/.config/promptbench/config.toml` on Linux). Threads and saved
//! prompts live under the XDG data directory (`~/.local/share/promptbench/`).
//! A `promptbench.toml` found between the working directory and the git root
//! overrides the global file.

mod loader;
mod paths;
mod resolve;
mod types;

pub use types::Config;

use anyhow::Result;

impl Config {
    /// Load config with precedence: project > global > defaults.
    /// Creates default config file if none exists.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project()?;

        let mut config = global;
        if let Some(proj) = project {
            config = Self::merge(config, proj);
        }

        config.resolve_substitutions();
        Ok(config)
    }

    /// Render as TOML with every API key masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        for kind in crate::provider::ProviderKind::ALL {
            if let Some(entry) = shown.provider.slot_mut(kind) {
                if let Some(key) = entry.api_key.as_mut() {
                    *key = redact(key);
                }
            }
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

fn redact(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() {
        return String::new();
    }
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if key.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}
