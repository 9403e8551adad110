//! Saved prompt library.
//!
//! Prompts saved from `ask --save` live in a single pretty-printed JSON file
//! (`~/.local/share/promptbench/prompts.json`). Titles are the user-facing
//! key: saving under an existing title updates that entry in place.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::prompt::{ModelConfig, NormalizedResponse, PromptState, TokenUsage};
use crate::provider::ProviderKind;

/// A prompt the user chose to keep, with the last response it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPrompt {
    pub id: String,
    pub title: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl SavedPrompt {
    /// Restores this prompt into a playground state. Sampling settings come
    /// from `defaults` since they are not part of a saved prompt.
    pub fn to_prompt_state(&self, defaults: &PromptState) -> PromptState {
        PromptState {
            system_prompt: self.system_prompt.clone(),
            user_prompt: self.user_prompt.clone(),
            response_format: defaults.response_format,
            model_config: ModelConfig {
                provider: self.provider,
                model: self.model.clone(),
                ..defaults.model_config.clone()
            },
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryFile {
    prompts: Vec<SavedPrompt>,
}

/// File-backed collection of [`SavedPrompt`]s.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    path: PathBuf,
}

impl PromptLibrary {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        Ok(Self::open(Config::data_dir()?.join("prompts.json")))
    }

    /// Saves `state` under `title`, updating an existing entry with the same
    /// title (keeping its id and creation time) or adding a new one.
    pub fn save(
        &self,
        title: &str,
        state: &PromptState,
        response: Option<&NormalizedResponse>,
    ) -> Result<SavedPrompt> {
        let title = title.trim();
        anyhow::ensure!(!title.is_empty(), "Prompt title cannot be empty");

        let mut file = self.load()?;
        let now = Utc::now().to_rfc3339();
        let existing = file.prompts.iter().position(|p| p.title == title);

        let (id, created_at) = match existing {
            Some(i) => (file.prompts[i].id.clone(), file.prompts[i].created_at.clone()),
            None => (Uuid::new_v4().to_string(), now.clone()),
        };
        let saved = SavedPrompt {
            id,
            title: title.to_string(),
            system_prompt: state.system_prompt.trim().to_string(),
            user_prompt: state.user_prompt.trim().to_string(),
            provider: state.model_config.provider,
            model: state.model_config.model.clone(),
            response: response.map(|r| r.content.trim().to_string()),
            token_usage: response.map(|r| r.token_usage),
            response_time: response.map(|r| r.response_time),
            created_at,
            updated_at: now,
        };

        match existing {
            Some(i) => file.prompts[i] = saved.clone(),
            None => file.prompts.push(saved.clone()),
        }
        self.store(&file)?;
        Ok(saved)
    }

    /// All saved prompts, most recently updated first.
    pub fn list(&self) -> Result<Vec<SavedPrompt>> {
        let mut prompts = self.load()?.prompts;
        prompts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(prompts)
    }

    /// Finds a prompt by exact title, then by id prefix.
    pub fn find(&self, key: &str) -> Result<Option<SavedPrompt>> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(None);
        }
        let prompts = self.load()?.prompts;
        if let Some(found) = prompts.iter().find(|p| p.title == key) {
            return Ok(Some(found.clone()));
        }
        let mut by_id = prompts.into_iter().filter(|p| p.id.starts_with(key));
        match (by_id.next(), by_id.next()) {
            (Some(only), None) => Ok(Some(only)),
            (Some(_), Some(_)) => anyhow::bail!("Ambiguous prompt id '{}'", key),
            _ => Ok(None),
        }
    }

    /// Removes a prompt by title or id prefix. Returns whether one was removed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let Some(target) = self.find(key)? else {
            return Ok(false);
        };
        let mut file = self.load()?;
        file.prompts.retain(|p| p.id != target.id);
        self.store(&file)?;
        Ok(true)
    }

    fn load(&self) -> Result<LibraryFile> {
        if !self.path.exists() {
            return Ok(LibraryFile::default());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read prompt library {:?}", self.path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse prompt library {:?}", self.path))
    }

    fn store(&self, file: &LibraryFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write prompt library {:?}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ResponseFormat;
    use tempfile::TempDir;

    fn library() -> (TempDir, PromptLibrary) {
        let dir = TempDir::new().unwrap();
        let library = PromptLibrary::open(dir.path().join("data/prompts.json"));
        (dir, library)
    }

    fn state(system: &str, user: &str) -> PromptState {
        PromptState {
            system_prompt: system.into(),
            user_prompt: user.into(),
            response_format: ResponseFormat::Markdown,
            model_config: ModelConfig::new(ProviderKind::Perplexity, "sonar"),
        }
    }

    fn response(content: &str) -> NormalizedResponse {
        NormalizedResponse {
            content: content.into(),
            format: ResponseFormat::Markdown,
            timestamp: 0,
            provider: ProviderKind::Perplexity,
            model: "sonar".into(),
            token_usage: TokenUsage::from_counts(3, 4),
            response_time: 0.5,
        }
    }

    #[test]
    fn save_trims_and_records_response() {
        let (_dir, library) = library();
        let saved = library
            .save("  Greeting ", &state(" sys ", "\nhello\n"), Some(&response(" hi \n")))
            .unwrap();

        assert_eq!(saved.title, "Greeting");
        assert_eq!(saved.system_prompt, "sys");
        assert_eq!(saved.user_prompt, "hello");
        assert_eq!(saved.response.as_deref(), Some("hi"));
        assert_eq!(saved.token_usage.unwrap().total_tokens, 7);
        assert_eq!(library.list().unwrap().len(), 1);
    }

    #[test]
    fn saving_same_title_updates_in_place() {
        let (_dir, library) = library();
        let first = library.save("t", &state("", "v1"), None).unwrap();
        let second = library.save("t", &state("", "v2"), None).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        let all = library.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].user_prompt, "v2");
    }

    #[test]
    fn find_by_title_or_id_prefix() {
        let (_dir, library) = library();
        let saved = library.save("alpha", &state("", "a"), None).unwrap();

        assert_eq!(library.find("alpha").unwrap().unwrap().id, saved.id);
        assert_eq!(library.find(&saved.id[..6]).unwrap().unwrap().title, "alpha");
        assert!(library.find("beta").unwrap().is_none());
    }

    #[test]
    fn delete_removes_entry() {
        let (_dir, library) = library();
        library.save("gone", &state("", "x"), None).unwrap();
        assert!(library.delete("gone").unwrap());
        assert!(!library.delete("gone").unwrap());
        assert!(library.list().unwrap().is_empty());
    }

    #[test]
    fn restores_prompt_state_with_default_sampling() {
        let (_dir, library) = library();
        let saved = library.save("r", &state("Be terse.", "2+2?"), None).unwrap();

        let mut defaults = PromptState::default();
        defaults.model_config.temperature = 0.2;
        let restored = saved.to_prompt_state(&defaults);

        assert_eq!(restored.system_prompt, "Be terse.");
        assert_eq!(restored.user_prompt, "2+2?");
        assert_eq!(restored.model_config.provider, ProviderKind::Perplexity);
        assert_eq!(restored.model_config.model, "sonar");
        assert_eq!(restored.model_config.temperature, 0.2);
    }

    #[test]
    fn blank_title_is_rejected() {
        let (_dir, library) = library();
        assert!(library.save("  ", &state("", "x"), None).is_err());
    }
}
