//! Named workspaces that own chat threads.
//!
//! A workspace carries the system prompt and default provider/model for the
//! threads started in it. Workspaces live in one pretty-printed JSON file
//! (`~/.local/share/promptbench/workspaces.json`); which threads belong to a
//! workspace is recorded on each thread's index entry.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::prompt::ModelConfig;
use crate::provider::ProviderKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub system_prompt: String,
    pub provider: ProviderKind,
    pub model: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Workspace {
    /// The workspace-level system prompt, `None` when blank.
    pub fn system_prompt(&self) -> Option<&str> {
        Some(self.system_prompt.as_str()).filter(|p| !p.trim().is_empty())
    }

    /// Provider and model new threads start with.
    pub fn target(&self) -> ModelConfig {
        ModelConfig::new(self.provider, self.model.clone())
    }
}

/// Fields to change on an existing workspace; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceUpdate {
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkspaceFile {
    workspaces: Vec<Workspace>,
}

/// File-backed collection of [`Workspace`]s. Names are unique.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    path: PathBuf,
}

impl WorkspaceStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        Ok(Self::open(Config::data_dir()?.join("workspaces.json")))
    }

    pub fn create(
        &self,
        name: &str,
        system_prompt: &str,
        provider: ProviderKind,
        model: &str,
    ) -> Result<Workspace> {
        let name = name.trim();
        anyhow::ensure!(!name.is_empty(), "Workspace name cannot be empty");

        let mut file = self.load()?;
        anyhow::ensure!(
            !file.workspaces.iter().any(|w| w.name == name),
            "Workspace '{}' already exists",
            name
        );

        let now = Utc::now().to_rfc3339();
        let workspace = Workspace {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            system_prompt: system_prompt.trim().to_string(),
            provider,
            model: model.trim().to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        file.workspaces.push(workspace.clone());
        self.store(&file)?;
        Ok(workspace)
    }

    /// All workspaces, most recently updated first.
    pub fn list(&self) -> Result<Vec<Workspace>> {
        let mut workspaces = self.load()?.workspaces;
        workspaces.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(workspaces)
    }

    /// Finds a workspace by exact name, then by id prefix.
    pub fn find(&self, key: &str) -> Result<Option<Workspace>> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(None);
        }
        let workspaces = self.load()?.workspaces;
        if let Some(found) = workspaces.iter().find(|w| w.name == key) {
            return Ok(Some(found.clone()));
        }
        let mut by_id = workspaces.into_iter().filter(|w| w.id.starts_with(key));
        match (by_id.next(), by_id.next()) {
            (Some(only), None) => Ok(Some(only)),
            (Some(_), Some(_)) => anyhow::bail!("Ambiguous workspace id '{}'", key),
            _ => Ok(None),
        }
    }

    /// Like [`find`](Self::find), but a missing workspace is an error.
    pub fn get(&self, key: &str) -> Result<Workspace> {
        self.find(key)?
            .ok_or_else(|| anyhow::anyhow!("No workspace matching '{}'", key.trim()))
    }

    pub fn update(&self, key: &str, update: WorkspaceUpdate) -> Result<Workspace> {
        let target = self.get(key)?;
        let mut file = self.load()?;

        if let Some(name) = update.name.as_deref().map(str::trim) {
            anyhow::ensure!(!name.is_empty(), "Workspace name cannot be empty");
            anyhow::ensure!(
                !file
                    .workspaces
                    .iter()
                    .any(|w| w.name == name && w.id != target.id),
                "Workspace '{}' already exists",
                name
            );
        }

        let entry = file
            .workspaces
            .iter_mut()
            .find(|w| w.id == target.id)
            .with_context(|| format!("Workspace '{}' vanished during update", target.name))?;
        if let Some(name) = update.name {
            entry.name = name.trim().to_string();
        }
        if let Some(system_prompt) = update.system_prompt {
            entry.system_prompt = system_prompt.trim().to_string();
        }
        if let Some(provider) = update.provider {
            entry.provider = provider;
        }
        if let Some(model) = update.model {
            entry.model = model.trim().to_string();
        }
        entry.updated_at = Utc::now().to_rfc3339();

        let updated = entry.clone();
        self.store(&file)?;
        Ok(updated)
    }

    /// Removes a workspace by name or id prefix, returning it if one was
    /// removed. Its threads are left to the caller.
    pub fn delete(&self, key: &str) -> Result<Option<Workspace>> {
        let Some(target) = self.find(key)? else {
            return Ok(None);
        };
        let mut file = self.load()?;
        file.workspaces.retain(|w| w.id != target.id);
        self.store(&file)?;
        Ok(Some(target))
    }

    fn load(&self) -> Result<WorkspaceFile> {
        if !self.path.exists() {
            return Ok(WorkspaceFile::default());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read workspaces {:?}", self.path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse workspaces {:?}", self.path))
    }

    fn store(&self, file: &WorkspaceFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write workspaces {:?}", self.path))
    }
}
