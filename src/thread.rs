//! Chat thread persistence for promptbench.
//!
//! Each thread is stored as a JSONL file under
//! `~/.local/share/promptbench/threads/`. A `threads/index.json` file keeps
//! the metadata for all threads, including the workspace each belongs to.
//! JSONL is crash-safe (append-only) and human-readable.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::constants::{SHORT_ID_LEN, THREAD_TITLE_MAX_CHARS};
use crate::message::{Message, Role};
use crate::provider::ProviderKind;
use crate::workspace::Workspace;

/// Metadata for a single thread, stored in the thread index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadMeta {
    pub id: String,
    pub title: Option<String>,
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// The owning workspace, if the thread was started in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub message_count: usize,
}

/// Index of all threads, persisted as `index.json`.
#[derive(Debug, Serialize, Deserialize, Default)]
struct ThreadIndex {
    threads: Vec<ThreadMeta>,
}

/// A chat thread: its metadata plus every message exchanged so far.
#[derive(Debug, Clone)]
pub struct Thread {
    pub meta: ThreadMeta,
    pub messages: Vec<Message>,
}

impl Thread {
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.meta.id)
    }

    /// Title derived from the first user message, truncated to 50 characters.
    /// Returns `None` if no user message exists.
    pub fn title(&self) -> Option<String> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| title_from(&m.content))
    }

    /// Takes the workspace's current system prompt, so edits to the
    /// workspace reach threads started before them.
    pub fn follow_workspace(&mut self, workspace: &Workspace) {
        self.meta.system_prompt = workspace.system_prompt().map(String::from);
    }

    /// Messages up to and including the last user message.
    pub fn history_for_regenerate(&self) -> Option<&[Message]> {
        let last_user = self.messages.iter().rposition(|m| m.role == Role::User)?;
        Some(&self.messages[..=last_user])
    }
}

fn title_from(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > THREAD_TITLE_MAX_CHARS {
        let truncated: String = text.chars().take(THREAD_TITLE_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Directory-backed thread storage.
///
/// Every mutation flushes the affected JSONL file and rewrites the index,
/// so a crash loses at most the message being written.
#[derive(Debug, Clone)]
pub struct ThreadStore {
    root: PathBuf,
}

impl ThreadStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create threads directory {:?}", root))?;
        Ok(Self { root })
    }

    /// The store under the XDG data directory (`~/.local/share/promptbench/threads/`).
    pub fn default_location() -> Result<Self> {
        Self::open(Config::data_dir()?.join("threads"))
    }

    /// Starts a new, empty thread. Nothing is written until the first append.
    pub fn create(
        &self,
        provider: ProviderKind,
        model: &str,
        system_prompt: Option<&str>,
    ) -> Thread {
        let now = Utc::now().to_rfc3339();
        Thread {
            meta: ThreadMeta {
                id: Uuid::new_v4().to_string(),
                title: None,
                provider,
                model: model.to_string(),
                system_prompt: system_prompt
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from),
                workspace_id: None,
                created_at: now.clone(),
                updated_at: now,
                message_count: 0,
            },
            messages: Vec::new(),
        }
    }

    /// Starts a new thread owned by `workspace`, with its system prompt and
    /// default provider/model.
    pub fn create_in(&self, workspace: &Workspace) -> Thread {
        let mut thread = self.create(
            workspace.provider,
            &workspace.model,
            workspace.system_prompt(),
        );
        thread.meta.workspace_id = Some(workspace.id.clone());
        thread
    }

    /// Loads an existing thread from its JSONL file and the index.
    pub fn load(&self, id: &str) -> Result<Thread> {
        let id = self.resolve_id(id)?;
        let file_path = self.thread_path(&id);
        let index = self.load_index()?;
        let meta = index
            .threads
            .into_iter()
            .find(|t| t.id == id)
            .with_context(|| format!("Thread {} not found", short_id(&id)))?;

        let mut messages = Vec::new();
        if file_path.exists() {
            let file = fs::File::open(&file_path)
                .with_context(|| format!("Failed to open thread file {:?}", file_path))?;
            for line in BufReader::new(file).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let msg: Message = serde_json::from_str(&line)
                    .with_context(|| "Failed to parse message from thread file")?;
                messages.push(msg);
            }
        }

        Ok(Thread { meta, messages })
    }

    /// Appends a message to the thread.
    ///
    /// Writes the message as a JSON line, flushes immediately, and updates
    /// the index.
    pub fn append(&self, thread: &mut Thread, msg: Message) -> Result<()> {
        let path = self.thread_path(&thread.meta.id);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open thread file {:?}", path))?;

        let json = serde_json::to_string(&msg)?;
        writeln!(file, "{}", json)?;
        file.flush()?;

        thread.messages.push(msg);
        self.update_index(thread)
    }

    /// Rewrites the thread file with exactly `messages`.
    pub fn replace_messages(&self, thread: &mut Thread, messages: Vec<Message>) -> Result<()> {
        let path = self.thread_path(&thread.meta.id);
        let mut body = String::new();
        for msg in &messages {
            body.push_str(&serde_json::to_string(msg)?);
            body.push('\n');
        }
        fs::write(&path, body).with_context(|| format!("Failed to rewrite {:?}", path))?;

        thread.messages = messages;
        self.update_index(thread)
    }

    /// Points the thread at a different provider/model for future sends.
    pub fn switch_model(
        &self,
        thread: &mut Thread,
        provider: ProviderKind,
        model: &str,
    ) -> Result<()> {
        thread.meta.provider = provider;
        thread.meta.model = model.to_string();
        if self.load_index()?.threads.iter().any(|t| t.id == thread.meta.id) {
            self.update_index(thread)?;
        }
        Ok(())
    }

    /// Returns metadata for all threads, most recently updated first.
    pub fn list(&self) -> Result<Vec<ThreadMeta>> {
        let mut threads = self.load_index()?.threads;
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(threads)
    }

    /// Threads owned by the workspace `workspace_id`, most recently updated
    /// first.
    pub fn list_in(&self, workspace_id: &str) -> Result<Vec<ThreadMeta>> {
        let mut threads = self.list()?;
        threads.retain(|t| t.workspace_id.as_deref() == Some(workspace_id));
        Ok(threads)
    }

    /// Deletes a thread's JSONL file and removes it from the index.
    pub fn delete(&self, id: &str) -> Result<()> {
        let id = self.resolve_id(id)?;
        let path = self.thread_path(&id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete thread file {:?}", path))?;
        }

        let mut index = self.load_index()?;
        index.threads.retain(|t| t.id != id);
        self.write_index(&index)
    }

    /// Expands a (possibly partial) thread id to the full id.
    pub fn resolve_id(&self, partial: &str) -> Result<String> {
        let partial = partial.trim();
        anyhow::ensure!(!partial.is_empty(), "Thread id is empty");
        let index = self.load_index()?;
        if let Some(exact) = index.threads.iter().find(|t| t.id == partial) {
            return Ok(exact.id.clone());
        }
        let matches: Vec<&ThreadMeta> = index
            .threads
            .iter()
            .filter(|t| t.id.starts_with(partial))
            .collect();
        match matches.as_slice() {
            [only] => Ok(only.id.clone()),
            [] => anyhow::bail!("No thread matching '{}'", partial),
            _ => anyhow::bail!(
                "Ambiguous thread id '{}' ({} matches)",
                partial,
                matches.len()
            ),
        }
    }

    /// Updates (or creates) this thread's entry in the index file.
    fn update_index(&self, thread: &mut Thread) -> Result<()> {
        let mut index = self.load_index()?;
        thread.meta.title = thread.title();
        thread.meta.updated_at = Utc::now().to_rfc3339();
        thread.meta.message_count = thread.messages.len();

        match index.threads.iter_mut().find(|t| t.id == thread.meta.id) {
            Some(entry) => *entry = thread.meta.clone(),
            None => index.threads.push(thread.meta.clone()),
        }
        self.write_index(&index)
    }

    /// Loads the index, returning an empty one if the file doesn't exist.
    fn load_index(&self) -> Result<ThreadIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(ThreadIndex::default());
        }
        let contents = fs::read_to_string(&path).with_context(|| "Failed to read thread index")?;
        serde_json::from_str(&contents).with_context(|| "Failed to parse thread index")
    }

    fn write_index(&self, index: &ThreadIndex) -> Result<()> {
        let json = serde_json::to_string_pretty(index)?;
        fs::write(self.index_path(), json).with_context(|| "Failed to write thread index")
    }

    fn thread_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.jsonl", id))
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{WorkspaceStore, WorkspaceUpdate};
    use tempfile::TempDir;

    fn store() -> (TempDir, ThreadStore) {
        let dir = TempDir::new().unwrap();
        let store = ThreadStore::open(dir.path().join("threads")).unwrap();
        (dir, store)
    }

    #[test]
    fn append_then_load_round_trips_messages_and_meta() {
        let (_dir, store) = store();
        let mut thread = store.create(ProviderKind::DeepSeek, "deepseek-chat", Some("Be brief."));
        store.append(&mut thread, Message::user("hello")).unwrap();
        store.append(&mut thread, Message::assistant("hi")).unwrap();

        let loaded = store.load(thread.id()).unwrap();
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[1].content, "hi");
        assert_eq!(loaded.meta.provider, ProviderKind::DeepSeek);
        assert_eq!(loaded.meta.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(loaded.meta.title.as_deref(), Some("hello"));
        assert_eq!(loaded.meta.message_count, 2);
    }

    #[test]
    fn untouched_thread_is_not_listed() {
        let (_dir, store) = store();
        let _thread = store.create(ProviderKind::OpenAI, "gpt-4o", None);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn title_truncates_long_first_message() {
        let (_dir, store) = store();
        let mut thread = store.create(ProviderKind::OpenAI, "gpt-4o", None);
        let long = "x".repeat(80);
        store.append(&mut thread, Message::user(long)).unwrap();

        let title = thread.meta.title.unwrap();
        assert_eq!(title.chars().count(), THREAD_TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn partial_ids_resolve_and_delete() {
        let (_dir, store) = store();
        let mut thread = store.create(ProviderKind::Grok, "grok-3", None);
        store.append(&mut thread, Message::user("q")).unwrap();

        let short = thread.short_id().to_string();
        assert_eq!(store.resolve_id(&short).unwrap(), thread.id());

        store.delete(&short).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(store.load(thread.id()).is_err());
    }

    #[test]
    fn unknown_id_is_an_error() {
        let (_dir, store) = store();
        let err = store.resolve_id("nope").unwrap_err();
        assert!(err.to_string().contains("No thread"));
    }

    #[test]
    fn replace_messages_rewrites_file() {
        let (_dir, store) = store();
        let mut thread = store.create(ProviderKind::OpenAI, "gpt-4o", None);
        store.append(&mut thread, Message::user("one")).unwrap();
        store.append(&mut thread, Message::assistant("two")).unwrap();

        let kept = thread.history_for_regenerate().unwrap().to_vec();
        store.replace_messages(&mut thread, kept).unwrap();

        let loaded = store.load(thread.id()).unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.messages[0].role, Role::User);
    }

    #[test]
    fn switch_model_persists_for_saved_threads() {
        let (_dir, store) = store();
        let mut thread = store.create(ProviderKind::OpenAI, "gpt-4o", None);
        store.append(&mut thread, Message::user("q")).unwrap();
        store
            .switch_model(&mut thread, ProviderKind::Qwen, "qwen-plus")
            .unwrap();

        let loaded = store.load(thread.id()).unwrap();
        assert_eq!(loaded.meta.provider, ProviderKind::Qwen);
        assert_eq!(loaded.meta.model, "qwen-plus");
    }

    #[test]
    fn workspace_threads_inherit_defaults_and_list_separately() {
        let (dir, store) = store();
        let workspaces = WorkspaceStore::open(dir.path().join("workspaces.json"));
        let research = workspaces
            .create("research", "Cite sources.", ProviderKind::Perplexity, "sonar")
            .unwrap();

        let mut inside = store.create_in(&research);
        assert_eq!(inside.meta.provider, ProviderKind::Perplexity);
        assert_eq!(inside.meta.model, "sonar");
        assert_eq!(inside.meta.system_prompt.as_deref(), Some("Cite sources."));
        store.append(&mut inside, Message::user("q1")).unwrap();

        let mut outside = store.create(ProviderKind::OpenAI, "gpt-4o", None);
        store.append(&mut outside, Message::user("q2")).unwrap();

        let listed = store.list_in(&research.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, inside.meta.id);
        assert_eq!(
            store.load(inside.id()).unwrap().meta.workspace_id,
            Some(research.id.clone())
        );
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn resumed_thread_follows_workspace_prompt() {
        let (dir, store) = store();
        let workspaces = WorkspaceStore::open(dir.path().join("workspaces.json"));
        let ws = workspaces
            .create("dev", "Old rules.", ProviderKind::OpenAI, "gpt-4o")
            .unwrap();
        let mut thread = store.create_in(&ws);

        let ws = workspaces
            .update(
                "dev",
                WorkspaceUpdate {
                    system_prompt: Some("New rules.".into()),
                    ..WorkspaceUpdate::default()
                },
            )
            .unwrap();
        thread.follow_workspace(&ws);
        assert_eq!(thread.meta.system_prompt.as_deref(), Some("New rules."));
    }

    #[test]
    fn short_id_handles_short_strings() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("0123456789"), "01234567");
    }
}
