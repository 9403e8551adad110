//! Thread management CLI operations for promptbench.
//!
//! Handles listing and deleting chat threads through the `promptbench
//! threads` subcommand family, with table-formatted output and git-style
//! short ids. Listing can be narrowed to one workspace.

use anyhow::Result;
use colored::Colorize;

use super::ThreadAction;
use crate::thread::{short_id, ThreadMeta, ThreadStore};
use crate::workspace::WorkspaceStore;

const TITLE_WIDTH: usize = 40;

/// Dispatches a threads subcommand to its handler.
pub(crate) fn handle_threads(action: ThreadAction) -> Result<()> {
    let store = ThreadStore::default_location()?;
    match action {
        ThreadAction::List { workspace } => {
            let threads = match workspace {
                Some(key) => {
                    let ws = WorkspaceStore::default_location()?.get(&key)?;
                    println!("{} {}", "workspace:".dimmed(), ws.name.bold());
                    store.list_in(&ws.id)?
                }
                None => store.list()?,
            };
            thread_list(&threads);
            Ok(())
        }
        ThreadAction::Delete { id } => thread_delete(&store, &id),
    }
}

/// `2026-10-19T08:30:00+00:00` -> `2026-10-19 08:30`
fn format_updated(updated_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(updated_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| updated_at.chars().take(16).collect())
}

fn fit_title(meta: &ThreadMeta) -> String {
    let title = meta.title.as_deref().unwrap_or("(untitled)");
    if title.chars().count() > TITLE_WIDTH {
        let truncated: String = title.chars().take(TITLE_WIDTH - 3).collect();
        format!("{}...", truncated)
    } else {
        title.to_string()
    }
}

/// Prints threads in a formatted table.
fn thread_list(threads: &[ThreadMeta]) {
    if threads.is_empty() {
        println!("{}", "No threads found.".dimmed());
        println!("Start one with: {}", "promptbench chat".cyan());
        return;
    }

    println!(
        "{} {} {} {} {}",
        format!("{:<10}", "ID").bold(),
        format!("{:<tw$}", "TITLE", tw = TITLE_WIDTH + 2).bold(),
        format!("{:<6}", "MSGS").bold(),
        format!("{:<18}", "UPDATED").bold(),
        "MODEL".bold(),
    );
    println!("{}", "-".repeat(10 + TITLE_WIDTH + 2 + 6 + 18 + 24));

    for t in threads {
        // Pad first, then colorize to avoid ANSI escape code width issues
        let id_col = format!("{:<10}", short_id(&t.id));
        let title_col = format!("{:<tw$}", fit_title(t), tw = TITLE_WIDTH + 2);
        let msgs_col = format!("{:<6}", t.message_count);
        let updated_col = format!("{:<18}", format_updated(&t.updated_at));

        println!(
            "{} {} {} {} {}",
            id_col.cyan(),
            title_col,
            msgs_col.yellow(),
            updated_col.dimmed(),
            format!("{}/{}", t.provider, t.model).dimmed(),
        );
    }
    println!();
    println!(
        "{} {} threads. Resume with: {}",
        "total:".dimmed(),
        threads.len(),
        "promptbench chat --thread <id>".cyan()
    );
}

/// Deletes a thread by full or partial id.
fn thread_delete(store: &ThreadStore, id: &str) -> Result<()> {
    let thread = store.load(id)?;
    let title = thread.meta.title.as_deref().unwrap_or("(untitled)");
    println!("Deleting thread {} (\"{}\")", thread.short_id().cyan(), title);
    store.delete(thread.id())?;
    println!("{}", "Deleted.".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updated_timestamps_are_shortened() {
        assert_eq!(format_updated("2026-10-19T08:30:12+00:00"), "2026-10-19 08:30");
        assert_eq!(format_updated("yesterday-ish, roughly"), "yesterday-ish, r");
    }
}
