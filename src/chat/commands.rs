//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/history`, `/clear`, `/model`, `/regenerate` and `/help`.
//! Returns a [`CommandAction`] so the REPL loop can decide how to proceed.

use std::str::FromStr;

use anyhow::Result;
use colored::Colorize;

use crate::output;
use crate::prompt::ModelConfig;
use crate::provider::{split_shorthand, ProviderKind, ProviderRegistry};
use crate::thread::{Thread, ThreadStore};
use crate::workspace::{WorkspaceStore, WorkspaceUpdate};

/// Action returned by slash command handling.
#[derive(Debug, PartialEq)]
pub(crate) enum CommandAction {
    /// Command was handled; continue the REPL loop.
    Continue,
    /// Resend the thread without its last reply.
    Regenerate,
    /// Unknown command was entered.
    Unknown(String),
}

/// Resolves the argument of `/model` against the thread's current target.
///
/// Accepts `provider/model`, a bare provider (its first catalog model), or a
/// bare model id that keeps the current provider. In an OpenRouter thread a
/// slashed id is an OpenRouter model, so switching away takes a bare
/// provider name.
pub(crate) fn switch_target(
    arg: &str,
    current: &ModelConfig,
    registry: &ProviderRegistry,
) -> Option<ModelConfig> {
    let arg = arg.trim();
    if arg.is_empty() {
        return None;
    }
    let mut target = current.clone();
    match split_shorthand(arg, Some(current.provider)) {
        Some((provider, model)) => {
            target.set_provider(provider, registry);
            target.set_model(model.trim());
        }
        None => match ProviderKind::from_str(arg) {
            Ok(provider) => target.set_provider(provider, registry),
            Err(_) => target.set_model(arg),
        },
    }
    (!target.model.is_empty()).then_some(target)
}

/// Makes `provider`/`model` the default of the thread's workspace, if it
/// still exists.
fn update_workspace_target(
    workspaces: &WorkspaceStore,
    thread: &Thread,
    target: &ModelConfig,
) -> Result<()> {
    let Some(id) = thread.meta.workspace_id.as_deref() else {
        return Ok(());
    };
    if workspaces.find(id)?.is_some() {
        workspaces.update(
            id,
            WorkspaceUpdate {
                provider: Some(target.provider),
                model: Some(target.model.clone()),
                ..WorkspaceUpdate::default()
            },
        )?;
    }
    Ok(())
}

/// Dispatch and handle a slash command.
pub(crate) fn handle_slash_command(
    command: &str,
    store: &ThreadStore,
    workspaces: &WorkspaceStore,
    thread: &mut Thread,
    registry: &ProviderRegistry,
) -> Result<CommandAction> {
    let (name, arg) = command
        .split_once(char::is_whitespace)
        .unwrap_or((command, ""));

    match name {
        "/history" => {
            if thread.messages.is_empty() {
                println!("{}", "No messages yet.".dimmed());
            }
            for msg in &thread.messages {
                println!("{}", output::format_message(msg));
                println!();
            }
            Ok(CommandAction::Continue)
        }
        "/clear" => {
            store.replace_messages(thread, Vec::new())?;
            println!("{}", "History cleared.".dimmed());
            Ok(CommandAction::Continue)
        }
        "/model" => {
            let current = ModelConfig::new(thread.meta.provider, thread.meta.model.clone());
            match switch_target(arg, &current, registry) {
                Some(target) => {
                    store.switch_model(thread, target.provider, &target.model)?;
                    update_workspace_target(workspaces, thread, &target)?;
                    println!(
                        "{} {}/{}",
                        "Now using".dimmed(),
                        target.provider.to_string().yellow(),
                        target.model.yellow()
                    );
                }
                None => println!(
                    "{} {}/{}  (usage: /model <provider>/<model>)",
                    "Current model:".dimmed(),
                    thread.meta.provider,
                    thread.meta.model
                ),
            }
            Ok(CommandAction::Continue)
        }
        "/regenerate" => Ok(CommandAction::Regenerate),
        "/help" => {
            println!("{}", "Commands:".bold());
            println!("  {} - show conversation history", "/history".cyan());
            println!("  {} - clear conversation", "/clear".cyan());
            println!(
                "  {} - switch model for this thread",
                "/model <provider>/<model>".cyan()
            );
            println!("  {} - resend without the last reply", "/regenerate".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - exit", "Ctrl+D".cyan());
            Ok(CommandAction::Continue)
        }
        _ => Ok(CommandAction::Unknown(command.to_string())),
    }
}
