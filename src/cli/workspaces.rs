//! Workspace CLI operations: `promptbench workspaces list|create|show|update|delete`.

use std::str::FromStr;

use anyhow::Result;
use colored::Colorize;

use super::WorkspaceAction;
use crate::config::Config;
use crate::prompt::ModelConfig;
use crate::provider::{self, split_shorthand, ProviderKind, ProviderRegistry};
use crate::thread::{short_id, ThreadStore};
use crate::workspace::{Workspace, WorkspaceStore, WorkspaceUpdate};

pub(crate) fn handle_workspaces(action: WorkspaceAction) -> Result<()> {
    let workspaces = WorkspaceStore::default_location()?;
    let threads = ThreadStore::default_location()?;
    match action {
        WorkspaceAction::List => workspace_list(&workspaces, &threads),
        WorkspaceAction::Create {
            name,
            system,
            provider: provider_name,
            model,
        } => {
            let config = Config::load()?;
            let registry = config.registry();
            let selection = provider::resolve_model(
                provider_name.as_deref(),
                model.as_deref(),
                &config,
                &registry,
            )?;
            let system = system
                .or_else(|| config.system_prompt().map(String::from))
                .unwrap_or_default();
            let ws = workspaces.create(&name, &system, selection.provider, &selection.model)?;
            println!(
                "{} {} {}",
                "Created workspace".green(),
                ws.name.bold(),
                format!("({}/{})", ws.provider, ws.model).dimmed()
            );
            println!(
                "Chat in it with: {}",
                format!("promptbench chat --workspace \"{}\"", ws.name).cyan()
            );
            Ok(())
        }
        WorkspaceAction::Show { name } => {
            let ws = workspaces.get(&name)?;
            print_workspace(&ws, &threads)
        }
        WorkspaceAction::Update {
            name,
            rename,
            system,
            provider: provider_name,
            model,
        } => {
            let current = workspaces.get(&name)?;
            let registry = Config::load()?.registry();
            let retarget = provider_name.is_some() || model.is_some();
            let target = override_target(
                current.target(),
                provider_name.as_deref(),
                model.as_deref(),
                &registry,
            )?;
            let ws = workspaces.update(
                &current.id,
                WorkspaceUpdate {
                    name: rename,
                    system_prompt: system,
                    provider: retarget.then_some(target.provider),
                    model: retarget.then_some(target.model),
                },
            )?;
            println!("{} {}", "Updated workspace".green(), ws.name.bold());
            Ok(())
        }
        WorkspaceAction::Delete { name } => {
            let (ws, removed) = delete_workspace(&workspaces, &threads, &name)?;
            println!(
                "{} {} {}",
                "Deleted workspace".green(),
                ws.name.bold(),
                format!("and {removed} thread(s)").dimmed()
            );
            Ok(())
        }
    }
}

/// Applies `--provider`/`--model` flags to a workspace's default target.
///
/// A provider alone resets the model to that provider's first catalog
/// model; `provider/model` shorthand in `model` applies when no provider
/// flag is given.
pub(super) fn override_target(
    base: ModelConfig,
    provider_name: Option<&str>,
    model: Option<&str>,
    registry: &ProviderRegistry,
) -> Result<ModelConfig> {
    let mut target = base;
    let shorthand = match provider_name {
        Some(name) => {
            target.set_provider(ProviderKind::from_str(name)?, registry);
            None
        }
        None => model.and_then(|m| split_shorthand(m, Some(target.provider))),
    };
    match (shorthand, model) {
        (Some((provider, rest)), _) => {
            target.set_provider(provider, registry);
            target.set_model(rest);
        }
        (None, Some(model)) => target.set_model(model.trim()),
        (None, None) => {}
    }
    Ok(target)
}

/// Deletes a workspace together with every thread it owns. Returns the
/// workspace and how many threads went with it.
fn delete_workspace(
    workspaces: &WorkspaceStore,
    threads: &ThreadStore,
    key: &str,
) -> Result<(Workspace, usize)> {
    let ws = workspaces.get(key)?;
    let owned = threads.list_in(&ws.id)?;
    for meta in &owned {
        threads.delete(&meta.id)?;
    }
    workspaces.delete(&ws.id)?;
    Ok((ws, owned.len()))
}

fn workspace_list(workspaces: &WorkspaceStore, threads: &ThreadStore) -> Result<()> {
    let all = workspaces.list()?;
    if all.is_empty() {
        println!("{}", "No workspaces.".dimmed());
        println!("Create one with: {}", "promptbench workspaces create <name>".cyan());
        return Ok(());
    }
    for ws in &all {
        let count = threads.list_in(&ws.id)?.len();
        println!(
            "{} {} {} {}",
            format!("{:<10}", short_id(&ws.id)).cyan(),
            ws.name.bold(),
            format!("{}/{}", ws.provider, ws.model).dimmed(),
            format!("[{count} threads]").yellow(),
        );
    }
    Ok(())
}

fn print_workspace(ws: &Workspace, threads: &ThreadStore) -> Result<()> {
    println!("{} {}", ws.name.bold(), format!("({})", short_id(&ws.id)).dimmed());
    println!("{} {}/{}", "model:".dimmed(), ws.provider, ws.model);
    if let Some(system) = ws.system_prompt() {
        println!();
        println!("{}", "system:".dimmed());
        println!("{}", system);
    }

    let owned = threads.list_in(&ws.id)?;
    println!();
    if owned.is_empty() {
        println!("{}", "No threads yet.".dimmed());
    }
    for meta in &owned {
        println!(
            "  {} {} {}",
            short_id(&meta.id).cyan(),
            meta.title.as_deref().unwrap_or("(untitled)"),
            format!("{}/{}", meta.provider, meta.model).dimmed(),
        );
    }
    Ok(())
}
