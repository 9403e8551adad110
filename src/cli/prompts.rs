//! Saved prompt CLI operations: `promptbench prompts list|show|delete`.

use anyhow::Result;
use colored::Colorize;

use super::PromptAction;
use crate::library::{PromptLibrary, SavedPrompt};
use crate::output;
use crate::thread::short_id;

pub(crate) fn handle_prompts(action: PromptAction) -> Result<()> {
    let library = PromptLibrary::default_location()?;
    match action {
        PromptAction::List => prompt_list(&library),
        PromptAction::Show { title } => {
            let prompt = find(&library, &title)?;
            print_prompt(&prompt);
            Ok(())
        }
        PromptAction::Delete { title } => {
            if library.delete(&title)? {
                println!("{} {}", "Deleted".green(), title.trim());
                Ok(())
            } else {
                anyhow::bail!("No saved prompt matching '{}'", title.trim())
            }
        }
    }
}

pub(crate) fn find(library: &PromptLibrary, key: &str) -> Result<SavedPrompt> {
    library
        .find(key)?
        .ok_or_else(|| anyhow::anyhow!("No saved prompt matching '{}'", key.trim()))
}

fn prompt_list(library: &PromptLibrary) -> Result<()> {
    let prompts = library.list()?;
    if prompts.is_empty() {
        println!("{}", "No saved prompts.".dimmed());
        println!("Save one with: {}", "promptbench ask --save <title> ...".cyan());
        return Ok(());
    }
    for p in &prompts {
        println!(
            "{} {} {}",
            format!("{:<10}", short_id(&p.id)).cyan(),
            p.title.bold(),
            format!("{}/{}", p.provider, p.model).dimmed(),
        );
    }
    Ok(())
}

fn print_prompt(prompt: &SavedPrompt) {
    println!("{} {}", prompt.title.bold(), format!("({})", short_id(&prompt.id)).dimmed());
    println!("{} {}/{}", "model:".dimmed(), prompt.provider, prompt.model);
    if !prompt.system_prompt.is_empty() {
        println!();
        println!("{}", "system:".dimmed());
        println!("{}", prompt.system_prompt);
    }
    println!();
    println!("{}", "user:".green().bold());
    println!("{}", prompt.user_prompt);
    if let Some(ref response) = prompt.response {
        println!();
        println!("{}", "response:".cyan().bold());
        println!("{}", output::render_markdown_lite(response));
    }
    if let (Some(usage), Some(time)) = (prompt.token_usage, prompt.response_time) {
        println!();
        println!(
            "{}",
            format!("[{} tokens | {:.2}s]", usage.total_tokens, time).dimmed()
        );
    }
}
