//! Interactive chat REPL for promptbench.
//!
//! Provides a multi-turn conversation loop using [`rustyline`] for readline
//! support (history, line editing). The full thread is sent with each
//! request so the model keeps context across turns, and the thread's system
//! prompt is prepended once per request.

mod commands;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::message::{Message, Role};
use crate::output;
use crate::prompt::{ModelConfig, NormalizedResponse};
use crate::thread::{Thread, ThreadStore};
use crate::workspace::WorkspaceStore;

use commands::CommandAction;

/// What the next request should contain.
pub(crate) enum Turn {
    /// The thread plus a new user message.
    Ask(String),
    /// The thread up to its last user message, replacing any reply after it.
    Regenerate,
}

/// Runs one request against the thread's provider and model.
///
/// The thread is only written once the provider answers, so a failed send
/// leaves it exactly as it was and the user can retry. The outer `Result`
/// carries storage failures; the inner one the provider outcome.
pub(crate) async fn exchange(
    dispatcher: &Dispatcher,
    store: &ThreadStore,
    thread: &mut Thread,
    sampling: &ModelConfig,
    turn: Turn,
) -> Result<Result<NormalizedResponse, DispatchError>> {
    let (history, pending) = match turn {
        Turn::Ask(text) => (thread.messages.clone(), Some(Message::user(text))),
        Turn::Regenerate => match thread.history_for_regenerate() {
            Some(history) => (history.to_vec(), None),
            None => anyhow::bail!("Nothing to regenerate yet"),
        },
    };

    let mut request = history.clone();
    request.extend(pending.iter().cloned());

    let config = ModelConfig {
        provider: thread.meta.provider,
        model: thread.meta.model.clone(),
        ..sampling.clone()
    };
    debug!(thread = thread.short_id(), messages = request.len(), "chat turn");

    let response = match dispatcher
        .send_chat(&request, &config, thread.meta.system_prompt.as_deref())
        .await
    {
        Ok(response) => response,
        Err(err) => {
            debug!(provider = %err.provider(), error = %err, "chat turn failed");
            return Ok(Err(err));
        }
    };

    match pending {
        Some(user) => store.append(thread, user)?,
        None if history.len() != thread.messages.len() => {
            store.replace_messages(thread, history)?
        }
        None => {}
    }
    store.append(thread, Message::from_response(&response))?;
    Ok(Ok(response))
}

fn print_thread(thread: &Thread) {
    for msg in &thread.messages {
        if msg.role == Role::System {
            continue;
        }
        println!("{}", output::format_message(msg));
        println!();
    }
}

fn print_reply(response: &NormalizedResponse) {
    println!();
    output::print_response(response);
    println!();
}

/// Runs the interactive chat REPL.
///
/// Each answered turn is appended to the [`Thread`], which persists messages
/// as JSONL. `/model` in a workspace thread also moves the workspace default.
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in REPL
/// - **Ctrl+D**: exits cleanly with "goodbye."
/// - Readline history is persisted to `~/.cache/promptbench/chat_history.txt`
pub async fn run_chat(
    dispatcher: &Dispatcher,
    store: &ThreadStore,
    workspaces: &WorkspaceStore,
    mut thread: Thread,
    sampling: ModelConfig,
) -> Result<()> {
    let verb = if thread.messages.is_empty() {
        "promptbench chat"
    } else {
        "resuming"
    };
    println!(
        "{} [thread: {}] [model: {}/{}] (/help, Ctrl+D to exit)",
        verb.bold().cyan(),
        thread.short_id().yellow(),
        thread.meta.provider.to_string().yellow(),
        thread.meta.model.yellow(),
    );
    println!();
    print_thread(&thread);

    // Set up readline with persistent history
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }

                let turn = if line.starts_with('/') {
                    match commands::handle_slash_command(
                        &line,
                        store,
                        workspaces,
                        &mut thread,
                        dispatcher.registry(),
                    )? {
                        CommandAction::Continue => continue,
                        CommandAction::Regenerate => Turn::Regenerate,
                        CommandAction::Unknown(cmd) => {
                            println!("{} Unknown command: {}", "?".yellow(), cmd);
                            continue;
                        }
                    }
                } else {
                    let _ = rl.add_history_entry(&line);
                    Turn::Ask(line)
                };

                match exchange(dispatcher, store, &mut thread, &sampling, turn).await {
                    Ok(Ok(response)) => print_reply(&response),
                    Ok(Err(err)) => output::print_error(&err),
                    Err(err) => eprintln!("{} {}", "error:".red().bold(), err),
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    // Save readline history
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}
