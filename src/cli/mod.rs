//! Command-line interface definition and dispatch for promptbench.
//!
//! Uses [`clap`] for argument parsing with derive macros. Each subcommand is
//! routed to its handler; thread, workspace, saved prompt and comparison
//! operations live in their own submodules.

mod compare;
mod prompts;
mod threads;
mod workspaces;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::library::PromptLibrary;
use crate::prompt::{ModelConfig, PromptState, ResponseFormat};
use crate::provider::{self, ModelSelection, ProviderKind, ProviderRegistry};
use crate::thread::ThreadStore;
use crate::workspace::WorkspaceStore;
use crate::transport::ReqwestTransport;
use crate::{chat, output};

/// Top-level CLI structure for promptbench.
#[derive(Parser)]
#[command(
    name = "promptbench",
    version,
    about = "Send, compare and chat with prompts across LLM providers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Provider and sampling flags shared by `ask` and `compare`.
#[derive(clap::Args, Debug, Default)]
pub struct SamplingArgs {
    /// Sampling temperature (overrides config)
    #[arg(long)]
    pub temperature: Option<f64>,
    /// Output token cap (overrides config)
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Ask for a JSON object instead of markdown
    #[arg(long)]
    pub json: bool,
}

/// Available subcommands for the promptbench CLI.
///
/// The `///` doc comments on variants double as `--help` text.
#[derive(Subcommand)]
pub enum Commands {
    /// Send one prompt to one model
    Ask {
        /// The prompt to send
        prompt: Vec<String>,
        /// System prompt for this request
        #[arg(short, long)]
        system: Option<String>,
        /// Provider to use (openai, openrouter, perplexity, deepseek, grok, qwen, ollama)
        #[arg(short, long)]
        provider: Option<String>,
        /// Model to use, optionally as provider/model
        #[arg(short, long)]
        model: Option<String>,
        #[command(flatten)]
        sampling: SamplingArgs,
        /// Save the prompt and its response under this title
        #[arg(long, value_name = "TITLE")]
        save: Option<String>,
    },
    /// Send one prompt to several models at once
    Compare {
        /// The prompt to send (omit with --saved)
        prompt: Vec<String>,
        /// A provider/model pair to include; repeat for more
        #[arg(short, long = "target", value_name = "PROVIDER/MODEL")]
        targets: Vec<String>,
        /// Use a saved prompt by title or id
        #[arg(long, value_name = "TITLE")]
        saved: Option<String>,
        /// System prompt for this request
        #[arg(short, long)]
        system: Option<String>,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Start or resume an interactive chat thread
    Chat {
        /// Resume a thread by id (supports partial ids)
        #[arg(short, long, conflicts_with = "workspace")]
        thread: Option<String>,
        /// Start the thread in this workspace (name or id)
        #[arg(short, long)]
        workspace: Option<String>,
        /// Provider to use for a new thread
        #[arg(short, long)]
        provider: Option<String>,
        /// Model to use for a new thread
        #[arg(short, long)]
        model: Option<String>,
        /// System prompt for a new thread (defaults to config)
        #[arg(short, long, conflicts_with = "workspace")]
        system: Option<String>,
    },
    /// List available models
    Models {
        /// Only list this provider
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// Manage chat threads
    Threads {
        #[command(subcommand)]
        action: ThreadAction,
    },
    /// Manage workspaces
    Workspaces {
        #[command(subcommand)]
        action: WorkspaceAction,
    },
    /// Manage saved prompts
    Prompts {
        #[command(subcommand)]
        action: PromptAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current config with API keys masked
    Show,
}

/// Subcommands for the `threads` command.
#[derive(Subcommand)]
pub enum ThreadAction {
    /// List all threads
    List {
        /// Only threads in this workspace (name or id)
        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Delete a thread by id (supports partial ids)
    Delete { id: String },
}

/// Subcommands for the `workspaces` command.
#[derive(Subcommand)]
pub enum WorkspaceAction {
    /// List workspaces with their thread counts
    List,
    /// Create a workspace
    Create {
        name: String,
        /// Workspace system prompt (defaults to config)
        #[arg(short, long)]
        system: Option<String>,
        /// Default provider for new threads
        #[arg(short, long)]
        provider: Option<String>,
        /// Default model for new threads, optionally as provider/model
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Show a workspace and its threads
    Show { name: String },
    /// Change a workspace's name, system prompt or default model
    Update {
        name: String,
        /// New name
        #[arg(long, value_name = "NAME")]
        rename: Option<String>,
        #[arg(short, long)]
        system: Option<String>,
        #[arg(short, long)]
        provider: Option<String>,
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Delete a workspace and its threads
    Delete { name: String },
}

/// Subcommands for the `prompts` command.
#[derive(Subcommand)]
pub enum PromptAction {
    /// List saved prompts
    List,
    /// Show a saved prompt and its last response
    Show { title: String },
    /// Delete a saved prompt
    Delete { title: String },
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

fn build_dispatcher(config: &Config, registry: ProviderRegistry) -> Dispatcher {
    Dispatcher::new(
        registry,
        Arc::new(config.credentials()),
        Arc::new(ReqwestTransport::new()),
    )
}

/// Sampling settings for a selection: flags first, then config.
fn model_config(
    selection: &ModelSelection,
    config: &Config,
    sampling: &SamplingArgs,
) -> ModelConfig {
    ModelConfig {
        provider: selection.provider,
        model: selection.model.clone(),
        temperature: sampling.temperature.unwrap_or(config.temperature()),
        max_tokens: sampling.max_tokens.unwrap_or(config.max_tokens()),
    }
}

fn response_format(config: &Config, sampling: &SamplingArgs) -> ResponseFormat {
    if sampling.json {
        ResponseFormat::Json
    } else {
        config.response_format()
    }
}

fn joined_prompt(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

/// Reports a failed call and exits non-zero.
fn fail(err: &DispatchError) -> ! {
    output::print_error(err);
    std::process::exit(1)
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ask {
            prompt,
            system,
            provider: provider_name,
            model,
            sampling,
            save,
        } => {
            let prompt = joined_prompt(&prompt);
            if prompt.is_empty() {
                anyhow::bail!("No prompt provided. Usage: promptbench ask \"your question here\"");
            }

            let config = Config::load()?;
            let registry = config.registry();
            let selection = provider::resolve_model(
                provider_name.as_deref(),
                model.as_deref(),
                &config,
                &registry,
            )?;
            let state = PromptState {
                system_prompt: system
                    .or_else(|| config.system_prompt().map(String::from))
                    .unwrap_or_default(),
                user_prompt: prompt,
                response_format: response_format(&config, &sampling),
                model_config: model_config(&selection, &config, &sampling),
            };
            let dispatcher = build_dispatcher(&config, registry);

            println!(
                "{} [model: {}/{}]",
                "promptbench".bold().cyan(),
                selection.provider.to_string().yellow(),
                selection.model.yellow(),
            );
            println!();

            let response = match dispatcher.send_prompt(&state).await {
                Ok(response) => response,
                Err(err) => fail(&err),
            };
            output::print_response(&response);

            if let Some(title) = save {
                let library = PromptLibrary::default_location()?;
                let saved = library.save(&title, &state, Some(&response))?;
                println!("{} {}", "saved as".green(), saved.title.bold());
            }
            Ok(())
        }
        Commands::Compare {
            prompt,
            targets,
            saved,
            system,
            sampling,
        } => {
            let config = Config::load()?;
            let registry = config.registry();
            let selection = provider::resolve_model(None, None, &config, &registry)?;
            let defaults = PromptState {
                system_prompt: system
                    .clone()
                    .or_else(|| config.system_prompt().map(String::from))
                    .unwrap_or_default(),
                user_prompt: joined_prompt(&prompt),
                response_format: response_format(&config, &sampling),
                model_config: model_config(&selection, &config, &sampling),
            };

            let mut targets = targets;
            let state = match saved {
                Some(key) => {
                    let library = PromptLibrary::default_location()?;
                    let saved = prompts::find(&library, &key)?;
                    if targets.is_empty() {
                        targets.push(format!("{}/{}", saved.provider, saved.model));
                    }
                    let mut state = saved.to_prompt_state(&defaults);
                    if let Some(system) = system {
                        state.system_prompt = system;
                    }
                    if !defaults.user_prompt.is_empty() {
                        state.user_prompt = defaults.user_prompt.clone();
                    }
                    state
                }
                None => defaults,
            };
            anyhow::ensure!(
                !state.user_prompt.is_empty(),
                "No prompt provided. Usage: {}",
                "promptbench compare -t openai/gpt-4o -t grok/grok-3 \"your prompt\""
            );

            let dispatcher = build_dispatcher(&config, registry);
            compare::run_compare(&dispatcher, &state, &targets).await
        }
        Commands::Chat {
            thread,
            workspace,
            provider: provider_name,
            model,
            system,
        } => {
            let config = Config::load()?;
            let registry = config.registry();
            let store = ThreadStore::default_location()?;
            let workspaces = WorkspaceStore::default_location()?;
            let thread = match (thread, workspace) {
                (Some(id), _) => {
                    let mut thread = store.load(&id)?;
                    if let Some(owner) = thread.meta.workspace_id.clone() {
                        if let Some(ws) = workspaces.find(&owner)? {
                            thread.follow_workspace(&ws);
                        }
                    }
                    thread
                }
                (None, Some(key)) => {
                    let ws = workspaces.get(&key)?;
                    let target = workspaces::override_target(
                        ws.target(),
                        provider_name.as_deref(),
                        model.as_deref(),
                        &registry,
                    )?;
                    let mut thread = store.create_in(&ws);
                    store.switch_model(&mut thread, target.provider, &target.model)?;
                    thread
                }
                (None, None) => {
                    let selection = provider::resolve_model(
                        provider_name.as_deref(),
                        model.as_deref(),
                        &config,
                        &registry,
                    )?;
                    let system = system.as_deref().or(config.system_prompt());
                    store.create(selection.provider, &selection.model, system)
                }
            };
            let sampling = ModelConfig {
                provider: thread.meta.provider,
                model: thread.meta.model.clone(),
                temperature: config.temperature(),
                max_tokens: config.max_tokens(),
            };
            let dispatcher = build_dispatcher(&config, registry);
            chat::run_chat(&dispatcher, &store, &workspaces, thread, sampling).await
        }
        Commands::Models {
            provider: provider_name,
        } => {
            let config = Config::load()?;
            let registry = config.registry();
            let filter = provider_name.as_deref().map(str::parse::<ProviderKind>).transpose()?;
            let current = provider::resolve_model(None, None, &config, &registry)?;
            let dispatcher = build_dispatcher(&config, registry);
            provider::list_models(&dispatcher, filter, Some(&current.model)).await
        }
        Commands::Threads { action } => threads::handle_threads(action),
        Commands::Workspaces { action } => workspaces::handle_workspaces(action),
        Commands::Prompts { action } => prompts::handle_prompts(action),
        Commands::Config { action } => {
            let config = Config::load()?;
            match action {
                ConfigAction::Show => {
                    let path = Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    println!("{}", config.to_redacted_toml()?);
                }
            }
            Ok(())
        }
    }
}
