//! Entry point for promptbench, a terminal workbench for sending, comparing
//! and chatting with prompts across LLM providers.
//!
//! This binary loads environment variables, sets up logging, parses CLI
//! arguments via [`cli`], and dispatches to the appropriate subcommand handler.

mod chat;
mod cli;
mod compare;
mod config;
mod constants;
mod dispatch;
mod error;
mod library;
mod message;
mod models;
mod output;
mod prompt;
mod provider;
mod request;
mod response;
mod thread;
mod transport;
mod workspace;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

/// Logs go to stderr so they never mix with rendered responses.
/// Quiet by default; `RUST_LOG=promptbench=debug` shows each request.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the promptbench CLI.
///
/// Loads `.env` files (silently ignored if absent), parses command-line
/// arguments into a [`cli::Cli`] struct, and dispatches the chosen
/// subcommand via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = cli::parse();
    cli::run(cli).await
}
