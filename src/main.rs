//! gpr-hub - An interactive command-line hub for GPR imagery and AI chat.
//!
//! Load a radar image and view it as a grayscale intensity plot, chat with
//! Groq or Gemini about it, and reach the usual collaborators (release
//! check, repository, ML determiner website) from one menu.

mod chat;
mod colors;
mod commands;
mod config;
mod console;
mod dispatcher;
mod launcher;
mod radar;
mod update;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command as ProcessCommand;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gpr-hub")]
#[command(author, version, about = "Interactive hub for GPR imagery and AI chat")]
#[command(
    long_about = "Starts an interactive menu. Type 'commands' at the prompt to see everything the hub can do."
)]
struct Cli {
    /// Disable the banner animation and streaming delays
    #[arg(long)]
    plain: bool,

    /// Skip the release version check at startup
    #[arg(long)]
    skip_update_check: bool,

    /// Use an alternate config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open configuration file in $EDITOR
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gpr_hub=info".parse().unwrap())
                .add_directive("reqwest=warn".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config) => handle_config(),
        None => run_hub(cli).await,
    }
}

/// Run the interactive hub until the user exits.
async fn run_hub(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };

    let console = console::TermConsole::new(!cli.plain)?;
    let mut dispatcher = dispatcher::Dispatcher::new(console, config);
    dispatcher.startup(cli.skip_update_check).await;
    dispatcher.run().await
}

/// Handle the config subcommand.
fn handle_config() -> Result<()> {
    let config_path = config::Config::config_path()?;

    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Create default config if it doesn't exist
    if !config_path.exists() {
        let default_config = config::Config::default();
        default_config.save()?;
        println!("Created default config at {}", config_path.display());
    }

    // Open in editor
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = ProcessCommand::new(&editor)
        .arg(&config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        eprintln!("Editor exited with non-zero status");
    }

    Ok(())
}
