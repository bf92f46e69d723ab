//! DocChat CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize config & prompt library
//! - `chat`    — Converse about a document (interactive or single message)
//! - `check`   — Measure a document against the token budget
//! - `prompts` — Manage named system prompts
//! - `config`  — Show, locate or validate configuration
//! - `doctor`  — Diagnose setup

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "docchat",
    about = "DocChat — chat with a whole document under a fixed token budget",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the prompt library
    Onboard,

    /// Chat about a document
    Chat {
        /// Document to load (txt, md, csv, log, rst, pdf, docx)
        file: PathBuf,

        /// System prompt to use, by id or name
        #[arg(short, long)]
        prompt: Option<String>,

        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Count a document's tokens against the budget
    Check {
        file: PathBuf,

        /// Use the offline estimate instead of the configured model
        #[arg(long)]
        estimate: bool,
    },

    /// Manage system prompts
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Diagnose setup and connectivity
    Doctor,
}

#[derive(Subcommand)]
enum PromptsAction {
    /// List all prompts
    List,
    /// Add a prompt
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        text: String,
    },
    /// Delete a user prompt by id
    Delete { id: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            file,
            prompt,
            message,
        } => commands::chat::run(file, prompt, message).await?,
        Commands::Check { file, estimate } => commands::check::run(file, estimate).await?,
        Commands::Prompts { action } => match action {
            PromptsAction::List => commands::prompts::list().await?,
            PromptsAction::Add { name, text } => commands::prompts::add(&name, &text).await?,
            PromptsAction::Delete { id } => commands::prompts::delete(&id).await?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
