//! Wrapwright CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Pursue a goal with the agent
//! - `library`  — Show the wraps the agent can learn
//! - `onboard`  — Write a default config file

use clap::{Parser, Subcommand};

mod commands;
mod progress;
mod terminal;
mod transcript;

#[derive(Parser)]
#[command(
    name = "wrapwright",
    about = "Wrapwright — an LLM agent that learns and invokes wraps",
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
    /// Start the agent on a goal
    Run {
        /// What the agent should accomplish (asked for when omitted)
        goal: Option<String>,
    },

    /// Load and print the wrap library index
    Library,

    /// Write a default configuration file
    Onboard,
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
        Commands::Run { goal } => commands::run::run(goal).await?,
        Commands::Library => commands::library::run().await?,
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}
