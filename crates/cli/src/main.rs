//! WebPilot CLI — the main entry point.
//!
//! Commands:
//! - `run`    — Capture a task and drive the agent until it finishes
//! - `doctor` — Diagnose configuration and provider connectivity

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "webpilot",
    about = "WebPilot — LLM-driven browser task agent",
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
    /// Run a task through the agent
    Run {
        /// The task to perform (prompted for interactively when omitted)
        #[arg(short, long)]
        task: Option<String>,

        /// Bound the number of reasoning cycles
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Where to write the transcript on completion
        #[arg(long)]
        transcript: Option<PathBuf>,
    },

    /// Diagnose configuration and provider health
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            task,
            max_cycles,
            transcript,
        } => commands::run::run(task, max_cycles, transcript).await,
        Commands::Doctor => commands::doctor::run().await,
    }
}
