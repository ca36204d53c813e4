//! Wayfinder CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize config & session directory
//! - `chat`    — Interactive travel chat or single-message mode
//! - `inspect` — Dump the decision pipeline's output for one utterance

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "wayfinder",
    about = "Wayfinder — context-aware travel assistant",
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
    /// Initialize configuration and the session directory
    Onboard,

    /// Chat with the travel assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Resume a named session (the file backend keeps it across runs)
        #[arg(short, long, env = "WAYFINDER_SESSION")]
        session: Option<String>,
    },

    /// Run one utterance through the decision pipeline, no model required
    Inspect {
        /// The utterance to classify and score
        utterance: String,
    },
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
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { message, session } => commands::chat::run(message, session).await?,
        Commands::Inspect { utterance } => commands::inspect::run(&utterance).await?,
    }

    Ok(())
}
