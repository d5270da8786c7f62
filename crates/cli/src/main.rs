//! Ferrule CLI: the main entry point.
//!
//! Commands:
//! - `agent`    Interactive chat or single-message mode
//! - `onboard`  Write the default config file
//! - `history`  Print the saved conversation

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ferrule",
    about = "Ferrule: a terminal AI agent that can search, read and edit files",
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
    /// Chat with the agent
    Agent {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Conversation file to resume and save (overrides the config)
        #[arg(long, env = "FERRULE_CONVERSATION_FILE")]
        conversation: Option<PathBuf>,
    },

    /// Initialize the configuration file
    Onboard,

    /// Print the saved conversation
    History {
        /// Conversation file to read (overrides the config)
        #[arg(long, env = "FERRULE_CONVERSATION_FILE")]
        conversation: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with replies on stdout.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Agent {
            message,
            conversation,
        } => commands::agent::run(message, conversation).await?,
        Commands::Onboard => commands::onboard::run()?,
        Commands::History { conversation } => commands::history::run(conversation)?,
    }

    Ok(())
}
