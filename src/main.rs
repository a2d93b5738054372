use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use simulateai_badges::config::StateBackend;

mod cli;

#[derive(Parser)]
#[command(name = "simbadge")]
#[command(about = "SimulateAI badge tiers and deferred badge reveal")]
#[command(version)]
struct Cli {
    /// Path to the badge config (defaults to ~/.simulateai/badges.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding learner progress (defaults to ~/.simulateai/state)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Override the storage backend from the config
    #[arg(long, global = true, value_enum)]
    backend: Option<StateBackend>,

    /// Learner whose progress is used
    #[arg(short, long, global = true, default_value = "local")]
    learner: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default badge configuration
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// List categories and their badge tiers
    Tiers,

    /// Show the learner's progress
    Status {
        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Reset the learner's progress
    Reset {
        /// Only reset this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Run a session reading commands from stdin
    /// (complete <category> <scenario>, reflect <scenario>, expire <scenario>, status, end)
    Session,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = cli::Context {
        config_path: cli.config,
        state_dir: cli.state_dir,
        backend: cli.backend,
        learner: cli.learner,
    };

    match cli.command {
        Commands::Init { force } => cli::init::init_command(&ctx, force)?,
        Commands::Tiers => cli::tiers::tiers_command(&ctx)?,
        Commands::Status { category } => cli::status::status_command(&ctx, category.as_deref())?,
        Commands::Reset { category } => cli::reset::reset_command(&ctx, category.as_deref())?,
        Commands::Session => cli::session::session_command(&ctx)?,
    }

    Ok(())
}
