//! srvote CLI - plan Super Representative vote allocations offline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// srvote: distribute a wallet's votes across Super Representatives
#[derive(Parser)]
#[command(name = "srvote")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (JSON)
    #[arg(short, long, global = true, env = "SRVOTE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a sequence of vote inputs and show the resulting ballot
    Plan {
        /// Voting power in whole votes
        #[arg(short, long, conflicts_with = "frozen_sun")]
        balance: Option<u64>,

        /// Voting power as a frozen amount in sun
        #[arg(long)]
        frozen_sun: Option<u64>,

        /// Candidates file (JSON array); unknown ids are reported
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// Vote input as ID=VALUE; VALUE may be `+` or `-` for one step
        #[arg(short, long = "set", value_name = "ID=VALUE")]
        inputs: Vec<String>,

        /// Output format (json, human)
        #[arg(short, long, default_value = "human")]
        format: String,
    },

    /// Rank candidates by current votes
    Rank {
        /// Candidates file (JSON array)
        #[arg(long)]
        candidates: PathBuf,

        /// Only show candidates whose name or url contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Output format (json, human)
        #[arg(short, long, default_value = "human")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    if config.logging.json_output {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Plan {
            balance,
            frozen_sun,
            candidates,
            inputs,
            format,
        } => commands::plan::run(
            commands::plan::PlanArgs {
                balance,
                frozen_sun,
                candidates,
                inputs,
                format,
            },
            &config,
        ),
        Commands::Rank {
            candidates,
            search,
            format,
        } => commands::rank::run(candidates, &search, &format),
    }
}
