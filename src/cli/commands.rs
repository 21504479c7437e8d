//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Incremental OHLCV extraction for crypto exchanges
#[derive(Parser, Debug)]
#[command(name = "candlesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// State file (JSON); omitted means no persistence across runs
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract all configured partitions
    Run {
        /// Output file for NDJSON records (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stall handling: skip-ahead or exhaust
        #[arg(long, default_value = "skip-ahead")]
        stall_policy: String,

        /// Maximum retry attempts for transient failures
        #[arg(long, default_value = "5")]
        max_retries: u32,

        /// Override the config's checkpoint interval
        #[arg(long)]
        checkpoint_interval: Option<usize>,

        /// Override the config's concurrency limit
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// List the partitions the configuration expands to
    Partitions,

    /// Show the persisted cursor state
    State,

    /// Validate the configuration file
    Validate,
}
