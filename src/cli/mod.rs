//! CLI module
//!
//! Command-line interface for running the extractor.
//!
//! # Commands
//!
//! - `run` - Extract all configured partitions
//! - `partitions` - List the partitions a config expands to
//! - `state` - Show the persisted cursor state
//! - `validate` - Validate a configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
