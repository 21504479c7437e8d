//! Partition module
//!
//! A partition is one independent unit of extraction: an (exchange, pair,
//! timeframe) combination with its effective start time. Partitions are
//! recomputed from configuration at the start of every run; only their
//! cursors outlive a run.
//!
//! # Overview
//!
//! The partition module provides:
//! - `Partition` - The normalized partition tuple and its stable state key
//! - `enumerate_partitions` - Config expansion into the flat partition set

mod enumerate;
mod types;

pub use enumerate::enumerate_partitions;
pub use types::Partition;

#[cfg(test)]
mod tests;
