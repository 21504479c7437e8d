//! State management module
//!
//! Per-partition watermarks, checkpointing, and resumability. State is
//! persisted between runs so extraction resumes where it left off instead
//! of re-fetching already-seen data.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - The persisted map of partition key -> watermark
//! - `StateManager` - File-backed store with atomic writes and the
//!   monotonic-watermark guarantee

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{PartitionCursor, State};

#[cfg(test)]
mod manager_tests;
