//! # candlesync
//!
//! Incremental OHLCV candle extraction for crypto exchanges.
//!
//! Expands a declarative configuration into independent
//! (exchange, symbol, timeframe) partitions and drives each through a
//! paginated fetch loop with a monotonic time cursor, transient-failure
//! retries, stall detection, and periodic checkpointing so a run can be
//! interrupted and resumed without re-fetching confirmed data.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use candlesync::config::ExtractorConfig;
//! use candlesync::engine::PaginationEngine;
//! use candlesync::exchange::ExchangeRegistry;
//! use candlesync::output::JsonLinesSink;
//! use candlesync::partition::enumerate_partitions;
//! use candlesync::state::StateManager;
//! use candlesync::Result;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ExtractorConfig::from_file("config.yaml")?;
//!     let partitions = enumerate_partitions(&config)?;
//!     let registry = ExchangeRegistry::from_config(&config)?;
//!     let state = StateManager::from_file("state.json")?;
//!
//!     let engine = PaginationEngine::new(
//!         Arc::new(registry),
//!         state,
//!         Arc::new(JsonLinesSink::stdout()),
//!     );
//!     let stats = engine.run(partitions).await?;
//!     println!("emitted {} records", stats.records_total());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! config ──▶ partition enumeration ──▶ PaginationEngine
//!                                           │ per partition (bounded)
//!                        ┌──────────────────┼──────────────────┐
//!                        ▼                  ▼                  ▼
//!                 ExchangeClient      StateManager        RecordSink
//!                 (fetch + retry)     (checkpoints)       (NDJSON)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the extractor
pub mod error;

/// Common types and type aliases
pub mod types;

/// Run configuration
pub mod config;

/// Partition identity and enumeration
pub mod partition;

/// Exchange clients and registry
pub mod exchange;

/// Cursor state management and checkpointing
pub mod state;

/// Record normalization and sinks
pub mod output;

/// The pagination engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::{Timeframe, TimestampMs};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
