//! Output module
//!
//! The downstream side of the engine: the normalized record shape and the
//! sinks records are forwarded to.
//!
//! # Overview
//!
//! The output module provides:
//! - `CandleRecord` - The emitted record: partition identity + OHLCV
//! - `RecordSink` - Destination trait for emitted records
//! - `JsonLinesSink` - NDJSON writer (stdout or file)
//! - `VecSink` - In-memory sink for tests

mod record;
mod sink;

pub use record::CandleRecord;
pub use sink::{JsonLinesSink, RecordSink, VecSink};

#[cfg(test)]
mod tests;
