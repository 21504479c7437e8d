//! The emitted record shape
//!
//! One candle projected into the output stream together with the fields
//! identifying its partition. The primary key downstream is
//! `(exchange, base, quote, timeframe, timestamp)`; emission is
//! at-least-once, so sinks must tolerate replays of up to one checkpoint
//! interval after a crash.

use crate::exchange::Candle;
use crate::partition::Partition;
use crate::types::{Timeframe, TimestampMs};
use serde::{Deserialize, Serialize};

/// A normalized output record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleRecord {
    pub exchange: String,
    pub base: String,
    pub quote: String,
    pub timeframe: Timeframe,
    /// Event time in ms since epoch, the replication key
    pub timestamp: TimestampMs,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl CandleRecord {
    /// Project a raw candle into the output shape for its partition
    pub fn normalize(partition: &Partition, candle: &Candle) -> Self {
        Self {
            exchange: partition.exchange.clone(),
            base: partition.base.clone(),
            quote: partition.quote.clone(),
            timeframe: partition.timeframe.clone(),
            timestamp: candle.timestamp,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        }
    }
}
