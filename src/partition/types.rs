//! Partition types
//!
//! The partition key must stay stable regardless of which configuration
//! shape produced it (bare symbol list or explicit pair objects), so cursor
//! state survives configuration-format changes.

use crate::types::{Timeframe, TimestampMs};
use serde::{Deserialize, Serialize};

/// One independent extraction unit
///
/// Immutable once enumerated for a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    /// Exchange identifier
    pub exchange: String,
    /// Base asset
    pub base: String,
    /// Quote asset
    pub quote: String,
    /// Candle timeframe
    pub timeframe: Timeframe,
    /// Configured start time (ms since epoch)
    pub start_ms: TimestampMs,
}

impl Partition {
    /// Stable state key for this partition
    ///
    /// The cursor store is keyed by this string. `start_ms` is deliberately
    /// excluded: moving the configured start must not orphan an existing
    /// watermark.
    pub fn key(&self) -> String {
        format!(
            "{}:{}/{}:{}",
            self.exchange, self.base, self.quote, self.timeframe
        )
    }

    /// The `BASE/QUOTE` symbol string used in fetch calls
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}
