//! Common types used throughout candlesync
//!
//! Shared scalar types: millisecond timestamps, validated timeframes,
//! and the backoff strategy enum used by the pagination engine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// Event time in milliseconds since the Unix epoch
pub type TimestampMs = i64;

/// One day in milliseconds, the default stall skip interval
pub const ONE_DAY_MS: i64 = 1000 * 60 * 60 * 24;

// ============================================================================
// Timeframe
// ============================================================================

/// A validated candle timeframe (ccxt-style: `1m`, `15m`, `1h`, `1d`, ...)
///
/// The string form is the canonical representation; it is what gets sent
/// to exchange APIs and stored in partition keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe {
    value: String,
    duration_ms: i64,
}

impl Timeframe {
    /// Parse and validate a timeframe string
    pub fn parse(value: &str) -> Result<Self> {
        // Split on a char boundary; the unit may be any UTF-8 character
        let Some((unit_idx, unit)) = value.char_indices().last() else {
            return Err(Error::InvalidTimeframe {
                value: value.to_string(),
            });
        };
        let digits = &value[..unit_idx];

        let count: i64 = digits.parse().map_err(|_| Error::InvalidTimeframe {
            value: value.to_string(),
        })?;
        if count <= 0 {
            return Err(Error::InvalidTimeframe {
                value: value.to_string(),
            });
        }

        let unit_ms = match unit {
            's' => 1000,
            'm' => 1000 * 60,
            'h' => 1000 * 60 * 60,
            'd' => ONE_DAY_MS,
            'w' => ONE_DAY_MS * 7,
            // Calendar months are irregular; 30 days is close enough for
            // pagination arithmetic, which never relies on exact bucket width.
            'M' => ONE_DAY_MS * 30,
            _ => {
                return Err(Error::InvalidTimeframe {
                    value: value.to_string(),
                })
            }
        };

        Ok(Self {
            value: value.to_string(),
            duration_ms: count * unit_ms,
        })
    }

    /// The canonical string form (`1m`, `1h`, ...)
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Approximate bucket width in milliseconds
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Timeframe {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.value
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy for transient-error retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Fixed delay between attempts
    Constant,
    /// Delay grows linearly with the attempt number
    Linear,
    /// Delay doubles each attempt
    #[default]
    Exponential,
}
