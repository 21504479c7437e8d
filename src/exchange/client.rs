//! The fetch capability trait and the raw candle shape

use crate::error::{Error, Result};
use crate::types::{Timeframe, TimestampMs};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One raw OHLCV observation as returned by an exchange
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time, ms since epoch
    pub timestamp: TimestampMs,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Minimal shape validation
    ///
    /// The engine does not re-validate exchange data beyond what its own
    /// cursor logic depends on: a sane timestamp and finite numbers.
    pub fn validate(&self) -> Result<()> {
        if self.timestamp < 0 {
            return Err(Error::malformed_candle(format!(
                "negative timestamp {}",
                self.timestamp
            )));
        }
        let values = [self.open, self.high, self.low, self.close, self.volume];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::malformed_candle(format!(
                "non-finite value at timestamp {}",
                self.timestamp
            )));
        }
        Ok(())
    }
}

/// The single capability an exchange must expose
///
/// Contract: the returned batch is bounded in size and ordered by
/// non-decreasing timestamp, containing candles at or after `since_ms`.
/// An empty batch means the exchange has nothing at or after that time.
///
/// Implementations map their failures onto the crate error taxonomy:
/// transient errors (`is_retryable()`) for network/rate-limit/5xx problems,
/// `UnsupportedSymbol` for instruments the exchange does not list.
#[async_trait]
pub trait ExchangeClient: Send + Sync + std::fmt::Debug {
    /// The exchange identifier this client serves
    fn id(&self) -> &str;

    /// Fetch a bounded batch of candles starting at or after `since_ms`
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &Timeframe,
        since_ms: TimestampMs,
    ) -> Result<Vec<Candle>>;
}
