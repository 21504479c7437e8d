//! Deterministic exchange client for tests
//!
//! Plays back a scripted sequence of batches and failures, one step per
//! fetch call, then returns empty batches forever. Records every `since`
//! value it was called with so tests can assert on resume behavior.

use super::client::{Candle, ExchangeClient};
use crate::error::{Error, Result};
use crate::types::{Timeframe, TimestampMs};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One step of a scripted fetch sequence
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this batch
    Batch(Vec<Candle>),
    /// Fail with a retryable error
    Transient,
    /// Fail with a fatal unsupported-symbol error
    Unsupported,
}

/// Scripted exchange client
pub struct ScriptedExchange {
    id: String,
    script: Mutex<VecDeque<ScriptStep>>,
    calls: Mutex<Vec<TimestampMs>>,
}

impl ScriptedExchange {
    /// Create a scripted client for the given exchange id
    pub fn new(id: impl Into<String>, script: Vec<ScriptStep>) -> Self {
        Self {
            id: id.into(),
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Build a candle with a fixed price shape, varying only the timestamp
    pub fn candle(timestamp: TimestampMs) -> Candle {
        Candle {
            timestamp,
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 42.0,
        }
    }

    /// Convenience: a batch step from bare timestamps
    pub fn batch(timestamps: &[TimestampMs]) -> ScriptStep {
        ScriptStep::Batch(timestamps.iter().copied().map(Self::candle).collect())
    }

    /// The `since` values of every fetch call so far, in order
    pub fn calls(&self) -> Vec<TimestampMs> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of fetch calls so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ExchangeClient for ScriptedExchange {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        _timeframe: &Timeframe,
        since_ms: TimestampMs,
    ) -> Result<Vec<Candle>> {
        self.calls.lock().unwrap().push(since_ms);

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(ScriptStep::Batch(candles)) => Ok(candles),
            Some(ScriptStep::Transient) => Err(Error::http_status(503, "scripted failure")),
            Some(ScriptStep::Unsupported) => Err(Error::unsupported_symbol(&self.id, symbol)),
            // Script exhausted: the exchange has nothing new
            None => Ok(Vec::new()),
        }
    }
}

impl std::fmt::Debug for ScriptedExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedExchange")
            .field("id", &self.id)
            .field("calls", &self.call_count())
            .finish()
    }
}
