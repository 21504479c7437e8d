//! Partition enumeration
//!
//! Expands a validated configuration into the flat, ordered set of
//! partitions to extract. Pure function, no side effects.

use super::types::Partition;
use crate::config::{split_symbol, ExtractorConfig};
use crate::error::{Error, Result};
use crate::types::TimestampMs;
use chrono::{DateTime, Utc};

/// Expand configuration into one partition per (exchange, pair, timeframe)
///
/// Effective timeframe: pair-level override if present, else the exchange
/// default. Effective start: pair-level `start_date` if present, else the
/// top-level one. Validation guarantees one of the two exists.
pub fn enumerate_partitions(config: &ExtractorConfig) -> Result<Vec<Partition>> {
    let mut partitions = Vec::new();

    for exchange in &config.exchanges {
        for symbol in &exchange.symbols {
            let (base, quote) = split_symbol(symbol)?;
            partitions.push(Partition {
                exchange: exchange.id.clone(),
                base: base.to_string(),
                quote: quote.to_string(),
                timeframe: exchange.timeframe.clone(),
                start_ms: effective_start(None, config.start_date, &exchange.id, symbol)?,
            });
        }

        for pair in &exchange.pairs {
            partitions.push(Partition {
                exchange: exchange.id.clone(),
                base: pair.base.clone(),
                quote: pair.quote.clone(),
                timeframe: pair
                    .timeframe
                    .clone()
                    .unwrap_or_else(|| exchange.timeframe.clone()),
                start_ms: effective_start(
                    pair.start_date,
                    config.start_date,
                    &exchange.id,
                    &format!("{}/{}", pair.base, pair.quote),
                )?,
            });
        }
    }

    Ok(partitions)
}

fn effective_start(
    pair_start: Option<DateTime<Utc>>,
    global_start: Option<DateTime<Utc>>,
    exchange: &str,
    symbol: &str,
) -> Result<TimestampMs> {
    pair_start
        .or(global_start)
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| Error::InvalidConfigValue {
            field: format!("{exchange}:{symbol}"),
            message: "no effective start_date".to_string(),
        })
}
