//! Run configuration for the extractor
//!
//! Mirrors the external configuration contract: a list of exchanges, each
//! with credentials, a default timeframe, and a list of trading instruments
//! given either as bare `BASE/QUOTE` symbols or as explicit pair objects
//! with per-pair overrides.
//!
//! Loaded from YAML or JSON. Structural validation happens here; everything
//! that fails validation is fatal for the whole run before any partition
//! starts.

use crate::error::{Error, Result};
use crate::types::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Exchanges to extract from
    pub exchanges: Vec<ExchangeConfig>,

    /// Default start date for instruments without their own
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// Emit a checkpoint every this many records per partition
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Maximum number of partitions extracted concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_checkpoint_interval() -> usize {
    1000
}

fn default_concurrency() -> usize {
    4
}

// ============================================================================
// Exchange Config
// ============================================================================

/// Configuration for a single exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Exchange identifier (e.g., "binance")
    pub id: String,

    /// Default timeframe for this exchange's instruments
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,

    /// API key (absent for public-only endpoints)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API secret
    #[serde(default)]
    pub secret: Option<String>,

    /// Instruments as bare `BASE/QUOTE` symbols
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Instruments as explicit pair objects with overrides
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
}

fn default_timeframe() -> Timeframe {
    Timeframe::parse("1m").expect("default timeframe is valid")
}

/// An explicitly configured trading pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    /// Base asset (e.g., "BTC")
    pub base: String,

    /// Quote asset (e.g., "USDT")
    pub quote: String,

    /// Timeframe override for this pair
    #[serde(default)]
    pub timeframe: Option<Timeframe>,

    /// Start date override for this pair
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

// ============================================================================
// Loading & Validation
// ============================================================================

impl ExtractorConfig {
    /// Load configuration from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&contents)?
        } else {
            serde_yaml::from_str(&contents)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation
    ///
    /// Checks that can be made without touching the network: at least one
    /// exchange, every exchange has at least one instrument, symbols are
    /// `BASE/QUOTE` shaped, and every instrument has an effective start date
    /// (its own or the top-level one).
    pub fn validate(&self) -> Result<()> {
        if self.exchanges.is_empty() {
            return Err(Error::missing_field("exchanges"));
        }
        if self.checkpoint_interval == 0 {
            return Err(Error::InvalidConfigValue {
                field: "checkpoint_interval".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.concurrency == 0 {
            return Err(Error::InvalidConfigValue {
                field: "concurrency".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        for exchange in &self.exchanges {
            if exchange.id.is_empty() {
                return Err(Error::missing_field("exchanges[].id"));
            }
            if exchange.symbols.is_empty() && exchange.pairs.is_empty() {
                return Err(Error::InvalidConfigValue {
                    field: format!("exchanges[{}]", exchange.id),
                    message: "needs at least one of 'symbols' or 'pairs'".to_string(),
                });
            }

            for symbol in &exchange.symbols {
                split_symbol(symbol)?;
            }

            for pair in &exchange.pairs {
                if pair.base.is_empty() || pair.quote.is_empty() {
                    return Err(Error::InvalidConfigValue {
                        field: format!("exchanges[{}].pairs", exchange.id),
                        message: "base and quote must be non-empty".to_string(),
                    });
                }
                if pair.start_date.is_none() && self.start_date.is_none() {
                    return Err(Error::InvalidConfigValue {
                        field: format!(
                            "exchanges[{}].pairs[{}/{}].start_date",
                            exchange.id, pair.base, pair.quote
                        ),
                        message: "no start_date here and no top-level start_date".to_string(),
                    });
                }
            }

            if !exchange.symbols.is_empty() && self.start_date.is_none() {
                return Err(Error::InvalidConfigValue {
                    field: format!("exchanges[{}].symbols", exchange.id),
                    message: "bare symbols require a top-level start_date".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Split a `BASE/QUOTE` symbol into its parts
pub fn split_symbol(symbol: &str) -> Result<(&str, &str)> {
    match symbol.split_once('/') {
        Some((base, quote)) if !base.is_empty() && !quote.is_empty() => Ok((base, quote)),
        _ => Err(Error::InvalidConfigValue {
            field: "symbols".to_string(),
            message: format!("'{symbol}' is not BASE/QUOTE shaped"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        r#"
start_date: "2021-01-01T00:00:00Z"
exchanges:
  - id: binance
    timeframe: 1h
    symbols: ["BTC/USDT", "ETH/USDT"]
"#
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = ExtractorConfig::from_yaml(minimal_yaml()).unwrap();
        assert_eq!(config.exchanges.len(), 1);
        assert_eq!(config.exchanges[0].id, "binance");
        assert_eq!(config.exchanges[0].timeframe.as_str(), "1h");
        assert_eq!(config.exchanges[0].symbols.len(), 2);
        assert_eq!(config.checkpoint_interval, 1000);
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_parse_pairs_with_overrides() {
        let yaml = r#"
exchanges:
  - id: binance
    timeframe: 1m
    pairs:
      - base: BTC
        quote: USDT
        timeframe: 5m
        start_date: "2020-06-01T00:00:00Z"
"#;
        let config = ExtractorConfig::from_yaml(yaml).unwrap();
        let pair = &config.exchanges[0].pairs[0];
        assert_eq!(pair.base, "BTC");
        assert_eq!(pair.timeframe.as_ref().unwrap().as_str(), "5m");
        assert!(pair.start_date.is_some());
    }

    #[test]
    fn test_rejects_no_exchanges() {
        let err = ExtractorConfig::from_yaml("exchanges: []").unwrap_err();
        assert!(err.to_string().contains("exchanges"));
    }

    #[test]
    fn test_rejects_exchange_without_instruments() {
        let yaml = r#"
start_date: "2021-01-01T00:00:00Z"
exchanges:
  - id: binance
"#;
        assert!(ExtractorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_rejects_malformed_symbol() {
        let yaml = r#"
start_date: "2021-01-01T00:00:00Z"
exchanges:
  - id: binance
    symbols: ["BTCUSDT"]
"#;
        assert!(ExtractorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_rejects_pair_without_any_start_date() {
        let yaml = r#"
exchanges:
  - id: binance
    pairs:
      - base: BTC
        quote: USDT
"#;
        let err = ExtractorConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn test_rejects_zero_checkpoint_interval() {
        let yaml = r#"
start_date: "2021-01-01T00:00:00Z"
checkpoint_interval: 0
exchanges:
  - id: binance
    symbols: ["BTC/USDT"]
"#;
        assert!(ExtractorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_split_symbol() {
        assert_eq!(split_symbol("BTC/USDT").unwrap(), ("BTC", "USDT"));
        assert!(split_symbol("BTCUSDT").is_err());
        assert!(split_symbol("/USDT").is_err());
        assert!(split_symbol("BTC/").is_err());
    }
}
