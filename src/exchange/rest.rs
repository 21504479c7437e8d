//! Klines-style REST driver
//!
//! Generic driver for exchanges exposing the Binance-compatible
//! `/api/v3/klines` endpoint shape (Binance, Binance.US, MEXC). Market-data
//! endpoints need no request signing; when an API key is configured it is
//! sent as a header, which lifts the exchange-side rate-limit tier.
//!
//! The driver applies its own minimum-interval throttle per handle, so the
//! engine can run several partitions of one exchange concurrently without
//! assuming unlimited calls against the shared handle. It performs no
//! retries: transient failures are classified and surfaced for the
//! pagination engine to retry.

use super::client::{Candle, ExchangeClient};
use crate::error::{Error, Result};
use crate::types::{Timeframe, TimestampMs};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for a REST exchange handle
#[derive(Debug, Clone)]
pub struct RestExchangeConfig {
    /// Exchange identifier
    pub id: String,
    /// API base URL
    pub base_url: String,
    /// Optional API key, sent as `X-MBX-APIKEY`
    pub api_key: Option<String>,
    /// Optional API secret (unused by public market-data endpoints)
    pub secret: Option<String>,
    /// Minimum interval between requests on this handle
    pub min_interval: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// Batch size requested per fetch
    pub limit: u32,
}

impl Default for RestExchangeConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            base_url: String::new(),
            api_key: None,
            secret: None,
            min_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(30),
            limit: 1000,
        }
    }
}

/// Shared HTTP client handle for one exchange
pub struct RestExchange {
    config: RestExchangeConfig,
    http: Client,
    throttle: Arc<DefaultDirectRateLimiter>,
}

impl RestExchange {
    /// Create a new handle
    pub fn new(config: RestExchangeConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("candlesync/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Http)?;

        let period = config.min_interval.max(Duration::from_millis(1));
        let quota = Quota::with_period(period).expect("non-zero throttle period");

        Ok(Self {
            config,
            http,
            throttle: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Map an HTTP error response onto the crate error taxonomy
    async fn classify_error(&self, symbol: &str, response: Response) -> Error {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = extract_retry_after(&response);
            return Error::RateLimited {
                retry_after_seconds: retry_after,
            };
        }

        let body = response.text().await.unwrap_or_default();

        // Binance-compatible APIs signal an unlisted instrument with
        // code -1121 on a 400, MEXC with a plain 404.
        if (status == StatusCode::BAD_REQUEST && body.contains("-1121"))
            || status == StatusCode::NOT_FOUND
        {
            return Error::unsupported_symbol(&self.config.id, symbol);
        }

        Error::http_status(status.as_u16(), body)
    }
}

#[async_trait]
impl ExchangeClient for RestExchange {
    fn id(&self) -> &str {
        &self.config.id
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &Timeframe,
        since_ms: TimestampMs,
    ) -> Result<Vec<Candle>> {
        self.throttle.until_ready().await;

        let url = format!("{}/api/v3/klines", self.config.base_url.trim_end_matches('/'));
        let market = symbol.replace('/', "");

        let mut request = self
            .http
            .get(&url)
            .query(&[("symbol", market.as_str()), ("interval", timeframe.as_str())])
            .query(&[("startTime", since_ms)])
            .query(&[("limit", self.config.limit)]);

        if let Some(ref key) = self.config.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                })
            }
            Err(e) => return Err(Error::Http(e)),
        };

        if !response.status().is_success() {
            return Err(self.classify_error(symbol, response).await);
        }

        let rows: Vec<Vec<Value>> = response.json().await.map_err(Error::Http)?;
        debug!(
            exchange = %self.config.id,
            %symbol,
            since_ms,
            rows = rows.len(),
            "fetched klines"
        );

        rows.iter().map(|row| parse_kline(row)).collect()
    }
}

impl std::fmt::Debug for RestExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestExchange")
            .field("id", &self.config.id)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// Parse one kline row: `[openTime, open, high, low, close, volume, ...]`
///
/// Prices and volume arrive as JSON strings on these APIs; numbers are
/// accepted too.
fn parse_kline(row: &[Value]) -> Result<Candle> {
    if row.len() < 6 {
        return Err(Error::malformed_candle(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let timestamp = row[0]
        .as_i64()
        .ok_or_else(|| Error::malformed_candle("open time is not an integer"))?;

    let candle = Candle {
        timestamp,
        open: parse_number(&row[1], "open")?,
        high: parse_number(&row[2], "high")?,
        low: parse_number(&row[3], "low")?,
        close: parse_number(&row[4], "close")?,
        volume: parse_number(&row[5], "volume")?,
    };
    candle.validate()?;
    Ok(candle)
}

fn parse_number(value: &Value, field: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::malformed_candle(format!("{field} is not representable as f64"))),
        Value::String(s) => s
            .parse()
            .map_err(|_| Error::malformed_candle(format!("{field} '{s}' is not a number"))),
        _ => Err(Error::malformed_candle(format!(
            "{field} is neither number nor string"
        ))),
    }
}

/// Extract retry-after header value, defaulting to 60s
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
