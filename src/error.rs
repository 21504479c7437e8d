//! Error types for candlesync
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors fall into three operational classes:
//! - transient (network/rate-limit/5xx), retried by the pagination engine
//! - fatal per partition (unknown exchange, unsupported symbol, bad candle)
//! - fatal for the run (invalid configuration, state file corruption)

use thiserror::Error;

/// The main error type for candlesync
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors (fatal for the run)
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid timeframe: {value}")]
    InvalidTimeframe { value: String },

    // ============================================================================
    // Exchange Errors (fatal for one partition)
    // ============================================================================
    #[error("Unknown exchange: {id}")]
    UnknownExchange { id: String },

    #[error("Exchange '{exchange}' does not support symbol '{symbol}'")]
    UnsupportedSymbol { exchange: String, symbol: String },

    #[error("Malformed candle from exchange: {message}")]
    MalformedCandle { message: String },

    // ============================================================================
    // HTTP Errors (transient)
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded: {source}")]
    MaxRetriesExceeded {
        max_retries: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    #[error("Checkpoint failed: {message}")]
    Checkpoint { message: String },

    // ============================================================================
    // Partition Errors
    // ============================================================================
    #[error("Partition '{partition}' failed: {message}")]
    Partition { partition: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an unknown exchange error
    pub fn unknown_exchange(id: impl Into<String>) -> Self {
        Self::UnknownExchange { id: id.into() }
    }

    /// Create an unsupported symbol error
    pub fn unsupported_symbol(exchange: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::UnsupportedSymbol {
            exchange: exchange.into(),
            symbol: symbol.into(),
        }
    }

    /// Create a malformed candle error
    pub fn malformed_candle(message: impl Into<String>) -> Self {
        Self::MalformedCandle {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create a checkpoint error
    pub fn checkpoint(message: impl Into<String>) -> Self {
        Self::Checkpoint {
            message: message.into(),
        }
    }

    /// Create a partition error
    pub fn partition(partition: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Partition {
            partition: partition.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable by the pagination engine
    ///
    /// Checkpoint failures are transient: the cursor must not be considered
    /// confirmed until a checkpoint write succeeds, so the engine retries
    /// them like network errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_)
            | Error::RateLimited { .. }
            | Error::Timeout { .. }
            | Error::Checkpoint { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for candlesync
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("start_date");
        assert_eq!(err.to_string(), "Missing required config field: start_date");

        let err = Error::unknown_exchange("kraken");
        assert_eq!(err.to_string(), "Unknown exchange: kraken");

        let err = Error::unsupported_symbol("binance", "FOO/BAR");
        assert_eq!(
            err.to_string(),
            "Exchange 'binance' does not support symbol 'FOO/BAR'"
        );

        let err = Error::http_status(503, "unavailable");
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::checkpoint("disk full").is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(500, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::unknown_exchange("x").is_retryable());
        assert!(!Error::unsupported_symbol("binance", "FOO/BAR").is_retryable());
        assert!(!Error::config("test").is_retryable());
    }

    #[test]
    fn test_max_retries_keeps_source() {
        let err = Error::MaxRetriesExceeded {
            max_retries: 3,
            source: Box::new(Error::Timeout { timeout_ms: 5000 }),
        };
        assert!(err.to_string().contains("Max retries (3) exceeded"));
        assert!(!err.is_retryable());
    }
}
