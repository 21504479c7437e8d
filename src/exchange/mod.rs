//! Exchange module
//!
//! The boundary to remote exchange APIs. Everything the pagination engine
//! needs from an exchange is one capability: fetch a bounded batch of
//! candles for a symbol/timeframe starting at or after a given time.
//!
//! # Overview
//!
//! The exchange module provides:
//! - `Candle` - Raw OHLCV observation as returned by an exchange
//! - `ExchangeClient` - The fetch capability trait
//! - `ExchangeRegistry` - Immutable-after-init id -> client lookup
//! - `RestExchange` - Klines-style HTTP driver with per-handle throttling
//! - `ScriptedExchange` - Deterministic client for tests
//!
//! Drivers perform no retries; retry and backoff live entirely in the
//! pagination engine.

mod client;
mod registry;
mod rest;
mod scripted;

pub use client::{Candle, ExchangeClient};
pub use registry::ExchangeRegistry;
pub use rest::{RestExchange, RestExchangeConfig};
pub use scripted::{ScriptStep, ScriptedExchange};
