//! Tests for the partition module

use super::*;
use crate::config::ExtractorConfig;
use crate::types::Timeframe;
use pretty_assertions::assert_eq;

fn partition(exchange: &str, base: &str, quote: &str, timeframe: &str) -> Partition {
    Partition {
        exchange: exchange.to_string(),
        base: base.to_string(),
        quote: quote.to_string(),
        timeframe: Timeframe::parse(timeframe).unwrap(),
        start_ms: 0,
    }
}

// ============================================================================
// Partition Key Tests
// ============================================================================

#[test]
fn test_partition_key_format() {
    let p = partition("binance", "BTC", "USDT", "1h");
    assert_eq!(p.key(), "binance:BTC/USDT:1h");
    assert_eq!(p.symbol(), "BTC/USDT");
}

#[test]
fn test_partition_key_ignores_start() {
    let mut a = partition("binance", "BTC", "USDT", "1h");
    let mut b = a.clone();
    a.start_ms = 1_000;
    b.start_ms = 2_000;
    // Same state key even if the configured start moved
    assert_eq!(a.key(), b.key());
}

#[test]
fn test_partition_key_stable_across_config_shapes() {
    // One exchange configured via bare symbols, the other via pair objects;
    // the same instrument must map to the same state key either way.
    let from_symbols = ExtractorConfig::from_yaml(
        r#"
start_date: "2021-01-01T00:00:00Z"
exchanges:
  - id: binance
    timeframe: 1h
    symbols: ["BTC/USDT"]
"#,
    )
    .unwrap();

    let from_pairs = ExtractorConfig::from_yaml(
        r#"
start_date: "2021-01-01T00:00:00Z"
exchanges:
  - id: binance
    timeframe: 1h
    pairs:
      - base: BTC
        quote: USDT
"#,
    )
    .unwrap();

    let a = enumerate_partitions(&from_symbols).unwrap();
    let b = enumerate_partitions(&from_pairs).unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert_eq!(a[0].key(), b[0].key());
}

// ============================================================================
// Enumeration Tests
// ============================================================================

#[test]
fn test_enumerate_expands_all_instruments() {
    let config = ExtractorConfig::from_yaml(
        r#"
start_date: "2021-01-01T00:00:00Z"
exchanges:
  - id: binance
    timeframe: 1h
    symbols: ["BTC/USDT", "ETH/USDT"]
  - id: mexc
    timeframe: 5m
    pairs:
      - base: SOL
        quote: USDT
"#,
    )
    .unwrap();

    let partitions = enumerate_partitions(&config).unwrap();
    assert_eq!(partitions.len(), 3);

    let keys: Vec<String> = partitions.iter().map(Partition::key).collect();
    assert_eq!(
        keys,
        vec![
            "binance:BTC/USDT:1h",
            "binance:ETH/USDT:1h",
            "mexc:SOL/USDT:5m",
        ]
    );
}

#[test]
fn test_enumerate_applies_overrides() {
    let config = ExtractorConfig::from_yaml(
        r#"
start_date: "2021-01-01T00:00:00Z"
exchanges:
  - id: binance
    timeframe: 1m
    pairs:
      - base: BTC
        quote: USDT
        timeframe: 1d
        start_date: "2020-01-01T00:00:00Z"
      - base: ETH
        quote: USDT
"#,
    )
    .unwrap();

    let partitions = enumerate_partitions(&config).unwrap();

    // Pair-level overrides win
    assert_eq!(partitions[0].timeframe.as_str(), "1d");
    assert_eq!(partitions[0].start_ms, 1_577_836_800_000); // 2020-01-01

    // Exchange default + top-level start_date otherwise
    assert_eq!(partitions[1].timeframe.as_str(), "1m");
    assert_eq!(partitions[1].start_ms, 1_609_459_200_000); // 2021-01-01
}

#[test]
fn test_enumerate_is_pure() {
    let config = ExtractorConfig::from_yaml(
        r#"
start_date: "2021-01-01T00:00:00Z"
exchanges:
  - id: binance
    symbols: ["BTC/USDT"]
"#,
    )
    .unwrap();

    let first = enumerate_partitions(&config).unwrap();
    let second = enumerate_partitions(&config).unwrap();
    assert_eq!(first, second);
}
