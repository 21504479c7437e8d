//! Tests for the output module

use super::*;
use crate::exchange::ScriptedExchange;
use crate::partition::Partition;
use crate::types::Timeframe;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn test_partition() -> Partition {
    Partition {
        exchange: "binance".to_string(),
        base: "BTC".to_string(),
        quote: "USDT".to_string(),
        timeframe: Timeframe::parse("1h").unwrap(),
        start_ms: 0,
    }
}

#[test]
fn test_normalize_carries_partition_identity() {
    let partition = test_partition();
    let candle = ScriptedExchange::candle(1_234);

    let record = CandleRecord::normalize(&partition, &candle);
    assert_eq!(record.exchange, "binance");
    assert_eq!(record.base, "BTC");
    assert_eq!(record.quote, "USDT");
    assert_eq!(record.timeframe.as_str(), "1h");
    assert_eq!(record.timestamp, 1_234);
    assert_eq!(record.open, candle.open);
    assert_eq!(record.volume, candle.volume);
}

#[test]
fn test_record_json_shape() {
    let record = CandleRecord::normalize(&test_partition(), &ScriptedExchange::candle(1_234));
    let json: serde_json::Value = serde_json::to_value(&record).unwrap();

    assert_eq!(json["exchange"], "binance");
    assert_eq!(json["timeframe"], "1h");
    assert_eq!(json["timestamp"], 1_234);
    assert_eq!(json["high"], 110.0);
}

#[tokio::test]
async fn test_vec_sink_collects_in_order() {
    let sink = VecSink::new();
    let partition = test_partition();

    for ts in [1_000, 2_000, 3_000] {
        sink.write(&CandleRecord::normalize(
            &partition,
            &ScriptedExchange::candle(ts),
        ))
        .await
        .unwrap();
    }

    assert_eq!(sink.len(), 3);
    assert_eq!(sink.timestamps(), vec![1_000, 2_000, 3_000]);
}

#[tokio::test]
async fn test_jsonl_sink_writes_one_line_per_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.jsonl");

    let sink = JsonLinesSink::create(&path).unwrap();
    let partition = test_partition();
    sink.write(&CandleRecord::normalize(
        &partition,
        &ScriptedExchange::candle(1_000),
    ))
    .await
    .unwrap();
    sink.write(&CandleRecord::normalize(
        &partition,
        &ScriptedExchange::candle(2_000),
    ))
    .await
    .unwrap();
    sink.flush().await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: CandleRecord = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.timestamp, 1_000);
    let second: CandleRecord = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second.timestamp, 2_000);
}
