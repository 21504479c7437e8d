//! Tests for StateManager

use super::*;
use crate::partition::Partition;
use crate::types::Timeframe;
use tempfile::tempdir;

fn test_partition(start_ms: i64) -> Partition {
    Partition {
        exchange: "binance".to_string(),
        base: "BTC".to_string(),
        quote: "USDT".to_string(),
        timeframe: Timeframe::parse("1h").unwrap(),
        start_ms,
    }
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_in_memory_manager() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[test]
fn test_from_file_missing_starts_empty() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("state.json")).unwrap();
    assert!(!manager.is_in_memory());
}

#[test]
fn test_from_file_rejects_corrupt_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(StateManager::from_file(&path).is_err());
}

// ============================================================================
// Load Cursor Tests
// ============================================================================

#[tokio::test]
async fn test_load_cursor_fresh_partition_uses_start() {
    let manager = StateManager::in_memory();
    let partition = test_partition(1_000);

    let (cursor, resumed) = manager.load_cursor(&partition).await;
    assert_eq!(cursor, 1_000);
    assert!(!resumed);
}

#[tokio::test]
async fn test_load_cursor_prefers_later_watermark() {
    let manager = StateManager::in_memory();
    let partition = test_partition(1_000);

    manager.checkpoint(&partition, 5_000).await.unwrap();

    let (cursor, resumed) = manager.load_cursor(&partition).await;
    assert_eq!(cursor, 5_000);
    assert!(resumed);
}

#[tokio::test]
async fn test_load_cursor_ignores_watermark_before_start() {
    let manager = StateManager::in_memory();
    let partition = test_partition(10_000);

    // Watermark from an older config with an earlier start
    manager.checkpoint(&partition, 5_000).await.unwrap();

    let (cursor, resumed) = manager.load_cursor(&partition).await;
    assert_eq!(cursor, 10_000);
    assert!(!resumed);
}

// ============================================================================
// Checkpoint Tests
// ============================================================================

#[tokio::test]
async fn test_checkpoint_monotonic() {
    let manager = StateManager::in_memory();
    let partition = test_partition(0);

    manager.checkpoint(&partition, 5_000).await.unwrap();
    // A stale lower value must never win
    manager.checkpoint(&partition, 3_000).await.unwrap();
    assert_eq!(manager.get_cursor(&partition).await, Some(5_000));

    manager.checkpoint(&partition, 6_000).await.unwrap();
    assert_eq!(manager.get_cursor(&partition).await, Some(6_000));
}

#[tokio::test]
async fn test_checkpoint_repeated_calls_safe() {
    let manager = StateManager::in_memory();
    let partition = test_partition(0);

    for _ in 0..3 {
        manager.checkpoint(&partition, 5_000).await.unwrap();
    }
    assert_eq!(manager.get_cursor(&partition).await, Some(5_000));
}

#[tokio::test]
async fn test_checkpoint_persists_across_managers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let partition = test_partition(0);

    {
        let manager = StateManager::from_file(&path).unwrap();
        manager.checkpoint(&partition, 42_000).await.unwrap();
        manager.mark_completed(&partition).await.unwrap();
    }

    // A fresh manager (a later run) observes the checkpoint
    let manager = StateManager::from_file(&path).unwrap();
    let (cursor, resumed) = manager.load_cursor(&partition).await;
    assert_eq!(cursor, 42_000);
    assert!(resumed);
    assert!(manager.snapshot().await.is_completed(&partition.key()));
}

#[tokio::test]
async fn test_checkpoint_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let manager = StateManager::from_file(&path).unwrap();

    manager.checkpoint(&test_partition(0), 1_000).await.unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());
}

#[tokio::test]
async fn test_injected_save_failure_is_checkpoint_error() {
    let manager = StateManager::in_memory();
    let partition = test_partition(0);

    manager.inject_save_failures(1);
    let err = manager.checkpoint(&partition, 1_000).await.unwrap_err();
    assert!(err.is_retryable());

    // Next attempt succeeds and the watermark survives
    manager.checkpoint(&partition, 1_000).await.unwrap();
    assert_eq!(manager.get_cursor(&partition).await, Some(1_000));
}

// ============================================================================
// Shared State Tests
// ============================================================================

#[tokio::test]
async fn test_clones_share_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();
    let partition = test_partition(0);

    manager.checkpoint(&partition, 9_000).await.unwrap();
    assert_eq!(clone.get_cursor(&partition).await, Some(9_000));
}

#[tokio::test]
async fn test_concurrent_checkpoints_different_partitions() {
    let manager = StateManager::in_memory();
    let a = test_partition(0);
    let mut b = test_partition(0);
    b.base = "ETH".to_string();

    let (ra, rb) = tokio::join!(
        manager.checkpoint(&a, 1_000),
        manager.checkpoint(&b, 2_000),
    );
    ra.unwrap();
    rb.unwrap();

    assert_eq!(manager.get_cursor(&a).await, Some(1_000));
    assert_eq!(manager.get_cursor(&b).await, Some(2_000));
}
