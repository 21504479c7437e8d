//! State types for tracking extraction progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::types::TimestampMs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete persisted state: one watermark per partition key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Per-partition cursors, keyed by `Partition::key()`
    #[serde(default)]
    pub partitions: HashMap<String, PartitionCursor>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the persisted watermark for a partition key
    ///
    /// An entry that only records the completed flag has no watermark yet.
    pub fn get_cursor(&self, key: &str) -> Option<TimestampMs> {
        self.partitions
            .get(key)
            .filter(|p| p.initialized)
            .map(|p| p.cursor)
    }

    /// Advance the watermark for a partition key
    ///
    /// Never moves backward: a value at or below the stored one is ignored
    /// and `false` is returned.
    pub fn advance_cursor(&mut self, key: &str, cursor: TimestampMs) -> bool {
        let entry = self.partitions.entry(key.to_string()).or_default();
        match entry.initialized {
            true if cursor <= entry.cursor => false,
            _ => {
                entry.cursor = cursor;
                entry.initialized = true;
                true
            }
        }
    }

    /// Mark a partition as fully caught up in its last run
    pub fn mark_completed(&mut self, key: &str) {
        self.partitions.entry(key.to_string()).or_default().completed = true;
    }

    /// Whether a partition completed cleanly in a prior run
    pub fn is_completed(&self, key: &str) -> bool {
        self.partitions.get(key).is_some_and(|p| p.completed)
    }
}

/// Watermark for a single partition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartitionCursor {
    /// Last confirmed timestamp (ms since epoch)
    #[serde(default)]
    pub cursor: TimestampMs,

    /// Whether a cursor value has ever been written
    ///
    /// Distinguishes "no data yet" from a genuine cursor of zero.
    #[serde(default)]
    pub initialized: bool,

    /// Whether the last run finished this partition cleanly
    #[serde(default)]
    pub completed: bool,
}
