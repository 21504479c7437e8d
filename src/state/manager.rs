//! State manager implementation
//!
//! File-based cursor persistence with atomic writes. Clones share the same
//! in-memory state, so every partition task checkpoints through one store;
//! the inner lock serializes concurrent writes for different partitions.
//! Writes for the same partition are already sequential by construction:
//! each partition owns its cursor exclusively for the run's duration.

use super::types::State;
use crate::error::{Error, Result};
use crate::partition::Partition;
use crate::types::TimestampMs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cursor store for loading and checkpointing partition watermarks
#[derive(Debug)]
pub struct StateManager {
    /// Path to the state file (empty in in-memory mode)
    path: PathBuf,
    /// Current state (shared across clones)
    state: Arc<RwLock<State>>,
    #[cfg(test)]
    fail_saves: Arc<std::sync::atomic::AtomicU32>,
}

impl StateManager {
    /// Create an in-memory store (no file persistence, used in tests)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(State::new())),
            #[cfg(test)]
            fail_saves: Arc::default(),
        }
    }

    /// Create a store backed by a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| Error::State {
                message: format!("Failed to read state file: {e}"),
            })?;
            serde_json::from_str(&contents).map_err(|e| Error::State {
                message: format!("Failed to parse state file: {e}"),
            })?
        } else {
            State::new()
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
            #[cfg(test)]
            fail_saves: Arc::default(),
        })
    }

    /// Resume point for a partition
    ///
    /// The later of the persisted watermark and the configured start. Also
    /// reports whether a watermark existed: a resumed cursor marks its own
    /// timestamp as already emitted, a fresh start does not.
    pub async fn load_cursor(&self, partition: &Partition) -> (TimestampMs, bool) {
        let state = self.state.read().await;
        match state.get_cursor(&partition.key()) {
            Some(persisted) if persisted >= partition.start_ms => (persisted, true),
            _ => (partition.start_ms, false),
        }
    }

    /// Durably record a partition's cursor
    ///
    /// Monotonic: a value at or below the persisted watermark leaves it
    /// untouched (the write is still performed so repeated calls are safe).
    /// Returns only after the state file write succeeded, so a candle is
    /// not considered confirmed until its checkpoint is on disk.
    pub async fn checkpoint(&self, partition: &Partition, cursor: TimestampMs) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.advance_cursor(&partition.key(), cursor);
        }
        self.save().await
    }

    /// Record clean completion of a partition
    pub async fn mark_completed(&self, partition: &Partition) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.mark_completed(&partition.key());
        }
        self.save().await
    }

    /// Persisted watermark for a partition, if any
    pub async fn get_cursor(&self, partition: &Partition) -> Option<TimestampMs> {
        self.state.read().await.get_cursor(&partition.key())
    }

    /// Snapshot of the full state
    pub async fn snapshot(&self) -> State {
        self.state.read().await.clone()
    }

    /// Export state as pretty-printed JSON
    pub async fn to_json_pretty(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string_pretty(&*state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })
    }

    /// Save current state to file
    async fn save(&self) -> Result<()> {
        #[cfg(test)]
        if self
            .fail_saves
            .fetch_update(
                std::sync::atomic::Ordering::SeqCst,
                std::sync::atomic::Ordering::SeqCst,
                |n| n.checked_sub(1),
            )
            .is_ok()
        {
            return Err(Error::checkpoint("injected failure"));
        }

        if self.path.as_os_str().is_empty() {
            return Ok(()); // In-memory mode
        }

        let state = self.state.read().await;
        let contents = serde_json::to_string_pretty(&*state).map_err(|e| Error::Checkpoint {
            message: format!("Failed to serialize state: {e}"),
        })?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::Checkpoint {
                message: format!("Failed to write state file: {e}"),
            })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::Checkpoint {
                message: format!("Failed to rename state file: {e}"),
            })?;

        Ok(())
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    /// Make the next `n` checkpoint writes fail
    #[cfg(test)]
    pub(crate) fn inject_save_failures(&self, n: u32) {
        self.fail_saves.store(n, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
            #[cfg(test)]
            fail_saves: Arc::clone(&self.fail_saves),
        }
    }
}
