//! Record emitter and checkpoint scheduler
//!
//! Forwards normalized records to the sink and checkpoints the partition's
//! cursor every `checkpoint_interval` emissions, plus once more at
//! completion. A checkpoint write failure is transient: it is retried with
//! backoff before any further progress counts as confirmed. The retry loop
//! is not interruptible by shutdown, since cancellation must not skip a
//! pending checkpoint for data already emitted.

use super::types::EngineConfig;
use crate::error::{Error, Result};
use crate::output::{CandleRecord, RecordSink};
use crate::partition::Partition;
use crate::state::StateManager;
use crate::types::TimestampMs;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-partition emitter owned by one partition task
pub struct RecordEmitter {
    sink: Arc<dyn RecordSink>,
    state: StateManager,
    partition: Partition,
    config: EngineConfig,
    emitted: usize,
    since_checkpoint: usize,
    last_emitted: Option<TimestampMs>,
}

impl RecordEmitter {
    /// Create an emitter for one partition
    pub fn new(
        sink: Arc<dyn RecordSink>,
        state: StateManager,
        partition: Partition,
        config: EngineConfig,
    ) -> Self {
        Self {
            sink,
            state,
            partition,
            config,
            emitted: 0,
            since_checkpoint: 0,
            last_emitted: None,
        }
    }

    /// Forward one record and checkpoint if the interval is reached
    pub async fn emit(&mut self, record: CandleRecord) -> Result<()> {
        let timestamp = record.timestamp;
        self.sink.write(&record).await?;
        self.last_emitted = Some(timestamp);
        self.emitted += 1;
        self.since_checkpoint += 1;

        if self.since_checkpoint >= self.config.checkpoint_interval {
            self.checkpoint(timestamp).await?;
        }
        Ok(())
    }

    /// Final checkpoint at partition completion or controlled stop
    ///
    /// Writes regardless of the emission counter, so no confirmed progress
    /// is lost. Only emitted data counts as confirmed: with nothing emitted
    /// there is no watermark to record, and persisting the loop cursor
    /// would wrongly mark its timestamp as already delivered on resume.
    pub async fn finalize(&mut self) -> Result<()> {
        self.sink.flush().await?;
        match self.last_emitted {
            Some(last) => self.checkpoint(last).await,
            None => Ok(()),
        }
    }

    /// Best-effort final checkpoint on a failed partition
    ///
    /// Persists the last emitted timestamp so the next run replays as
    /// little as possible. Errors are logged, not propagated, because the
    /// partition's original failure takes precedence.
    pub async fn finalize_after_error(&mut self) {
        let Some(last) = self.last_emitted else {
            return;
        };
        if let Err(e) = self.checkpoint(last).await {
            warn!(
                partition = %self.partition.key(),
                error = %e,
                "could not checkpoint after partition failure"
            );
        }
    }

    /// Records emitted so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Checkpoint with transient-failure retry
    async fn checkpoint(&mut self, cursor: TimestampMs) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.state.checkpoint(&self.partition, cursor).await {
                Ok(()) => {
                    debug!(
                        partition = %self.partition.key(),
                        cursor,
                        emitted = self.emitted,
                        "checkpoint"
                    );
                    self.since_checkpoint = 0;
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        partition = %self.partition.key(),
                        attempt = attempt + 1,
                        max = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "checkpoint failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    return Err(Error::MaxRetriesExceeded {
                        max_retries: self.config.max_retries,
                        source: Box::new(e),
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }
}
