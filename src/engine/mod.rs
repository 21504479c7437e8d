//! Pagination engine module
//!
//! The core of the extractor: for each partition, drive a paginated fetch
//! loop against a rate-limited, occasionally-failing exchange API, advance
//! a monotonic cursor, detect and step over stalls, retry transient
//! failures with backoff, and checkpoint progress so extraction resumes
//! across runs without re-fetching confirmed data.
//!
//! # Overview
//!
//! The engine module provides:
//! - `PaginationEngine` - Per-partition fetch loop plus the concurrent
//!   multi-partition driver
//! - `EngineConfig` / `StallPolicy` - Tuning knobs
//! - `RecordEmitter` - Emission and checkpoint scheduling
//! - `Shutdown` / `ShutdownController` - Graceful-stop signaling

mod emitter;
mod types;

pub use emitter::RecordEmitter;
pub use types::{
    shutdown_channel, EngineConfig, PartitionOutcome, PartitionSummary, RunStats, Shutdown,
    ShutdownController, StallPolicy,
};

use crate::error::{Error, Result};
use crate::exchange::{Candle, ExchangeClient, ExchangeRegistry};
use crate::output::{CandleRecord, RecordSink};
use crate::partition::Partition;
use crate::state::StateManager;
use crate::types::TimestampMs;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Incremental multi-partition extraction engine
///
/// Partitions are independent: they share only the read-mostly exchange
/// registry, the cursor store, and the sink, all of which serialize their
/// own access. Each partition owns its cursor exclusively for the run.
pub struct PaginationEngine {
    registry: Arc<ExchangeRegistry>,
    state: StateManager,
    sink: Arc<dyn RecordSink>,
    config: EngineConfig,
    shutdown: Shutdown,
}

impl PaginationEngine {
    /// Create a new engine
    pub fn new(
        registry: Arc<ExchangeRegistry>,
        state: StateManager,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            registry,
            state,
            sink,
            config: EngineConfig::default(),
            shutdown: Shutdown::never(),
        }
    }

    /// Set engine configuration
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a shutdown handle
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Extract all partitions, bounded by the concurrency limit
    ///
    /// A failing partition aborts only itself; siblings keep running. The
    /// returned stats carry one summary per finished partition and one
    /// error per aborted partition.
    pub async fn run(&self, partitions: Vec<Partition>) -> Result<RunStats> {
        info!(
            partitions = partitions.len(),
            concurrency = self.config.concurrency,
            "starting extraction run"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut handles = Vec::with_capacity(partitions.len());

        for partition in partitions {
            let engine = self.clone();
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("run semaphore never closed");
                let key = partition.key();
                (key, engine.run_partition(&partition).await)
            }));
        }

        let mut stats = RunStats::default();
        for handle in handles {
            let (key, result) = handle
                .await
                .map_err(|e| Error::Other(format!("partition task panicked: {e}")))?;
            match result {
                Ok(summary) => stats.summaries.push(summary),
                Err(e) => {
                    warn!(partition = %key, error = %e, "partition aborted");
                    stats.failures.push((key, e));
                }
            }
        }

        self.sink.flush().await?;
        info!(
            records = stats.records_total(),
            finished = stats.summaries.len(),
            failed = stats.failures.len(),
            "extraction run complete"
        );
        Ok(stats)
    }

    /// Extract a single partition
    ///
    /// Loads the resume cursor, captures the end-of-run ceiling once, and
    /// pages forward until caught up, exhausted, or stopped. On failure the
    /// emitter checkpoints whatever was already confirmed, then the error
    /// propagates to the caller.
    pub async fn run_partition(&self, partition: &Partition) -> Result<PartitionSummary> {
        let client = self.registry.resolve(&partition.exchange)?;

        let mut emitter = RecordEmitter::new(
            Arc::clone(&self.sink),
            self.state.clone(),
            partition.clone(),
            self.config.clone(),
        );

        match self.paginate(client.as_ref(), partition, &mut emitter).await {
            Ok((outcome, final_cursor, pages_fetched)) => {
                emitter.finalize().await?;
                if matches!(
                    outcome,
                    PartitionOutcome::CaughtUp | PartitionOutcome::Exhausted
                ) {
                    self.state.mark_completed(partition).await?;
                }
                let summary = PartitionSummary {
                    partition: partition.key(),
                    records_emitted: emitter.emitted(),
                    pages_fetched,
                    final_cursor,
                    outcome,
                };
                info!(
                    partition = %summary.partition,
                    records = summary.records_emitted,
                    pages = summary.pages_fetched,
                    cursor = summary.final_cursor,
                    outcome = ?summary.outcome,
                    "partition finished"
                );
                Ok(summary)
            }
            Err(e) => {
                emitter.finalize_after_error().await;
                Err(e)
            }
        }
    }

    /// The pagination loop for one partition
    ///
    /// Two watermarks move through the loop:
    /// - `cursor` is the query position sent as `since`; it only ever moves
    ///   forward, including forced skips over gaps.
    /// - `floor` is the emission threshold; candles below it were already
    ///   emitted (this run or a prior one) and are dropped, which also
    ///   keeps out-of-order batches from breaking cursor advancement.
    async fn paginate(
        &self,
        client: &dyn ExchangeClient,
        partition: &Partition,
        emitter: &mut RecordEmitter,
    ) -> Result<(PartitionOutcome, TimestampMs, usize)> {
        let (mut cursor, resumed) = self.state.load_cursor(partition).await;
        let mut floor = if resumed { cursor + 1 } else { cursor };

        // Captured once: a moving wall-clock ceiling could chase continuously
        // arriving candles forever.
        let end = Utc::now().timestamp_millis();
        let symbol = partition.symbol();
        let mut pages = 0usize;

        debug!(
            partition = %partition.key(),
            cursor,
            resumed,
            end,
            "starting pagination"
        );

        while cursor < end {
            if self.shutdown.is_triggered() {
                return Ok((PartitionOutcome::Cancelled, cursor, pages));
            }

            let Some(batch) = self
                .fetch_with_retry(client, &symbol, partition, cursor)
                .await?
            else {
                return Ok((PartitionOutcome::Cancelled, cursor, pages));
            };
            pages += 1;

            let cursor_before = cursor;
            let mut prev_ts = None;
            for candle in &batch {
                candle.validate()?;
                if prev_ts.is_some_and(|prev| candle.timestamp < prev) {
                    warn!(
                        partition = %partition.key(),
                        timestamp = candle.timestamp,
                        "batch violates non-decreasing timestamp order"
                    );
                }
                prev_ts = Some(candle.timestamp);

                if candle.timestamp < floor {
                    continue;
                }
                emitter
                    .emit(CandleRecord::normalize(partition, candle))
                    .await?;
                floor = candle.timestamp + 1;
                if candle.timestamp > cursor {
                    cursor = candle.timestamp;
                }
            }

            // Stall: the whole batch moved the cursor nowhere
            if cursor == cursor_before {
                match self.config.stall_policy {
                    StallPolicy::Exhaust => {
                        debug!(partition = %partition.key(), cursor, "stalled, exhausting");
                        return Ok((PartitionOutcome::Exhausted, cursor, pages));
                    }
                    StallPolicy::SkipAhead { step_ms } => {
                        cursor += step_ms.max(1);
                        debug!(
                            partition = %partition.key(),
                            cursor,
                            "stalled, skipping ahead"
                        );
                    }
                }
            }
        }

        Ok((PartitionOutcome::CaughtUp, cursor, pages))
    }

    /// Fetch one batch, retrying transient failures with backoff
    ///
    /// Every retry reuses the same `since` value; the cursor never moves
    /// on failure. Returns `None` when shutdown interrupts the fetch or a
    /// backoff sleep; fatal errors and an exhausted retry budget propagate
    /// as errors.
    async fn fetch_with_retry(
        &self,
        client: &dyn ExchangeClient,
        symbol: &str,
        partition: &Partition,
        since: TimestampMs,
    ) -> Result<Option<Vec<Candle>>> {
        let mut shutdown = self.shutdown.clone();
        let mut attempt = 0;

        loop {
            let fetched = tokio::select! {
                biased;
                () = shutdown.triggered() => return Ok(None),
                result = client.fetch_ohlcv(symbol, &partition.timeframe, since) => result,
            };

            match fetched {
                Ok(batch) => return Ok(Some(batch)),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = match e {
                        // Honor the exchange's own pacing when it gave one
                        Error::RateLimited {
                            retry_after_seconds,
                        } => std::cmp::min(
                            std::time::Duration::from_secs(retry_after_seconds),
                            self.config.max_backoff,
                        ),
                        _ => self.config.backoff_delay(attempt),
                    };
                    warn!(
                        partition = %partition.key(),
                        since,
                        attempt = attempt + 1,
                        max = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "fetch failed, retrying"
                    );
                    tokio::select! {
                        biased;
                        () = shutdown.triggered() => return Ok(None),
                        () = tokio::time::sleep(delay) => {}
                    }
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

impl Clone for PaginationEngine {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            state: self.state.clone(),
            sink: Arc::clone(&self.sink),
            config: self.config.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}
