//! Engine types
//!
//! Configuration, stall policy, shutdown signaling, and run statistics for
//! the pagination engine.

use crate::error::{Error, Result};
use crate::types::{BackoffType, TimestampMs, ONE_DAY_MS};
use rand::Rng;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::watch;

// ============================================================================
// Stall Policy
// ============================================================================

/// What to do when a fetch iteration makes no forward progress
///
/// Exchange data gaps are common (delisted or illiquid periods with no
/// trades), so a stall does not necessarily mean the partition is done.
/// Both policies guarantee loop termination: skipping still marches the
/// cursor toward the fixed end-of-run ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallPolicy {
    /// Force the cursor forward by a fixed step and keep going
    SkipAhead {
        /// Skip step in milliseconds
        step_ms: i64,
    },
    /// Treat the partition as exhausted and stop
    Exhaust,
}

impl Default for StallPolicy {
    fn default() -> Self {
        Self::SkipAhead { step_ms: ONE_DAY_MS }
    }
}

impl FromStr for StallPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "skip-ahead" => Ok(Self::default()),
            "exhaust" => Ok(Self::Exhaust),
            other => Err(Error::InvalidConfigValue {
                field: "stall_policy".to_string(),
                message: format!("'{other}' is not one of: skip-ahead, exhaust"),
            }),
        }
    }
}

// ============================================================================
// Engine Config
// ============================================================================

/// Configuration for the pagination engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Checkpoint every this many emitted records per partition
    pub checkpoint_interval: usize,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Backoff strategy
    pub backoff_type: BackoffType,
    /// Stall handling policy
    pub stall_policy: StallPolicy,
    /// Maximum partitions extracted concurrently
    pub concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: 1000,
            max_retries: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            stall_policy: StallPolicy::default(),
            concurrency: 4,
        }
    }
}

impl EngineConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the checkpoint interval
    #[must_use]
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval.max(1);
        self
    }

    /// Set max retries
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set backoff configuration
    #[must_use]
    pub fn with_backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.backoff_type = backoff_type;
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Set the stall policy
    #[must_use]
    pub fn with_stall_policy(mut self, policy: StallPolicy) -> Self {
        self.stall_policy = policy;
        self
    }

    /// Set the concurrency limit
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Backoff delay for a given attempt, with jitter
    ///
    /// Up to 50% of the base delay is added at random so that partitions
    /// retrying against the same exchange do not thunder in lockstep.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff.saturating_mul(factor)
            }
        };
        let base = std::cmp::min(base, self.max_backoff);

        let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis() as u64 / 2);
        base + Duration::from_millis(jitter_ms)
    }
}

// ============================================================================
// Shutdown Signaling
// ============================================================================

/// Create a linked shutdown controller/handle pair
pub fn shutdown_channel() -> (ShutdownController, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (
        ShutdownController { tx },
        Shutdown {
            rx,
            _keep_alive: None,
        },
    )
}

/// The triggering side of a graceful shutdown
#[derive(Debug)]
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    /// Request a graceful stop
    ///
    /// In-flight partitions abort their current fetch or backoff sleep,
    /// write their pending checkpoint, and return.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

/// The observing side of a graceful shutdown
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
    // Keeps the channel open for handles created via `never()`
    _keep_alive: Option<std::sync::Arc<watch::Sender<bool>>>,
}

impl Shutdown {
    /// A handle that never triggers
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            rx,
            _keep_alive: Some(std::sync::Arc::new(tx)),
        }
    }

    /// Whether shutdown has been requested
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until shutdown is requested
    pub async fn triggered(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // Controller dropped without triggering: never resolves
                futures::future::pending::<()>().await;
            }
        }
    }
}

// ============================================================================
// Run Statistics
// ============================================================================

/// Terminal condition of one partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionOutcome {
    /// Cursor reached the end-of-run ceiling
    CaughtUp,
    /// Stall policy decided the partition has no more data
    Exhausted,
    /// Graceful shutdown interrupted the partition
    Cancelled,
}

/// Result of one partition's extraction
#[derive(Debug, Clone)]
pub struct PartitionSummary {
    /// The partition's state key
    pub partition: String,
    /// Records emitted this run
    pub records_emitted: usize,
    /// Fetch pages processed this run
    pub pages_fetched: usize,
    /// Cursor value at the end of the run
    pub final_cursor: TimestampMs,
    /// How the partition ended
    pub outcome: PartitionOutcome,
}

/// Aggregated result of a whole run
#[derive(Debug, Default)]
pub struct RunStats {
    /// Per-partition summaries for partitions that finished
    pub summaries: Vec<PartitionSummary>,
    /// Partitions that aborted, with their errors
    pub failures: Vec<(String, Error)>,
}

impl RunStats {
    /// Total records emitted across all partitions
    pub fn records_total(&self) -> usize {
        self.summaries.iter().map(|s| s.records_emitted).sum()
    }

    /// Whether any partition aborted with an error
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Summary for a specific partition key
    pub fn summary(&self, partition_key: &str) -> Option<&PartitionSummary> {
        self.summaries.iter().find(|s| s.partition == partition_key)
    }
}
