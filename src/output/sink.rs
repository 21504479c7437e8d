//! Record sinks
//!
//! Where emitted records go. Sinks are shared across concurrently running
//! partitions, so implementations serialize their own writes.

use super::record::CandleRecord;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Destination for emitted records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Forward one record downstream
    async fn write(&self, record: &CandleRecord) -> Result<()>;

    /// Flush any buffered output
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// NDJSON sink: one JSON object per line
pub struct JsonLinesSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonLinesSink {
    /// Write records to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(std::io::stdout())),
        }
    }

    /// Write records to a file, truncating any existing content
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self {
            writer: Mutex::new(Box::new(std::io::BufWriter::new(file))),
        })
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn write(&self, record: &CandleRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        let mut writer = self.writer.lock().map_err(|_| Error::Other(
            "output writer lock poisoned".to_string(),
        ))?;
        writeln!(writer, "{line}")?;
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let mut writer = self.writer.lock().map_err(|_| Error::Other(
            "output writer lock poisoned".to_string(),
        ))?;
        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for JsonLinesSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

/// In-memory sink collecting records for assertions
#[derive(Debug, Default)]
pub struct VecSink {
    records: Mutex<Vec<CandleRecord>>,
}

impl VecSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All records written so far, in write order
    pub fn records(&self) -> Vec<CandleRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Timestamps of all records written so far
    pub fn timestamps(&self) -> Vec<i64> {
        self.records.lock().unwrap().iter().map(|r| r.timestamp).collect()
    }

    /// Number of records written so far
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl RecordSink for VecSink {
    async fn write(&self, record: &CandleRecord) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
