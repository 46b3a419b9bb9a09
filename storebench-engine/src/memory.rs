use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use storebench_common::PerformanceRecord;
use thiserror::Error;

/// Errors an in-memory store write can fail with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store unavailable")]
    Unavailable,

    #[error("Store busy, retry after {} ms", .retry_after.as_millis())]
    Busy { retry_after: Duration },

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Fault and latency simulation knobs for `MemoryStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStoreConfig {
    /// Simulated service time of every write call.
    pub latency: Duration,
    /// Probability in `[0, 1]` that a call fails with `Unavailable`.
    pub failure_rate: f64,
    /// Probability in `[0, 1]` that a call fails with `Busy`.
    pub throttle_rate: f64,
    pub throttle_delay: Duration,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1),
            failure_rate: 0.0,
            throttle_rate: 0.0,
            throttle_delay: Duration::from_millis(100),
        }
    }
}

/// In-process key-value store holding JSON-serialized records.
#[derive(Debug)]
pub struct MemoryStore {
    config: MemoryStoreConfig,
    entries: Mutex<HashMap<String, String>>,
    calls: AtomicU64,
}

impl MemoryStore {
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
            calls: AtomicU64::new(0),
        }
    }

    pub async fn write(&self, record: &PerformanceRecord) -> Result<(), StoreError> {
        self.call().await?;
        let json = serialize(record)?;
        self.entries.lock().insert(record.id.clone(), json);
        Ok(())
    }

    /// Write all records as one call. Returns how many were written.
    pub async fn write_batch(&self, records: &[PerformanceRecord]) -> Result<u64, StoreError> {
        self.call().await?;
        let serialized = records
            .iter()
            .map(|r| serialize(r).map(|json| (r.id.clone(), json)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        self.entries.lock().extend(serialized);
        Ok(records.len() as u64)
    }

    pub fn get(&self, id: &str) -> Option<PerformanceRecord> {
        let json = self.entries.lock().get(id).cloned()?;
        serde_json::from_str(&json).ok()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of write calls made, including failed ones.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Throttle classifier for use with `ThroughputWorkload::with_throttle`.
    pub fn throttle(err: &StoreError) -> Option<Duration> {
        match err {
            StoreError::Busy { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    async fn call(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let roll: f64 = rand::thread_rng().gen();
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        if roll < self.config.failure_rate {
            Err(StoreError::Unavailable)
        } else if roll < self.config.failure_rate + self.config.throttle_rate {
            Err(StoreError::Busy {
                retry_after: self.config.throttle_delay,
            })
        } else {
            Ok(())
        }
    }
}

fn serialize(record: &PerformanceRecord) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))
}
