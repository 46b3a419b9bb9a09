use thiserror::Error;

pub mod record;

pub use record::{PerformanceRecord, RECORD_TTL_SECS};

/// Error types for StoreBench harness operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HarnessError {
    #[error("Metric {metric} has no samples")]
    EmptySeries { metric: String },

    #[error("Percentile {0} is outside 0..=100")]
    InvalidPercentile(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker task panicked: {0}")]
    WorkerPanicked(String),

    #[error("Reporter task failed: {0}")]
    ReporterFailed(String),
}

/// Result type for StoreBench harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;
