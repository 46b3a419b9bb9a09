//! Workload-execution engine for benchmarking backing stores.
//!
//! [`LatencyWorkload`] measures the full distribution of call durations under
//! light load; [`ThroughputWorkload`] saturates the store and reports windowed
//! operation rates. Both drive a caller-supplied async operation from a pool
//! of tokio tasks until a [`CancellationToken`] fires.

pub mod config;
pub mod counters;
pub mod latency;
pub mod memory;
pub mod metrics;
pub mod report;
pub mod retry;
pub mod score;
pub mod throughput;
mod worker;

pub use config::WorkloadConfig;
pub use latency::LatencyWorkload;
pub use report::{
    LatencyReport, LogSink, MetricReport, Report, ReportSink, ThroughputReport, VecSink,
};
pub use throughput::ThroughputWorkload;
pub use tokio_util::sync::CancellationToken;
pub use worker::ThrottleClassifier;
