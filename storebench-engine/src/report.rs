use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::counters::WindowCounts;
use crate::metrics::LatencyStats;

/// Whole-run summary of a latency workload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyReport {
    pub workload: String,
    pub elapsed_ms: u64,
    pub operations: u64,
    pub errors: u64,
    pub latency: LatencyStats,
    /// Mean per-attempt health score; `None` when nothing was scored.
    pub score: Option<f64>,
}

/// Statistics over the last `sample_every` samples of one latency-mode series,
/// emitted while the run is in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReport {
    pub workload: String,
    /// `"latency"` or `"score"`.
    pub metric: String,
    pub stats: LatencyStats,
}

/// One throughput window, or the whole-run summary when `summary` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputReport {
    pub workload: String,
    pub elapsed_ms: u64,
    pub operations: u64,
    pub errors: u64,
    /// Operations per second.
    pub throughput: f64,
    /// Mean milliseconds per operation. NaN (serialized as `null`) when the
    /// summary covers zero operations.
    pub operation_latency: f64,
    pub summary: bool,
}

impl ThroughputReport {
    pub fn from_window(
        workload: &str,
        elapsed: Duration,
        window: WindowCounts,
        summary: bool,
    ) -> Self {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let operations = window.operations as f64;
        let operation_latency = if window.operations == 0 {
            f64::NAN
        } else {
            window.latency_us as f64 / 1000.0 / operations
        };
        Self {
            workload: workload.to_string(),
            elapsed_ms: elapsed.as_millis() as u64,
            operations: window.operations,
            errors: window.errors,
            throughput: operations * 1000.0 / elapsed_ms.max(1.0),
            operation_latency,
            summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Report {
    Latency(LatencyReport),
    Throughput(ThroughputReport),
    Metric(MetricReport),
}

impl Report {
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize report");
                String::new()
            }
        }
    }
}

/// Destination for engine reports.
pub trait ReportSink: Send + Sync {
    fn emit(&self, report: &Report);
}

/// Writes each report as one structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&self, report: &Report) {
        let json = report.to_json();
        match report {
            Report::Latency(r) => info!(
                target: "storebench::report",
                workload = %r.workload,
                report_type = "latency",
                elapsed_ms = r.elapsed_ms,
                operations = r.operations,
                errors = r.errors,
                average = r.latency.average,
                min = r.latency.min,
                max = r.latency.max,
                median = r.latency.median,
                p25 = r.latency.p25,
                p50 = r.latency.p50,
                p75 = r.latency.p75,
                p95 = r.latency.p95,
                p99 = r.latency.p99,
                p999 = r.latency.p999,
                p9999 = r.latency.p9999,
                score = r.score,
                report = %json,
                "latency report"
            ),
            Report::Throughput(r) => info!(
                target: "storebench::report",
                workload = %r.workload,
                report_type = "throughput",
                elapsed_ms = r.elapsed_ms,
                operations = r.operations,
                errors = r.errors,
                throughput = r.throughput,
                operation_latency = r.operation_latency,
                summary = r.summary,
                report = %json,
                "throughput report"
            ),
            Report::Metric(r) => info!(
                target: "storebench::report",
                workload = %r.workload,
                report_type = "metric",
                metric = %r.metric,
                count = r.stats.count,
                average = r.stats.average,
                min = r.stats.min,
                max = r.stats.max,
                median = r.stats.median,
                sum = r.stats.sum,
                stddev = r.stats.stddev,
                p25 = r.stats.p25,
                p50 = r.stats.p50,
                p75 = r.stats.p75,
                p95 = r.stats.p95,
                p99 = r.stats.p99,
                report = %json,
                "metric statistics"
            ),
        }
    }
}

/// Keeps every report in memory, in emission order.
#[derive(Debug, Default)]
pub struct VecSink {
    reports: Mutex<Vec<Report>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    pub fn throughput_windows(&self) -> Vec<ThroughputReport> {
        self.reports
            .lock()
            .iter()
            .filter_map(|r| match r {
                Report::Throughput(t) if !t.summary => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn metric_reports(&self) -> Vec<MetricReport> {
        self.reports
            .lock()
            .iter()
            .filter_map(|r| match r {
                Report::Metric(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ReportSink for VecSink {
    fn emit(&self, report: &Report) {
        self.reports.lock().push(report.clone());
    }
}
