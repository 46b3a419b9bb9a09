use parking_lot::Mutex;
use rand::Rng;
use std::error::Error;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storebench_common::{PerformanceRecord, Result};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::WorkloadConfig;
use crate::metrics::{LatencyStats, Metric};
use crate::report::{LatencyReport, LogSink, MetricReport, Report, ReportSink};
use crate::retry::Backoff;
use crate::score;
use crate::worker::{self, FailureAction};

/// Latency harness: every worker issues one call at a time with a jittered
/// pause between successes, and the whole-run distribution of call durations
/// is reported once all workers have stopped.
///
/// Every completed call is timed, failed ones included. With
/// `sample_every` set, statistics over each batch of that many new samples
/// are emitted as [`MetricReport`]s while the run is in progress.
pub struct LatencyWorkload {
    config: Arc<WorkloadConfig>,
    sink: Arc<dyn ReportSink>,
}

/// Whole-run series plus the batch feeding in-run metric reports.
struct Series {
    total: Metric,
    batch: Option<Metric>,
    sample_every: usize,
}

impl Series {
    fn new(name: &str, sample_every: Option<usize>) -> Self {
        Self {
            total: Metric::new(name),
            batch: sample_every.map(|_| Metric::new(name)),
            sample_every: sample_every.unwrap_or(usize::MAX),
        }
    }

    /// Returns the batch statistics when this sample completes a batch.
    fn add(&mut self, value: f64) -> Option<LatencyStats> {
        self.total.add_sample(value);
        let batch = self.batch.as_mut()?;
        batch.add_sample(value);
        if batch.count() < self.sample_every {
            return None;
        }
        let full = std::mem::replace(batch, Metric::new(self.total.name()));
        full.summary().ok()
    }
}

/// Samples shared by every worker of one run.
struct LatencyState {
    workload: String,
    latency: Mutex<Series>,
    score: Mutex<Series>,
    errors: AtomicU64,
    sink: Arc<dyn ReportSink>,
}

impl LatencyState {
    fn new(config: &WorkloadConfig, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            workload: config.name.clone(),
            latency: Mutex::new(Series::new("latency", config.sample_every)),
            score: Mutex::new(Series::new("score", config.sample_every)),
            errors: AtomicU64::new(0),
            sink,
        }
    }

    fn record_success(&self, elapsed: Duration) {
        self.record(elapsed, score::score(elapsed));
    }

    fn record_failure(&self, elapsed: Duration) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.record(elapsed, score::FAILURE_SCORE);
    }

    fn record(&self, elapsed: Duration, score: f64) {
        let latency = self.latency.lock().add(elapsed.as_secs_f64() * 1000.0);
        let score = self.score.lock().add(score);
        // Emitted outside the locks.
        self.emit_batch("latency", latency);
        self.emit_batch("score", score);
    }

    fn emit_batch(&self, metric: &str, stats: Option<LatencyStats>) {
        if let Some(stats) = stats {
            self.sink.emit(&Report::Metric(MetricReport {
                workload: self.workload.clone(),
                metric: metric.to_string(),
                stats,
            }));
        }
    }
}

impl LatencyWorkload {
    pub fn new(config: WorkloadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            sink: Arc::new(LogSink),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Drive `operation` from `config.workers` workers until `cancel` fires,
    /// then emit and return the whole-run report.
    ///
    /// Fails with `EmptySeries` if no call ever completed.
    pub async fn run<F, Fut, E>(
        &self,
        operation: F,
        cancel: CancellationToken,
    ) -> Result<LatencyReport>
    where
        F: Fn(PerformanceRecord, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
    {
        let started = Instant::now();
        let backoff = Backoff::new(self.config.backoff_floor, self.config.backoff_ceiling)?;
        let state = Arc::new(LatencyState::new(&self.config, self.sink.clone()));
        let operation = Arc::new(operation);

        info!(
            workload = %self.config.name,
            workers = self.config.workers,
            "starting latency workload"
        );

        let handles = (0..self.config.workers as u64)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    self.config.clone(),
                    operation.clone(),
                    backoff.clone(),
                    state.clone(),
                    cancel.clone(),
                ))
            })
            .collect();
        worker::join_all(handles).await?;

        let report = self.final_report(&state, started.elapsed());
        match &report {
            Ok(r) => self.sink.emit(&Report::Latency(r.clone())),
            Err(e) => error!(
                workload = %self.config.name,
                error = %e,
                "cannot compute latency report"
            ),
        }
        report
    }

    fn final_report(&self, state: &LatencyState, elapsed: Duration) -> Result<LatencyReport> {
        let latency = state.latency.lock();
        let stats = latency.total.summary()?;
        let score = state.score.lock().total.average().ok();
        Ok(LatencyReport {
            workload: self.config.name.clone(),
            elapsed_ms: elapsed.as_millis() as u64,
            operations: latency.total.count() as u64,
            errors: state.errors.load(Ordering::Relaxed),
            latency: stats,
            score,
        })
    }
}

async fn run_worker<F, Fut, E>(
    worker_id: u64,
    config: Arc<WorkloadConfig>,
    operation: Arc<F>,
    mut backoff: Backoff,
    state: Arc<LatencyState>,
    cancel: CancellationToken,
) where
    F: Fn(PerformanceRecord, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
    E: Error + Send + Sync + 'static,
{
    let mut rng = worker::worker_rng();

    // Workers write disjoint key ranges.
    let min_key = worker_id * config.keys_per_worker;
    let max_key = min_key + config.keys_per_worker;

    while !cancel.is_cancelled() {
        let key: u64 = rng.gen_range(min_key..max_key);
        let record = PerformanceRecord::generate(key.to_string(), &mut rng);

        let start = Instant::now();
        let Some(outcome) = worker::attempt(operation(record, cancel.clone()), &cancel).await else {
            break;
        };
        let elapsed = start.elapsed();

        let wait = match outcome {
            Ok(()) => {
                backoff.reset();
                state.record_success(elapsed);
                rng.gen_range(config.min_delay..=config.max_delay)
            }
            Err(e) => {
                if cancel.is_cancelled() {
                    break;
                }
                state.record_failure(elapsed);
                let delay = backoff.retry();
                worker::log_failure(&config.name, &e, FailureAction::Backoff(delay));
                delay
            }
        };

        if !worker::pause(wait, &cancel).await {
            break;
        }
    }
}
