use rand::rngs::StdRng;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use storebench_common::{HarnessError, Result};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::WorkloadConfig;
use crate::counters::{WindowCounts, WorkloadCounters};
use crate::report::{LogSink, Report, ReportSink, ThroughputReport};
use crate::retry::Backoff;
use crate::worker::{self, FailureAction, ThrottleClassifier};

/// Throughput harness: workers call back-to-back with no pause, and a
/// reporter emits windowed operation rates every `report_interval`.
///
/// Operations return how many logical operations the call performed, so a
/// batched write of 16 records counts as 16.
pub struct ThroughputWorkload<E> {
    config: Arc<WorkloadConfig>,
    sink: Arc<dyn ReportSink>,
    throttle: Option<ThrottleClassifier<E>>,
}

impl<E> ThroughputWorkload<E>
where
    E: Error + Send + Sync + 'static,
{
    pub fn new(config: WorkloadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            sink: Arc::new(LogSink),
            throttle: None,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Failures for which `classify` returns `Some(delay)` are waited out for
    /// exactly `delay` and are neither counted as errors nor backed off.
    pub fn with_throttle(
        mut self,
        classify: impl Fn(&E) -> Option<Duration> + Send + Sync + 'static,
    ) -> Self {
        self.throttle = Some(Arc::new(classify));
        self
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Drive `operation` until `cancel` fires. Returns the whole-run summary,
    /// which is also emitted to the sink after the last window.
    ///
    /// No summary is emitted when a worker panicked or the reporter failed,
    /// since the drained windows would then be incomplete.
    pub async fn run<F, Fut>(
        &self,
        operation: F,
        cancel: CancellationToken,
    ) -> Result<ThroughputReport>
    where
        F: Fn(&mut StdRng, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<u64, E>> + Send + 'static,
    {
        let started = Instant::now();
        let backoff = Backoff::new(self.config.backoff_floor, self.config.backoff_ceiling)?;
        let counters = Arc::new(WorkloadCounters::new());
        let operation = Arc::new(operation);

        info!(
            workload = %self.config.name,
            workers = self.config.workers,
            "starting throughput workload"
        );

        let reporter = tokio::spawn(run_reporter(
            self.config.clone(),
            counters.clone(),
            self.sink.clone(),
            cancel.clone(),
        ));

        let handles = (0..self.config.workers)
            .map(|_| {
                tokio::spawn(run_worker(
                    self.config.clone(),
                    operation.clone(),
                    self.throttle.clone(),
                    backoff.clone(),
                    counters.clone(),
                    cancel.clone(),
                ))
            })
            .collect();
        let workers = worker::join_all(handles).await;

        let reported = join_reporter(reporter).await;
        workers?;
        let mut totals = reported?;
        totals += counters.drain();

        let summary =
            ThroughputReport::from_window(&self.config.name, started.elapsed(), totals, true);
        self.sink.emit(&Report::Throughput(summary.clone()));
        Ok(summary)
    }
}

async fn run_worker<F, Fut, E>(
    config: Arc<WorkloadConfig>,
    operation: Arc<F>,
    throttle: Option<ThrottleClassifier<E>>,
    mut backoff: Backoff,
    counters: Arc<WorkloadCounters>,
    cancel: CancellationToken,
) where
    F: Fn(&mut StdRng, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<u64, E>> + Send + 'static,
    E: Error + Send + Sync + 'static,
{
    let mut rng = worker::worker_rng();

    while !cancel.is_cancelled() {
        let start = Instant::now();
        let call = operation(&mut rng, cancel.clone());
        let Some(outcome) = worker::attempt(call, &cancel).await else {
            break;
        };
        let elapsed = start.elapsed();

        match outcome {
            Ok(units) => {
                backoff.reset();
                counters.add_operations(units);
                counters.add_latency_us(elapsed.as_micros() as u64);
            }
            Err(e) => {
                if cancel.is_cancelled() {
                    break;
                }
                let action = worker::classify_failure(&e, throttle.as_ref(), &mut backoff);
                let wait = match action {
                    FailureAction::Throttled(delay) => delay,
                    FailureAction::Backoff(delay) => {
                        counters.add_error();
                        delay
                    }
                };
                worker::log_failure(&config.name, &e, action);
                if !worker::pause(wait, &cancel).await {
                    break;
                }
            }
        }
    }
}

/// Emit one report per interval until cancelled. Returns everything it drained.
///
/// A window with zero operations is not emitted and not drained; its errors
/// and elapsed time carry into the next window.
async fn run_reporter(
    config: Arc<WorkloadConfig>,
    counters: Arc<WorkloadCounters>,
    sink: Arc<dyn ReportSink>,
    cancel: CancellationToken,
) -> WindowCounts {
    let period = config.report_interval;
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut reported = WindowCounts::default();
    let mut window_start = Instant::now();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let window = counters.snapshot();
        if window.operations == 0 {
            continue;
        }
        counters.subtract(&window);

        let now = Instant::now();
        let report =
            ThroughputReport::from_window(&config.name, now - window_start, window, false);
        window_start = now;

        sink.emit(&Report::Throughput(report));
        reported += window;
    }

    reported
}

/// A failed reporter took its drained windows with it, so no summary can be built.
async fn join_reporter(reporter: JoinHandle<WindowCounts>) -> Result<WindowCounts> {
    reporter.await.map_err(|e| {
        error!(error = %e, "throughput reporter failed");
        HarnessError::ReporterFailed(e.to_string())
    })
}
