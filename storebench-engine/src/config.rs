use std::time::Duration;
use storebench_common::{HarnessError, Result};

pub const DEFAULT_WORKERS: usize = 32;

/// Bounds of the jittered pause a latency worker takes after each success.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(1500);

/// Size of the key range each latency worker draws record ids from.
pub const DEFAULT_KEYS_PER_WORKER: u64 = 10_000;

pub const DEFAULT_BACKOFF_FLOOR: Duration = Duration::from_secs(1);
pub const DEFAULT_BACKOFF_CEILING: Duration = Duration::from_secs(30);

/// How often the throughput reporter drains the window counters.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Samples per in-run metric report in latency mode.
pub const DEFAULT_SAMPLE_EVERY: Option<usize> = Some(100);

/// Parameters shared by both workload variants.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    /// Name stamped on every log line and report.
    pub name: String,
    pub workers: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub keys_per_worker: u64,
    pub backoff_floor: Duration,
    pub backoff_ceiling: Duration,
    pub report_interval: Duration,
    /// Latency mode emits a metric report for every this many new samples.
    /// `None` reports only at the end of the run.
    pub sample_every: Option<usize>,
}

impl WorkloadConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workers: DEFAULT_WORKERS,
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            keys_per_worker: DEFAULT_KEYS_PER_WORKER,
            backoff_floor: DEFAULT_BACKOFF_FLOOR,
            backoff_ceiling: DEFAULT_BACKOFF_CEILING,
            report_interval: DEFAULT_REPORT_INTERVAL,
            sample_every: DEFAULT_SAMPLE_EVERY,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_delay(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff(mut self, floor: Duration, ceiling: Duration) -> Self {
        self.backoff_floor = floor;
        self.backoff_ceiling = ceiling;
        self
    }

    pub fn with_keys_per_worker(mut self, keys_per_worker: u64) -> Self {
        self.keys_per_worker = keys_per_worker;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_sample_every(mut self, sample_every: Option<usize>) -> Self {
        self.sample_every = sample_every;
        self
    }

    /// Reject combinations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(invalid("workers must be at least 1"));
        }
        if self.min_delay > self.max_delay {
            return Err(invalid(format!(
                "min_delay ({:?}) exceeds max_delay ({:?})",
                self.min_delay, self.max_delay
            )));
        }
        if self.keys_per_worker == 0 {
            return Err(invalid("keys_per_worker must be at least 1"));
        }
        if self.report_interval.is_zero() {
            return Err(invalid("report_interval must be non-zero"));
        }
        if self.sample_every == Some(0) {
            return Err(invalid("sample_every must be at least 1"));
        }
        if self.backoff_ceiling < self.backoff_floor {
            return Err(invalid(format!(
                "backoff_ceiling ({:?}) is below backoff_floor ({:?})",
                self.backoff_ceiling, self.backoff_floor
            )));
        }
        // Partitioned key ranges must fit in u64.
        if (self.workers as u64).checked_mul(self.keys_per_worker).is_none() {
            return Err(invalid("workers * keys_per_worker overflows"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> HarnessError {
    HarnessError::InvalidConfig(msg.into())
}
