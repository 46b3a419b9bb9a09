use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};

/// Throughput-mode counters shared by every worker.
///
/// Workers only ever add. The reporter drains with read-then-subtract so that
/// increments landing between the read and the subtract stay in the counters
/// for the next window instead of being zeroed away.
#[derive(Debug, Default)]
pub struct WorkloadCounters {
    operations: AtomicU64,
    latency_us: AtomicU64,
    errors: AtomicU64,
}

/// Values read from (or drained out of) `WorkloadCounters`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    pub operations: u64,
    /// Cumulative call latency in microseconds.
    pub latency_us: u64,
    pub errors: u64,
}

impl WorkloadCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_operations(&self, count: u64) {
        self.operations.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_latency_us(&self, micros: u64) {
        self.latency_us.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn add_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WindowCounts {
        WindowCounts {
            operations: self.operations.load(Ordering::Relaxed),
            latency_us: self.latency_us.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    /// Remove a previously read snapshot from the counters.
    pub fn subtract(&self, window: &WindowCounts) {
        self.operations.fetch_sub(window.operations, Ordering::Relaxed);
        self.latency_us.fetch_sub(window.latency_us, Ordering::Relaxed);
        self.errors.fetch_sub(window.errors, Ordering::Relaxed);
    }

    pub fn drain(&self) -> WindowCounts {
        let window = self.snapshot();
        self.subtract(&window);
        window
    }
}

impl WindowCounts {
    pub fn is_empty(&self) -> bool {
        self.operations == 0 && self.latency_us == 0 && self.errors == 0
    }
}

impl AddAssign for WindowCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.operations += rhs.operations;
        self.latency_us += rhs.latency_us;
        self.errors += rhs.errors;
    }
}
