//! Pieces of the worker loop shared by the latency and throughput engines.

use rand::{rngs::StdRng, SeedableRng};
use std::any::type_name;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use storebench_common::{HarnessError, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::retry::Backoff;

/// Recognizes backend throttling and returns the wait the backend asked for.
pub type ThrottleClassifier<E> = Arc<dyn Fn(&E) -> Option<Duration> + Send + Sync>;

/// What a worker does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureAction {
    /// Backend-mandated wait; not an error, backoff untouched.
    Throttled(Duration),
    /// Counted error; wait the backoff controller's next delay.
    Backoff(Duration),
}

/// Private random source for one worker.
pub(crate) fn worker_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Run one attempt, abandoning it if `cancel` fires first.
/// Returns `None` when the attempt was cancelled in flight.
pub(crate) async fn attempt<T, E>(
    call: impl Future<Output = std::result::Result<T, E>>,
    cancel: &CancellationToken,
) -> Option<std::result::Result<T, E>> {
    tokio::select! {
        // An attempt that finishes in the same poll as cancellation still counts.
        biased;
        outcome = call => Some(outcome),
        _ = cancel.cancelled() => None,
    }
}

/// Sleep for `delay`. Returns `false` if cancelled before it elapsed.
pub(crate) async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

pub(crate) fn classify_failure<E>(
    err: &E,
    throttle: Option<&ThrottleClassifier<E>>,
    backoff: &mut Backoff,
) -> FailureAction {
    match throttle.and_then(|classify| classify(err)) {
        Some(delay) => FailureAction::Throttled(delay),
        None => FailureAction::Backoff(backoff.retry()),
    }
}

pub(crate) fn log_failure<E: Error>(workload: &str, err: &E, action: FailureAction) {
    match action {
        FailureAction::Throttled(delay) => debug!(
            workload,
            error_type = type_name::<E>(),
            error = %err,
            retry_in_ms = delay.as_millis() as u64,
            "Throttled by backend, waiting"
        ),
        FailureAction::Backoff(delay) => error!(
            workload,
            error_type = type_name::<E>(),
            error = %err,
            retry_in_ms = delay.as_millis() as u64,
            "Unexpected failure, retrying"
        ),
    }
}

/// Await every worker, reporting the first panic after all have finished.
pub(crate) async fn join_all(handles: Vec<JoinHandle<()>>) -> Result<()> {
    let mut first_panic = None;
    for handle in handles {
        if let Err(e) = handle.await {
            error!(error = %e, "worker task failed");
            first_panic.get_or_insert_with(|| e.to_string());
        }
    }
    match first_panic {
        Some(msg) => Err(HarnessError::WorkerPanicked(msg)),
        None => Ok(()),
    }
}
