use std::time::Duration;

/// Calls faster than this score 1.0.
pub const SUCCESS_THRESHOLD: Duration = Duration::from_millis(100);
/// Calls slower than this (and failures) score 0.0.
pub const FAILURE_THRESHOLD: Duration = Duration::from_millis(1000);

pub const FAILURE_SCORE: f64 = 0.0;

/// Health score of a successful call: 1.0 fast, 0.5 slow, 0.0 too slow.
pub fn score(elapsed: Duration) -> f64 {
    if elapsed < SUCCESS_THRESHOLD {
        1.0
    } else if elapsed < FAILURE_THRESHOLD {
        0.5
    } else {
        FAILURE_SCORE
    }
}
