use std::time::Duration;
use storebench_common::{HarnessError, Result};

use crate::config::{DEFAULT_BACKOFF_CEILING, DEFAULT_BACKOFF_FLOOR};

/// Exponential backoff state for one worker's retry sequence.
///
/// The delay starts at `floor`, doubles after every `retry()` and saturates at
/// `ceiling`. `reset()` returns it to `floor`. Not shared between workers.
#[derive(Debug, Clone)]
pub struct Backoff {
    floor: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    /// Fails with `InvalidConfig` when `ceiling` is below `floor`.
    pub fn new(floor: Duration, ceiling: Duration) -> Result<Self> {
        if ceiling < floor {
            return Err(HarnessError::InvalidConfig(format!(
                "backoff ceiling ({ceiling:?}) is below floor ({floor:?})"
            )));
        }
        Ok(Self {
            floor,
            ceiling,
            current: floor,
        })
    }

    /// Delay to wait before the next attempt. Doubles the stored delay.
    pub fn retry(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.ceiling);
        delay
    }

    pub fn reset(&mut self) -> Duration {
        self.current = self.floor;
        self.current
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn floor(&self) -> Duration {
        self.floor
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            floor: DEFAULT_BACKOFF_FLOOR,
            ceiling: DEFAULT_BACKOFF_CEILING,
            current: DEFAULT_BACKOFF_FLOOR,
        }
    }
}
