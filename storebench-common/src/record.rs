use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Time-to-live stamped on every generated record (one day).
pub const RECORD_TTL_SECS: u32 = 86_400;

const MIN_STRING_LEN: usize = 16;
const MAX_STRING_LEN: usize = 64;
const MAX_TIME_VALUE_MS: u64 = 1_000;

/// Fixed-shape record handed to latency-mode operations and used by stores
/// as the unit of a write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub string_value: String,
    pub int_value: i32,
    pub double_value: f64,
    pub time_value: Duration,
    pub ttl: u32,
}

impl PerformanceRecord {
    /// Generate a record with the given id and random payload fields.
    pub fn generate(id: impl Into<String>, rng: &mut impl Rng) -> Self {
        let len = rng.gen_range(MIN_STRING_LEN..MAX_STRING_LEN);
        let int_value = rng.gen_range(0..i32::MAX);
        Self {
            id: id.into(),
            timestamp: Utc::now(),
            string_value: random_lowercase(rng, len),
            int_value,
            double_value: rng.gen_range(0..i32::MAX) as f64,
            time_value: Duration::from_millis(rng.gen_range(0..MAX_TIME_VALUE_MS)),
            ttl: RECORD_TTL_SECS,
        }
    }

    /// Generate a record with a fresh v4 UUID as its id.
    pub fn with_random_id(rng: &mut impl Rng) -> Self {
        Self::generate(Uuid::new_v4().to_string(), rng)
    }
}

/// Build a string of `len` characters drawn uniformly from `a..=z`.
pub fn random_lowercase(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}
