use serde::Serialize;
use storebench_common::{HarnessError, Result};

/// Append-only series of `f64` samples (milliseconds for latency).
///
/// Percentiles use the nearest-rank rule: the sample at sorted index
/// `ceil(p / 100 * count) - 1`, clamped to `[0, count - 1]`. Every statistic
/// except `count` fails with `EmptySeries` when no samples were added.
///
/// Non-finite samples are dropped on insert. The series is not synchronized;
/// concurrent producers wrap it in a lock.
#[derive(Debug, Clone)]
pub struct Metric {
    name: String,
    values: Vec<f64>,
}

/// Every statistic the latency report carries, computed from one sorted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyStats {
    pub count: usize,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
    pub median: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
    pub p9999: f64,
}

impl Metric {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_sample(&mut self, value: f64) -> &mut Self {
        if value.is_finite() {
            self.values.push(value);
        }
        self
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn sum(&self) -> Result<f64> {
        self.non_empty()?;
        Ok(self.values.iter().sum())
    }

    pub fn min(&self) -> Result<f64> {
        self.non_empty()?;
        Ok(self.values.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn max(&self) -> Result<f64> {
        self.non_empty()?;
        Ok(self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    pub fn average(&self) -> Result<f64> {
        let mean = self.sum()? / self.values.len() as f64;
        // Rounding in the sum can push the mean a hair outside the sample range.
        Ok(mean.clamp(self.min()?, self.max()?))
    }

    /// Sample standard deviation (n - 1 denominator); 0 for a single sample.
    pub fn stddev(&self) -> Result<f64> {
        let mean = self.average()?;
        Ok(sample_stddev(&self.values, mean))
    }

    pub fn median(&self) -> Result<f64> {
        self.percentile(50.0)
    }

    pub fn percentile(&self, p: f64) -> Result<f64> {
        check_percentile(p)?;
        let sorted = self.sorted()?;
        Ok(nearest_rank(&sorted, p))
    }

    /// Sort once and compute every reported statistic.
    pub fn summary(&self) -> Result<LatencyStats> {
        let sorted = self.sorted()?;
        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let min = sorted[0];
        let max = sorted[count - 1];
        let average = (sum / count as f64).clamp(min, max);
        let p50 = nearest_rank(&sorted, 50.0);

        Ok(LatencyStats {
            count,
            sum,
            average,
            min,
            max,
            stddev: sample_stddev(&sorted, average),
            median: p50,
            p25: nearest_rank(&sorted, 25.0),
            p50,
            p75: nearest_rank(&sorted, 75.0),
            p95: nearest_rank(&sorted, 95.0),
            p99: nearest_rank(&sorted, 99.0),
            p999: nearest_rank(&sorted, 99.9),
            p9999: nearest_rank(&sorted, 99.99),
        })
    }

    fn sorted(&self) -> Result<Vec<f64>> {
        self.non_empty()?;
        let mut sorted = self.values.clone();
        sorted.sort_unstable_by(f64::total_cmp);
        Ok(sorted)
    }

    fn non_empty(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(HarnessError::EmptySeries {
                metric: self.name.clone(),
            });
        }
        Ok(())
    }
}

fn check_percentile(p: f64) -> Result<()> {
    if (0.0..=100.0).contains(&p) {
        Ok(())
    } else {
        Err(HarnessError::InvalidPercentile(p))
    }
}

/// `sorted` must be non-empty and ascending.
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    // p * n first keeps integer percentiles exact.
    let rank = (p * n as f64 / 100.0).ceil() as usize;
    sorted[rank.saturating_sub(1).min(n - 1)]
}

fn sample_stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (squares / (values.len() - 1) as f64).sqrt()
}
