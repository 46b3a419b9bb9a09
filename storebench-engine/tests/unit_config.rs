use std::time::Duration;
use storebench_common::HarnessError;
use storebench_engine::config::{
    WorkloadConfig, DEFAULT_BACKOFF_CEILING, DEFAULT_BACKOFF_FLOOR, DEFAULT_KEYS_PER_WORKER,
    DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY, DEFAULT_REPORT_INTERVAL, DEFAULT_SAMPLE_EVERY,
    DEFAULT_WORKERS,
};

fn assert_invalid(config: WorkloadConfig) {
    assert!(
        matches!(config.validate(), Err(HarnessError::InvalidConfig(_))),
        "expected {config:?} to be rejected"
    );
}

#[test]
fn test_defaults() {
    let c = WorkloadConfig::new("Redis");
    assert_eq!(c.name, "Redis");
    assert_eq!(c.workers, DEFAULT_WORKERS);
    assert_eq!(c.min_delay, DEFAULT_MIN_DELAY);
    assert_eq!(c.max_delay, DEFAULT_MAX_DELAY);
    assert_eq!(c.keys_per_worker, DEFAULT_KEYS_PER_WORKER);
    assert_eq!(c.backoff_floor, DEFAULT_BACKOFF_FLOOR);
    assert_eq!(c.backoff_ceiling, DEFAULT_BACKOFF_CEILING);
    assert_eq!(c.report_interval, DEFAULT_REPORT_INTERVAL);
    assert_eq!(c.sample_every, DEFAULT_SAMPLE_EVERY);
    assert!(c.validate().is_ok());
}

#[test]
fn test_equal_delay_bounds_are_valid() {
    let d = Duration::from_millis(10);
    assert!(WorkloadConfig::new("w").with_delay(d, d).validate().is_ok());
}

#[test]
fn test_rejects_invalid_combinations() {
    assert_invalid(WorkloadConfig::new("w").with_workers(0));
    assert_invalid(
        WorkloadConfig::new("w").with_delay(Duration::from_secs(2), Duration::from_secs(1)),
    );
    assert_invalid(WorkloadConfig::new("w").with_keys_per_worker(0));
    assert_invalid(WorkloadConfig::new("w").with_report_interval(Duration::ZERO));
    assert_invalid(
        WorkloadConfig::new("w").with_backoff(Duration::from_secs(5), Duration::from_secs(1)),
    );
    assert_invalid(WorkloadConfig::new("w").with_sample_every(Some(0)));
    assert_invalid(WorkloadConfig::new("w").with_workers(2).with_keys_per_worker(u64::MAX));
}

#[test]
fn test_sampling_can_be_disabled() {
    assert!(WorkloadConfig::new("w").with_sample_every(None).validate().is_ok());
}
