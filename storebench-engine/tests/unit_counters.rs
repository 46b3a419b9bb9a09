use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use storebench_engine::counters::{WindowCounts, WorkloadCounters};

#[test]
fn test_drain_returns_and_clears() {
    let c = WorkloadCounters::new();
    c.add_operations(16);
    c.add_operations(4);
    c.add_latency_us(1500);
    c.add_error();

    let w = c.drain();
    assert_eq!(w, WindowCounts { operations: 20, latency_us: 1500, errors: 1 });
    assert!(c.snapshot().is_empty());
}

#[test]
fn test_subtract_keeps_late_increments() {
    let c = WorkloadCounters::new();
    c.add_operations(10);
    let seen = c.snapshot();

    // An increment landing between the read and the subtract survives it.
    c.add_operations(3);
    c.subtract(&seen);

    assert_eq!(c.snapshot().operations, 3);
}

#[test]
fn test_window_counts_add_assign() {
    let mut total = WindowCounts::default();
    total += WindowCounts { operations: 2, latency_us: 10, errors: 1 };
    total += WindowCounts { operations: 3, latency_us: 5, errors: 0 };
    assert_eq!(total, WindowCounts { operations: 5, latency_us: 15, errors: 1 });
}

#[test]
fn test_concurrent_adds_and_drains_lose_nothing() {
    const THREADS: u64 = 8;
    const ITERATIONS: u64 = 20_000;

    let counters = Arc::new(WorkloadCounters::new());
    let done = Arc::new(AtomicBool::new(false));

    let drainer = {
        let counters = counters.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut drained = WindowCounts::default();
            while !done.load(Ordering::Acquire) {
                drained += counters.drain();
                thread::yield_now();
            }
            drained
        })
    };

    let producers: Vec<_> = (0..THREADS)
        .map(|t| {
            let counters = counters.clone();
            thread::spawn(move || {
                let mut added = 0u64;
                for i in 0..ITERATIONS {
                    let k = (t + i) % 7 + 1;
                    counters.add_operations(k);
                    counters.add_latency_us(k * 10);
                    if i % 100 == 0 {
                        counters.add_error();
                    }
                    added += k;
                }
                added
            })
        })
        .collect();

    let expected_ops: u64 = producers.into_iter().map(|h| h.join().unwrap()).sum();
    done.store(true, Ordering::Release);

    let mut total = drainer.join().unwrap();
    total += counters.drain();

    assert_eq!(total.operations, expected_ops);
    assert_eq!(total.latency_us, expected_ops * 10);
    assert_eq!(total.errors, THREADS * (ITERATIONS / 100));
    assert!(counters.snapshot().is_empty());
}
