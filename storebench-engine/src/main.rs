use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use storebench_common::PerformanceRecord;
use storebench_engine::memory::{MemoryStore, MemoryStoreConfig};
use storebench_engine::{CancellationToken, LatencyWorkload, ThroughputWorkload, WorkloadConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Latency,
    Throughput,
}

#[derive(Parser, Debug)]
#[command(name = "storebench", about = "StoreBench workload harness")]
struct Args {
    /// Which harness to run
    #[arg(long, env = "WORKLOAD", value_enum, default_value_t = Mode::Latency)]
    workload: Mode,

    /// Number of concurrent workers
    #[arg(long, env = "THREADS", default_value_t = 32)]
    threads: usize,

    /// How long to run (seconds)
    #[arg(long, env = "SECONDS", default_value_t = 60)]
    seconds: u64,

    /// Name stamped on every report
    #[arg(long, default_value = "Memory")]
    name: String,

    /// Records per throughput-mode write
    #[arg(long, default_value_t = 16)]
    batch_size: usize,

    /// Lower bound of the pause between latency-mode calls (ms)
    #[arg(long, default_value_t = 500)]
    min_delay_ms: u64,

    /// Upper bound of the pause between latency-mode calls (ms)
    #[arg(long, default_value_t = 1500)]
    max_delay_ms: u64,

    /// Latency-mode samples per in-run metric report (0 disables)
    #[arg(long, default_value_t = 100)]
    sample_every: usize,

    /// Simulated service time of each store call (ms)
    #[arg(long, default_value_t = 1)]
    store_latency_ms: u64,

    /// Fraction of store calls that fail
    #[arg(long, default_value_t = 0.0)]
    failure_rate: f64,

    /// Fraction of store calls that are throttled
    #[arg(long, default_value_t = 0.0)]
    throttle_rate: f64,

    /// Retry-after the store asks for when throttling (ms)
    #[arg(long, default_value_t = 100)]
    throttle_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let store = Arc::new(MemoryStore::new(MemoryStoreConfig {
        latency: Duration::from_millis(args.store_latency_ms),
        failure_rate: args.failure_rate,
        throttle_rate: args.throttle_rate,
        throttle_delay: Duration::from_millis(args.throttle_ms),
    }));

    let config = WorkloadConfig::new(args.name.clone())
        .with_workers(args.threads)
        .with_delay(
            Duration::from_millis(args.min_delay_ms),
            Duration::from_millis(args.max_delay_ms),
        )
        .with_sample_every(Some(args.sample_every).filter(|n| *n > 0));

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    let run_for = Duration::from_secs(args.seconds);
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(run_for) => {}
            _ = tokio::signal::ctrl_c() => tracing::info!("interrupted, stopping workers"),
        }
        stopper.cancel();
    });

    let outcome = match args.workload {
        Mode::Latency => run_latency(config, store.clone(), cancel).await,
        Mode::Throughput => run_throughput(config, store.clone(), args.batch_size, cancel).await,
    };

    match outcome {
        Ok(()) => {
            tracing::info!(records = store.len(), calls = store.calls(), "run complete");
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            process::exit(1);
        }
    }
}

async fn run_latency(
    config: WorkloadConfig,
    store: Arc<MemoryStore>,
    cancel: CancellationToken,
) -> storebench_common::Result<()> {
    let workload = LatencyWorkload::new(config)?;
    workload
        .run(
            move |record: PerformanceRecord, _cancel| {
                let store = store.clone();
                async move { store.write(&record).await }
            },
            cancel,
        )
        .await?;
    Ok(())
}

async fn run_throughput(
    config: WorkloadConfig,
    store: Arc<MemoryStore>,
    batch_size: usize,
    cancel: CancellationToken,
) -> storebench_common::Result<()> {
    let workload = ThroughputWorkload::new(config)?.with_throttle(MemoryStore::throttle);
    workload
        .run(
            move |rng: &mut StdRng, _cancel| {
                let batch: Vec<PerformanceRecord> =
                    (0..batch_size).map(|_| PerformanceRecord::with_random_id(&mut *rng)).collect();
                let store = store.clone();
                async move { store.write_batch(&batch).await }
            },
            cancel,
        )
        .await?;
    Ok(())
}
