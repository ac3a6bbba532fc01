//! Drive two synthetic jobs and print a per-job summary.
//!
//! Run: `cargo run -p omni-stress --example synthetic_load`
//! Logging: `RUST_LOG=omni_stress=debug` shows scheduler diagnostics on stderr.
//! Ctrl+C stops admissions early; in-flight work still drains.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use omni_stress::{FallibleJob, Job, RunSummary, Runner};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("omni_stress=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let fast: FallibleJob = Job::new("fast", || async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(())
    })
    .with_runs(200)
    .with_concurrency(16);

    let slow: FallibleJob = Job::new("slow", || async {
        tokio::time::sleep(Duration::from_millis(40)).await;
        anyhow::ensure!(accepted_by_slow_endpoint(), "slow endpoint rejected the request");
        Ok(())
    })
    .with_runs(50);

    let summary = Arc::new(Mutex::new(RunSummary::new()));
    let sink = Arc::clone(&summary);
    let runner = Runner::new(4, vec![fast, slow], move |result| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_outcome(&result);
    })?;

    let stop = runner.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    runner.start().await?;

    let summary = summary.lock().unwrap_or_else(PoisonError::into_inner);
    for (name, stats) in summary.jobs() {
        println!(
            "{name}: completed={} failed={} mean={:?} min={:?} max={:?}",
            stats.completed,
            stats.failed,
            stats.mean_took().unwrap_or_default(),
            stats.min_took.unwrap_or_default(),
            stats.max_took.unwrap_or_default(),
        );
    }
    Ok(())
}

fn accepted_by_slow_endpoint() -> bool {
    chrono::Utc::now().timestamp_subsec_micros() % 10 != 0
}
