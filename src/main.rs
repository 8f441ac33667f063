//! # Sequential Job Queue - Demo
//! src/main.rs
//!
//! Encola `--jobs` trabajos de `--job-ms` cada uno sobre un pool de
//! workers, espera el último con `--timeout-ms` e imprime las estadísticas.

use sequential_job_queue::config::Config;
use sequential_job_queue::executor::{PoolConfig, ThreadPool};
use sequential_job_queue::jobs::SequentialJobQueue;
use sequential_job_queue::telemetry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let config = Config::new();
    telemetry::init_telemetry(&config.log_filter);
    config.validate()?;

    let config_json = serde_json::to_string(&config)?;
    info!(config = %config_json, "starting demo");

    let pool = Arc::new(ThreadPool::new(PoolConfig::from_config(&config))?);
    let queue = SequentialJobQueue::create(pool.clone());

    let started = Instant::now();
    let job_duration = config.job_duration();
    let mut handles = Vec::with_capacity(config.jobs);

    for i in 0..config.jobs {
        let handle = queue.submit(move |interrupt| {
            info!(job = i, "job running");
            interrupt.sleep(job_duration)?;
            Ok(())
        });
        handles.push(handle);
    }

    let submitted_json = serde_json::to_string(&queue.stats())?;
    info!(stats = %submitted_json, "jobs submitted");

    if let Some(last) = handles.last() {
        match last.get_timeout(config.timeout()) {
            Ok(()) => info!(elapsed_ms = started.elapsed().as_millis() as u64, "all jobs finished"),
            Err(e) => error!(error = %e, "waiting for the last job failed"),
        }
    }

    println!("{}", serde_json::to_string_pretty(&queue.stats())?);

    pool.shutdown();
    Ok(())
}
