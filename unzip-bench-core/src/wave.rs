mod progress;
mod stats;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{Error, FixturePool, Result, Uploader};

pub use progress::{ProgressFn, WaveProgress};
pub use stats::{StatusHistogram, WaveStats, p95_index};

/// One batch of uploads issued under a fixed concurrency cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub name: String,
    pub requests: u64,
    pub concurrency: usize,
}

impl WaveConfig {
    pub fn new(name: impl Into<String>, requests: u64, concurrency: usize) -> Self {
        Self {
            name: name.into(),
            requests,
            concurrency,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::InvalidConcurrency(self.name.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WaveReport {
    pub name: String,
    pub requests: u64,
    pub concurrency: usize,
    /// From before the first submission to after the last result.
    pub elapsed: Duration,
    pub stats: WaveStats,
}

impl WaveReport {
    /// Completed uploads per second of wall clock.
    pub fn throughput(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.requests as f64 / self.elapsed.as_secs_f64().max(1e-9)
    }
}

/// Uploads `wave.requests` fixtures picked uniformly (with replacement) from `pool`.
///
/// Every upload is spawned up front; a semaphore of `wave.concurrency` permits gates how
/// many read and send at once. Results are folded in completion order. An unreadable
/// fixture aborts the wave and cancels the uploads still in flight.
pub async fn run_wave<R: Rng + ?Sized>(
    uploader: &Uploader,
    wave: &WaveConfig,
    pool: &FixturePool,
    rng: &mut R,
    progress: Option<&ProgressFn>,
) -> Result<WaveReport> {
    wave.validate()?;
    if wave.requests > 0 && pool.is_empty() {
        return Err(Error::EmptyPool);
    }

    tracing::info!(
        wave = %wave.name,
        requests = wave.requests,
        concurrency = wave.concurrency,
        "wave started"
    );

    let semaphore = Arc::new(Semaphore::new(wave.concurrency));
    let started = Instant::now();

    let mut tasks = JoinSet::new();
    for _ in 0..wave.requests {
        let fixture = pool.choose(rng).ok_or(Error::EmptyPool)?;
        let path = fixture.path.clone();
        let uploader = uploader.clone();
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            uploader.upload(&path).await
        });
    }

    let mut stats = WaveStats::default();
    let mut completed = 0u64;
    while let Some(joined) = tasks.join_next().await {
        let result = joined??;
        completed += 1;
        stats.record(&result);

        if let Some(progress) = progress {
            progress(WaveProgress {
                wave: wave.name.clone(),
                completed,
                total: wave.requests,
                elapsed: started.elapsed(),
                latency: result.latency,
                status: result.status,
            });
        }
    }

    let report = WaveReport {
        name: wave.name.clone(),
        requests: wave.requests,
        concurrency: wave.concurrency,
        elapsed: started.elapsed(),
        stats,
    };

    tracing::info!(
        wave = %report.name,
        elapsed_ms = report.elapsed.as_millis() as u64,
        failures = report.stats.statuses().failures(),
        "wave finished"
    );
    Ok(report)
}
