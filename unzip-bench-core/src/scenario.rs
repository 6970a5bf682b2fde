use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::SeedableRng as _;
use rand::rngs::SmallRng;
use unzip_bench_http::HttpClient;

use crate::{
    FixtureLayout, FixturePool, FixtureSpec, ProgressFn, Result, Uploader, WaveConfig,
    WaveReport, WaveStats, run_wave,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOAD_SCRATCH_DIR: &str = "load_test_data";

/// Hooks for rendering a scenario while it runs. Every method defaults to a no-op.
pub trait ScenarioObserver: Send + Sync {
    fn pool_ready(&self, _pool: &FixturePool) {}

    fn wave_started(&self, _wave: &WaveConfig) {}

    fn progress_fn(&self) -> Option<ProgressFn> {
        None
    }

    fn wave_finished(&self, _report: &WaveReport) {}

    fn cleaned_up(&self, _dir: &Path) {}
}

/// Observer that renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScenarioObserver for NoopObserver {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    pub base_url: String,
    pub scratch_dir: PathBuf,
    pub seed: Option<u64>,
    /// Per-upload deadline; `None` waits for the service indefinitely.
    pub timeout: Option<Duration>,
    pub pool: Vec<FixtureSpec>,
    pub waves: Vec<WaveConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            scratch_dir: PathBuf::from(DEFAULT_LOAD_SCRATCH_DIR),
            seed: None,
            timeout: None,
            pool: default_pool(),
            waves: default_waves(),
        }
    }
}

pub fn default_pool() -> Vec<FixtureSpec> {
    [("small_flat", 1, 0), ("medium_nested", 5, 1), ("large_mixed", 15, 2)]
        .into_iter()
        .map(|(name, size_mb, depth)| {
            FixtureSpec::new(name, size_mb, depth).layout(FixtureLayout::Weighted)
        })
        .collect()
}

pub fn default_waves() -> Vec<WaveConfig> {
    vec![
        WaveConfig::new("Warmup", 10, 2),
        WaveConfig::new("Sustainable Load", 50, 10),
        WaveConfig::new("Spike Test", 100, 30),
        WaveConfig::new("Stress Test", 50, 50),
    ]
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub waves: Vec<WaveReport>,
    /// All waves merged.
    pub totals: WaveStats,
    pub elapsed: Duration,
}

impl ScenarioReport {
    pub fn requests(&self) -> u64 {
        self.waves.iter().map(|w| w.requests).sum()
    }
}

/// Generates the fixture pool once, runs every wave in order, then removes the scratch
/// directory whether or not the waves succeeded.
pub async fn run_scenario(
    config: &ScenarioConfig,
    client: HttpClient,
    observer: &dyn ScenarioObserver,
) -> Result<ScenarioReport> {
    for wave in &config.waves {
        wave.validate()?;
    }

    let started = Instant::now();
    let pool = FixturePool::generate(&config.scratch_dir, &config.pool, config.seed).await?;
    observer.pool_ready(&pool);

    let outcome = run_waves(config, client, &pool, observer).await;

    let dir = pool.dir().to_path_buf();
    let cleanup = pool.cleanup().await;
    observer.cleaned_up(&dir);

    let waves = match (outcome, cleanup) {
        (Ok(waves), Ok(())) => waves,
        (Ok(_), Err(err)) => return Err(err),
        (Err(err), cleanup) => {
            if let Err(cleanup_err) = cleanup {
                tracing::warn!(error = %cleanup_err, "scratch cleanup failed after wave error");
            }
            return Err(err);
        }
    };

    let mut totals = WaveStats::default();
    for wave in &waves {
        totals.merge(&wave.stats);
    }

    Ok(ScenarioReport {
        waves,
        totals,
        elapsed: started.elapsed(),
    })
}

async fn run_waves(
    config: &ScenarioConfig,
    client: HttpClient,
    pool: &FixturePool,
    observer: &dyn ScenarioObserver,
) -> Result<Vec<WaveReport>> {
    let uploader = Uploader::new(client, &config.base_url).timeout(config.timeout);
    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let progress = observer.progress_fn();

    let mut reports = Vec::with_capacity(config.waves.len());
    for wave in &config.waves {
        observer.wave_started(wave);
        let report = run_wave(&uploader, wave, pool, &mut rng, progress.as_ref()).await?;
        observer.wave_finished(&report);
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::{Error, UploadStatus};
    use std::sync::Mutex;
    use unzip_bench_testserver::TestServer;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ScenarioObserver for Recorder {
        fn pool_ready(&self, pool: &FixturePool) {
            self.push(format!("pool:{}", pool.len()));
        }

        fn wave_started(&self, wave: &WaveConfig) {
            self.push(format!("start:{}", wave.name));
        }

        fn wave_finished(&self, report: &WaveReport) {
            self.push(format!("finish:{}", report.name));
        }

        fn cleaned_up(&self, _dir: &Path) {
            self.push("cleanup".to_string());
        }
    }

    impl Recorder {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn small_config(base_url: String, scratch: PathBuf) -> ScenarioConfig {
        ScenarioConfig {
            base_url,
            scratch_dir: scratch,
            seed: Some(17),
            timeout: Some(Duration::from_secs(10)),
            pool: vec![FixtureSpec::new("tiny", 1, 0), FixtureSpec::new("nested", 1, 2)],
            waves: vec![WaveConfig::new("one", 3, 1), WaveConfig::new("two", 6, 3)],
        }
    }

    #[test]
    fn defaults_match_the_load_test() {
        let config = ScenarioConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.scratch_dir, PathBuf::from("load_test_data"));

        let waves: Vec<_> = config
            .waves
            .iter()
            .map(|w| (w.name.as_str(), w.requests, w.concurrency))
            .collect();
        assert_eq!(
            waves,
            [
                ("Warmup", 10, 2),
                ("Sustainable Load", 50, 10),
                ("Spike Test", 100, 30),
                ("Stress Test", 50, 50),
            ]
        );

        let sizes: Vec<_> = config.pool.iter().map(|f| (f.size_mb, f.depth)).collect();
        assert_eq!(sizes, [(1, 0), (5, 1), (15, 2)]);
    }

    #[tokio::test]
    async fn runs_waves_in_order_and_cleans_up() {
        let server = TestServer::start().await.unwrap();
        let root = tempfile::tempdir().unwrap();
        let scratch = root.path().join("load_test_data");
        let config = small_config(server.base_url().to_string(), scratch.clone());

        let recorder = Recorder::default();
        let report = run_scenario(&config, HttpClient::default(), &recorder)
            .await
            .unwrap();

        assert_eq!(report.waves.len(), 2);
        assert_eq!(report.requests(), 9);
        assert_eq!(report.totals.count(), 9);
        assert_eq!(
            report.totals.statuses().get(&UploadStatus::Success(200)),
            9
        );
        assert!(!scratch.exists());
        assert_eq!(
            *recorder.events.lock().unwrap(),
            [
                "pool:2",
                "start:one",
                "finish:one",
                "start:two",
                "finish:two",
                "cleanup"
            ]
        );
    }

    #[tokio::test]
    async fn invalid_wave_is_rejected_before_generating_fixtures() {
        let root = tempfile::tempdir().unwrap();
        let scratch = root.path().join("never");
        let mut config = small_config("http://127.0.0.1:9".to_string(), scratch.clone());
        config.waves.push(WaveConfig::new("broken", 1, 0));

        let err = run_scenario(&config, HttpClient::default(), &NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConcurrency(_)));
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn failed_wave_still_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let scratch = root.path().join("load_test_data");
        let mut config = small_config("http://127.0.0.1:9".to_string(), scratch.clone());
        config.pool.clear();

        let err = run_scenario(&config, HttpClient::default(), &NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyPool));
        assert!(!scratch.exists());
    }
}
