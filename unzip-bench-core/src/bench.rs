use std::path::PathBuf;
use std::time::Duration;

use unzip_bench_http::HttpClient;

use crate::{
    DEFAULT_BASE_URL, FixtureLayout, FixturePool, FixtureSpec, Result, UnzipResponse,
    UploadResult, Uploader,
};

pub const DEFAULT_BENCH_SCRATCH_DIR: &str = "benchmark_data";

/// One single-upload measurement: a fixture size and nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchCase {
    pub name: String,
    pub size_mb: u64,
    pub depth: u32,
}

impl BenchCase {
    pub fn new(name: impl Into<String>, size_mb: u64, depth: u32) -> Self {
        Self {
            name: name.into(),
            size_mb,
            depth,
        }
    }

    // File stem for the fixture, e.g. "Medium Nested" -> "medium_nested".
    fn fixture_name(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

pub fn default_cases() -> Vec<BenchCase> {
    vec![
        BenchCase::new("Small Flat", 1, 0),
        BenchCase::new("Medium Flat", 10, 0),
        BenchCase::new("Medium Nested", 10, 1),
        BenchCase::new("Large Flat", 50, 0),
        BenchCase::new("Large Nested", 50, 1),
    ]
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub base_url: String,
    pub scratch_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub seed: Option<u64>,
    pub cases: Vec<BenchCase>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            scratch_dir: PathBuf::from(DEFAULT_BENCH_SCRATCH_DIR),
            timeout: None,
            seed: None,
            cases: default_cases(),
        }
    }
}

impl BenchConfig {
    /// Keeps only the cases whose name matches one of `names` (case-insensitive).
    /// An empty filter keeps everything.
    #[must_use]
    pub fn filter_cases(mut self, names: &[String]) -> Self {
        if !names.is_empty() {
            self.cases
                .retain(|case| names.iter().any(|n| n.eq_ignore_ascii_case(&case.name)));
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct BenchRow {
    pub case: BenchCase,
    /// Compressed fixture size on disk.
    pub fixture_bytes: u64,
    pub result: UploadResult,
}

impl BenchRow {
    /// The service's answer, when it decodes as an unzip response.
    pub fn response(&self) -> Option<UnzipResponse> {
        if !self.result.status.is_success() {
            return None;
        }
        UnzipResponse::from_slice(&self.result.body).ok()
    }
}

/// For each case: generate its fixture, upload it once, delete it. `on_row` sees each
/// measurement as soon as it is taken. The scratch directory is removed at the end.
pub async fn run_benchmark(
    config: &BenchConfig,
    client: HttpClient,
    on_row: &mut (dyn FnMut(&BenchRow) + Send),
) -> Result<Vec<BenchRow>> {
    let mut pool = FixturePool::open(&config.scratch_dir, config.seed).await?;
    let uploader = Uploader::new(client, &config.base_url).timeout(config.timeout);

    let mut rows = Vec::with_capacity(config.cases.len());
    let outcome = async {
        for case in &config.cases {
            let spec = FixtureSpec::new(case.fixture_name(), case.size_mb, case.depth)
                .layout(FixtureLayout::Even);
            let fixture = pool.add(spec).await?.clone();

            let result = uploader.upload(&fixture.path).await?;
            tracing::info!(
                case = %case.name,
                status = %result.status,
                latency_ms = result.latency.as_millis() as u64,
                "benchmark case finished"
            );

            let row = BenchRow {
                case: case.clone(),
                fixture_bytes: fixture.size_bytes,
                result,
            };
            on_row(&row);
            rows.push(row);

            pool.remove(&fixture.name).await?;
        }
        Ok::<_, crate::Error>(())
    }
    .await;

    let cleanup = pool.cleanup().await;
    outcome?;
    cleanup?;
    Ok(rows)
}
