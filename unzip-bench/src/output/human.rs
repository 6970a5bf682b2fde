use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use unzip_bench_core::{
    BenchRow, FixturePool, ProgressFn, ScenarioConfig, ScenarioObserver, ScenarioReport,
    SmokeReport, UNZIP_PATH, WaveConfig, WaveProgress, WaveReport, endpoint_url,
};

mod format;
mod progress;
mod summary;

use format::{format_bytes, format_secs};
use progress::HumanProgress;

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput {
    progress: Arc<HumanProgress>,
}

impl HumanReadableOutput {
    pub(crate) fn new() -> Self {
        Self {
            progress: Arc::new(HumanProgress::new()),
        }
    }
}

impl ScenarioObserver for HumanReadableOutput {
    fn pool_ready(&self, pool: &FixturePool) {
        for f in pool.fixtures() {
            println!(
                "  {:<16} {} depth={} entries={}",
                f.name,
                format_bytes(f.size_bytes),
                f.depth,
                f.entries
            );
        }
    }

    fn wave_started(&self, wave: &WaveConfig) {
        println!("\n>>> Running Wave: {}", wave.name);
        println!(
            "    Configuration: {} requests, {} concurrent workers",
            wave.requests, wave.concurrency
        );
    }

    fn progress_fn(&self) -> Option<ProgressFn> {
        let progress = self.progress.clone();
        let failures: Arc<Mutex<HashMap<String, u64>>> = Arc::new(Mutex::new(HashMap::new()));

        Some(Arc::new(move |p: WaveProgress| {
            let failed = {
                let mut inner = failures
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                let count = inner.entry(p.wave.clone()).or_insert(0);
                if !p.status.is_success() {
                    *count += 1;
                }
                *count
            };

            let message = format!(
                "last={} status={} failed={failed} elapsed={:.1}s",
                format_secs(p.latency),
                p.status,
                p.elapsed.as_secs_f64()
            );
            progress.update(&p.wave, p.completed, p.total, message);
        }))
    }

    fn wave_finished(&self, report: &WaveReport) {
        self.progress.finish(&report.name);
        print!("{}", summary::render_wave(report));
    }

    fn cleaned_up(&self, dir: &Path) {
        self.progress.finish_all();
        println!("\nTest data cleaned up ({}).", dir.display());
    }
}

impl OutputFormatter for HumanReadableOutput {
    fn as_observer(&self) -> &dyn ScenarioObserver {
        self
    }

    fn print_load_header(&self, config: &ScenarioConfig) {
        println!("target: {}", endpoint_url(&config.base_url, UNZIP_PATH));
        println!(
            "Generating test data pool ({} fixtures in {})...",
            config.pool.len(),
            config.scratch_dir.display()
        );
    }

    fn print_load_summary(&self, report: &ScenarioReport) -> anyhow::Result<()> {
        self.progress.finish_all();
        print!("{}", summary::render_scenario(report));
        Ok(())
    }

    fn print_bench_header(&self, base_url: &str) {
        println!("Starting Benchmark...");
        println!("target: {}", endpoint_url(base_url, UNZIP_PATH));
        println!("Generating zip files and testing endpoint...\n");
        print!("{}", summary::render_bench_header());
    }

    fn print_bench_row(&self, row: &BenchRow) {
        print!("{}", summary::render_bench_row(row));
    }

    fn print_bench_summary(&self, rows: &[BenchRow]) {
        print!("{}", summary::render_bench_summary(rows));
    }

    fn print_smoke(&self, report: &SmokeReport) {
        print!("{}", summary::render_smoke(report));
    }
}
