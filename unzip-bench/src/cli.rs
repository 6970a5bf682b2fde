use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use unzip_bench_core::{DEFAULT_BASE_URL, DEFAULT_BENCH_SCRATCH_DIR, FixtureLayout};

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty (expected e.g. 30s, 250ms, 2m)".to_string());
    }
    // A bare number means seconds.
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s)
        .map_err(|err| format!("invalid duration '{s}': {err} (expected e.g. 30s, 250ms, 2m)"))
}

fn parse_log_filter(input: &str) -> Result<String, String> {
    tracing_subscriber::EnvFilter::try_new(input)
        .map(|_| input.to_string())
        .map_err(|e| format!("invalid log filter '{input}': {e}"))
}

fn parse_layout(input: &str) -> Result<FixtureLayout, String> {
    input
        .trim()
        .parse()
        .map_err(|_| format!("unknown layout '{input}' (expected even or weighted)"))
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables and progress bars.
    HumanReadable,
    /// Emit JSON lines (NDJSON) to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "unzip-bench",
    author,
    version,
    about = "Load, benchmark and smoke-test tool for the unzip service",
    long_about = "unzip-bench drives an external unzip service over HTTP.\n\nIt generates ZIP fixtures of controlled size and nesting, uploads them to `POST /unzip` in waves of bounded concurrency, reports latency and status statistics, and validates the `GET /unzip_save_doc` response shape.",
    after_help = "Examples:\n  unzip-bench load\n  unzip-bench load --scenario scenario.yaml --output json\n  unzip-bench bench --case 'Small Flat' --case 'Large Nested'\n  unzip-bench smoke --base-url http://localhost:8080\n  unzip-bench fixture --sample --out test_archive.zip"
)]
pub struct Cli {
    /// Log filter for diagnostics on stderr (e.g. info, debug, unzip_bench_core=trace).
    /// Overrides RUST_LOG.
    #[arg(long, global = true, value_name = "FILTER", value_parser = parse_log_filter)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the multi-wave load scenario against POST /unzip
    #[command(
        long_about = "Generate one fixture pool, run every wave in order against POST /unzip, print per-wave statistics and remove the fixtures.\n\nWithout --scenario the built-in pool and waves are used."
    )]
    Load(LoadArgs),

    /// Upload one fixture per benchmark case and print a latency table
    Bench(BenchArgs),

    /// Validate the GET /unzip_save_doc response shape
    Smoke(SmokeArgs),

    /// Write a single fixture archive to disk
    Fixture(FixtureArgs),
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Base URL of the unzip service [default: http://localhost:8080]
    #[arg(long, env = "UNZIP_BENCH_BASE_URL")]
    pub base_url: Option<String>,

    /// Per-request timeout (e.g. 30s, 500ms); no timeout when omitted
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

impl TargetArgs {
    pub(crate) fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// YAML scenario file (pool, waves, seed, timeout)
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Directory for generated fixtures, removed at the end of the run [default: load_test_data]
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Seed for fixture content and fixture selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct BenchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Directory for generated fixtures (removed at the end of the run)
    #[arg(long, default_value = DEFAULT_BENCH_SCRATCH_DIR)]
    pub scratch_dir: PathBuf,

    /// Only run the named case (repeatable, case-insensitive)
    #[arg(long = "case", value_name = "NAME")]
    pub cases: Vec<String>,

    /// Seed for fixture content
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct SmokeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Value of the document_link_id query parameter
    #[arg(long, default_value = "000000000a")]
    pub document_link_id: String,

    /// Value of the client_id query parameter
    #[arg(long, default_value = "CLIENT_TEST_001")]
    pub client_id: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct FixtureArgs {
    /// Output file; defaults to test_archive.zip for --sample, <name>.zip otherwise
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Write the fixed sample archive instead of a generated fixture
    #[arg(long, conflicts_with_all = ["size_mb", "depth", "layout", "seed"])]
    pub sample: bool,

    /// Target uncompressed size in MiB
    #[arg(long, required_unless_present = "sample")]
    pub size_mb: Option<u64>,

    /// Nesting depth of ZIP-in-ZIP archives
    #[arg(long, default_value_t = 0)]
    pub depth: u32,

    /// Entry layout: even or weighted
    #[arg(long, value_parser = parse_layout, default_value = "weighted")]
    pub layout: FixtureLayout,

    /// Seed for fixture content
    #[arg(long)]
    pub seed: Option<u64>,
}
