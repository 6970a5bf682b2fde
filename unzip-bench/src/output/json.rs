use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write as _;
use std::time::Duration;

use unzip_bench_core::{
    BenchRow, FixturePool, ScenarioConfig, ScenarioObserver, ScenarioReport, SmokeOutcome,
    SmokeReport, StatusHistogram, WaveReport, WaveStats,
};

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl ScenarioObserver for JsonOutput {
    fn pool_ready(&self, pool: &FixturePool) {
        emit_json_line(&build_pool_line(pool));
    }

    fn wave_finished(&self, report: &WaveReport) {
        emit_json_line(&build_wave_line(report));
    }
}

impl OutputFormatter for JsonOutput {
    fn as_observer(&self) -> &dyn ScenarioObserver {
        self
    }

    fn print_load_header(&self, _config: &ScenarioConfig) {}

    fn print_load_summary(&self, report: &ScenarioReport) -> anyhow::Result<()> {
        emit_json_line(&build_summary_line(report));
        Ok(())
    }

    fn print_bench_header(&self, _base_url: &str) {}

    fn print_bench_row(&self, row: &BenchRow) {
        emit_json_line(&build_bench_line(row));
    }

    fn print_bench_summary(&self, _rows: &[BenchRow]) {}

    fn print_smoke(&self, report: &SmokeReport) {
        emit_json_line(&build_smoke_line(report));
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonPoolLine {
    pub kind: &'static str,
    pub dir: String,
    pub fixtures: Vec<JsonFixture>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonFixture {
    pub name: String,
    pub size_bytes: u64,
    pub target_bytes: u64,
    pub depth: u32,
    pub entries: usize,
}

fn build_pool_line(pool: &FixturePool) -> JsonPoolLine {
    JsonPoolLine {
        kind: "pool",
        dir: pool.dir().display().to_string(),
        fixtures: pool
            .fixtures()
            .iter()
            .map(|f| JsonFixture {
                name: f.name.clone(),
                size_bytes: f.size_bytes,
                target_bytes: f.target_bytes,
                depth: f.depth,
                entries: f.entries,
            })
            .collect(),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonLatency {
    pub mean_secs: Option<f64>,
    pub p95_secs: Option<f64>,
    pub p99_secs: Option<f64>,
    pub max_secs: Option<f64>,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonWaveLine {
    pub kind: &'static str,
    pub wave: String,
    pub requests: u64,
    pub concurrency: usize,
    pub elapsed_secs: f64,
    pub throughput: f64,
    pub failed_requests_total: u64,
    pub bytes_sent_total: u64,
    pub bytes_received_total: u64,
    pub statuses: BTreeMap<String, u64>,
    pub latency: JsonLatency,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSummaryLine {
    pub kind: &'static str,
    pub waves: Vec<String>,
    pub requests_total: u64,
    pub failed_requests_total: u64,
    pub elapsed_secs: f64,
    pub bytes_sent_total: u64,
    pub bytes_received_total: u64,
    pub statuses: BTreeMap<String, u64>,
    pub latency: JsonLatency,
}

fn secs(d: Option<Duration>) -> Option<f64> {
    d.map(|d| d.as_secs_f64())
}

fn build_statuses(statuses: &StatusHistogram) -> BTreeMap<String, u64> {
    statuses
        .iter()
        .map(|(status, count)| (status.to_string(), *count))
        .collect()
}

fn build_latency(stats: &WaveStats) -> JsonLatency {
    JsonLatency {
        mean_secs: secs(stats.mean()),
        p95_secs: secs(stats.p95()),
        p99_secs: secs(stats.quantile(0.99)),
        max_secs: secs(stats.max()),
        count: stats.count(),
    }
}

fn build_wave_line(report: &WaveReport) -> JsonWaveLine {
    let stats = &report.stats;
    JsonWaveLine {
        kind: "wave",
        wave: report.name.clone(),
        requests: report.requests,
        concurrency: report.concurrency,
        elapsed_secs: report.elapsed.as_secs_f64(),
        throughput: report.throughput(),
        failed_requests_total: stats.statuses().failures(),
        bytes_sent_total: stats.bytes_sent(),
        bytes_received_total: stats.bytes_received(),
        statuses: build_statuses(stats.statuses()),
        latency: build_latency(stats),
    }
}

fn build_summary_line(report: &ScenarioReport) -> JsonSummaryLine {
    let totals = &report.totals;
    JsonSummaryLine {
        kind: "summary",
        waves: report.waves.iter().map(|w| w.name.clone()).collect(),
        requests_total: report.requests(),
        failed_requests_total: totals.statuses().failures(),
        elapsed_secs: report.elapsed.as_secs_f64(),
        bytes_sent_total: totals.bytes_sent(),
        bytes_received_total: totals.bytes_received(),
        statuses: build_statuses(totals.statuses()),
        latency: build_latency(totals),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonBenchLine {
    pub kind: &'static str,
    pub case: String,
    pub size_mb: u64,
    pub depth: u32,
    pub fixture_bytes: u64,
    pub latency_secs: f64,
    pub status: String,
    pub status_code: Option<u16>,
    /// Transport failures as 999, for older report consumers.
    pub legacy_status: u16,
    pub doc_ids: Option<usize>,
}

fn build_bench_line(row: &BenchRow) -> JsonBenchLine {
    JsonBenchLine {
        kind: "bench",
        case: row.case.name.clone(),
        size_mb: row.case.size_mb,
        depth: row.case.depth,
        fixture_bytes: row.fixture_bytes,
        latency_secs: row.result.latency.as_secs_f64(),
        status: row.result.status.to_string(),
        status_code: row.result.status.code(),
        legacy_status: row.result.status.legacy_code(),
        doc_ids: row.response().map(|r| r.doc_ids.len()),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSmokeLine {
    pub kind: &'static str,
    pub url: String,
    pub passed: bool,
    pub status: Option<u16>,
    pub latency_secs: f64,
    pub validations: Vec<JsonValidation>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonValidation {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

fn build_smoke_line(report: &SmokeReport) -> JsonSmokeLine {
    let validations = match &report.outcome {
        SmokeOutcome::Checked { validations, .. } => validations
            .iter()
            .map(|v| JsonValidation {
                name: v.name,
                passed: v.passed,
                detail: v.detail.clone(),
            })
            .collect(),
        _ => Vec::new(),
    };

    JsonSmokeLine {
        kind: "smoke",
        url: report.url.clone(),
        passed: report.passed(),
        status: report.status(),
        latency_secs: report.latency.as_secs_f64(),
        validations,
        errors: report.failure_messages(),
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use unzip_bench_core::{
        BenchCase, HttpTransportErrorKind, UploadResult, UploadStatus, WaveStats,
    };

    fn to_value<T: Serialize>(line: &T) -> Value {
        match serde_json::to_value(line) {
            Ok(v) => v,
            Err(err) => panic!("to_value failed: {err}"),
        }
    }

    fn result(ms: u64, status: UploadStatus) -> UploadResult {
        UploadResult {
            latency: Duration::from_millis(ms),
            status,
            bytes_sent: 100,
            bytes_received: 10,
            body: Default::default(),
        }
    }

    #[test]
    fn wave_line_has_histogram_and_latency() {
        let mut stats = WaveStats::default();
        stats.record(&result(100, UploadStatus::Success(200)));
        stats.record(&result(300, UploadStatus::HttpError(503)));
        stats.record(&result(
            200,
            UploadStatus::Transport(HttpTransportErrorKind::Timeout),
        ));

        let report = WaveReport {
            name: "Warmup".to_string(),
            requests: 3,
            concurrency: 2,
            elapsed: Duration::from_secs(1),
            stats,
        };

        let v = to_value(&build_wave_line(&report));
        assert_eq!(v.get("kind").and_then(Value::as_str), Some("wave"));
        assert_eq!(v.get("wave").and_then(Value::as_str), Some("Warmup"));
        assert_eq!(
            v.get("failed_requests_total").and_then(Value::as_u64),
            Some(2)
        );
        assert_eq!(v.pointer("/statuses/200").and_then(Value::as_u64), Some(1));
        assert_eq!(v.pointer("/statuses/503").and_then(Value::as_u64), Some(1));
        assert_eq!(
            v.pointer("/statuses/transport:timeout")
                .and_then(Value::as_u64),
            Some(1)
        );
        assert_eq!(v.pointer("/latency/count").and_then(Value::as_u64), Some(3));
        assert_eq!(
            v.pointer("/latency/p95_secs").and_then(Value::as_f64),
            Some(0.3)
        );
        assert_eq!(v.get("throughput").and_then(Value::as_f64), Some(3.0));
    }

    #[test]
    fn bench_line_keeps_legacy_status() {
        let row = BenchRow {
            case: BenchCase::new("Large Nested", 50, 1),
            fixture_bytes: 4096,
            result: result(
                1500,
                UploadStatus::Transport(HttpTransportErrorKind::Connect),
            ),
        };

        let v = to_value(&build_bench_line(&row));
        assert_eq!(v.get("kind").and_then(Value::as_str), Some("bench"));
        assert_eq!(v.get("status_code"), Some(&Value::Null));
        assert_eq!(v.get("legacy_status").and_then(Value::as_u64), Some(999));
        assert_eq!(
            v.get("status").and_then(Value::as_str),
            Some("transport:connect")
        );
        assert_eq!(v.get("doc_ids"), Some(&Value::Null));
    }

    #[test]
    fn smoke_line_reports_transport_failure() {
        let report = SmokeReport {
            url: "http://127.0.0.1:9/unzip_save_doc".to_string(),
            latency: Duration::from_millis(2),
            outcome: SmokeOutcome::Transport {
                kind: HttpTransportErrorKind::Connect,
                message: "connection refused".to_string(),
            },
        };

        let v = to_value(&build_smoke_line(&report));
        assert_eq!(v.get("kind").and_then(Value::as_str), Some("smoke"));
        assert_eq!(v.get("passed").and_then(Value::as_bool), Some(false));
        assert_eq!(v.get("status"), Some(&Value::Null));
        assert_eq!(
            v.get("errors")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(1)
        );
    }
}
