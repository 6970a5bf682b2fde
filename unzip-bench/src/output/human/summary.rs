use std::fmt::Write as _;

use unzip_bench_core::{BenchRow, ScenarioReport, SmokeOutcome, SmokeReport, WaveReport};

use super::format::*;

const BENCH_RULE_WIDTH: usize = 70;

pub(crate) fn render_wave(report: &WaveReport) -> String {
    let mut out = String::new();
    let stats = &report.stats;

    writeln!(&mut out, "    Duration: {:.2}s", report.elapsed.as_secs_f64()).ok();
    writeln!(
        &mut out,
        "    Throughput: {} req/s",
        format_rate(report.throughput())
    )
    .ok();
    writeln!(&mut out, "    Avg Latency: {}", format_secs_opt(stats.mean())).ok();
    writeln!(&mut out, "    P95 Latency: {}", format_secs_opt(stats.p95())).ok();
    writeln!(
        &mut out,
        "    Status Codes: {}",
        format_statuses(stats.statuses())
    )
    .ok();

    out
}

pub(crate) fn render_scenario(report: &ScenarioReport) -> String {
    let mut out = String::new();
    let totals = &report.totals;

    out.push_str("\nsummary\n");
    for wave in &report.waves {
        writeln!(
            &mut out,
            "  {:<20} requests={:<5} concurrency={:<4} rps={} p95={}",
            wave.name,
            wave.requests,
            wave.concurrency,
            format_rate(wave.throughput()),
            format_secs_opt(wave.stats.p95()),
        )
        .ok();
    }

    writeln!(
        &mut out,
        "  total: {} requests ({} failed) in {:.2}s",
        report.requests(),
        totals.statuses().failures(),
        report.elapsed.as_secs_f64()
    )
    .ok();
    writeln!(
        &mut out,
        "  bytes: sent {} recv {}",
        format_bytes(totals.bytes_sent()),
        format_bytes(totals.bytes_received())
    )
    .ok();
    if let Some(max) = totals.max() {
        writeln!(
            &mut out,
            "  latency: avg {} p95 {} max {}",
            format_secs_opt(totals.mean()),
            format_secs_opt(totals.p95()),
            format_secs(max)
        )
        .ok();
    }

    out
}

pub(crate) fn render_bench_header() -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "{:<30} | {:<10} | {:<12} | {:<8}",
        "Test Case", "Size (MB)", "Latency (s)", "Status"
    )
    .ok();
    writeln!(&mut out, "{}", "-".repeat(BENCH_RULE_WIDTH)).ok();
    out
}

pub(crate) fn render_bench_row(row: &BenchRow) -> String {
    format!(
        "{:<30} | {:<10} | {:<12.4} | {:<8}\n",
        row.case.name,
        row.case.size_mb,
        row.result.latency.as_secs_f64(),
        row.result.status.to_string(),
    )
}

pub(crate) fn render_bench_summary(rows: &[BenchRow]) -> String {
    let failed = rows.iter().filter(|r| !r.result.status.is_success()).count();
    format!(
        "{}\n{} cases, {} failed\n",
        "-".repeat(BENCH_RULE_WIDTH),
        rows.len(),
        failed
    )
}

pub(crate) fn render_smoke(report: &SmokeReport) -> String {
    let mut out = String::new();

    writeln!(&mut out, "URL: {}", report.url).ok();
    match report.status() {
        Some(status) => writeln!(&mut out, "Response Status Code: {status}").ok(),
        None => writeln!(&mut out, "Response Status Code: -").ok(),
    };
    writeln!(&mut out, "Latency: {}", format_secs(report.latency)).ok();

    match &report.outcome {
        SmokeOutcome::Checked { body, validations } => {
            out.push_str("\nResponse JSON received:\n");
            let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
            writeln!(&mut out, "{pretty}").ok();

            out.push_str("\nValidations:\n");
            for v in validations {
                let mark = if v.passed { "ok  " } else { "FAIL" };
                writeln!(&mut out, "  [{mark}] {}: {}", v.name, v.detail).ok();
            }
        }
        SmokeOutcome::UnexpectedStatus { .. }
        | SmokeOutcome::InvalidJson { .. }
        | SmokeOutcome::Transport { .. } => {
            for msg in report.failure_messages() {
                writeln!(&mut out, "{msg}").ok();
            }
        }
    }

    if report.passed() {
        out.push_str("\nTEST PASSED: endpoint is functioning correctly.\n");
    } else {
        out.push_str("\nTEST FAILED: response validation failed.\n");
    }
    out
}
