use std::process::Command;

use anyhow::Context as _;
use serde::Deserialize;
use unzip_bench_testserver::TestServer;

#[derive(Debug, Deserialize)]
struct BenchLine {
    kind: String,
    case: String,
    size_mb: u64,
    fixture_bytes: u64,
    latency_secs: f64,
    status: String,
    status_code: Option<u16>,
    doc_ids: Option<usize>,
}

#[tokio::test]
async fn e2e_bench_uploads_each_selected_case_once() -> anyhow::Result<()> {
    let server = TestServer::start().await.context("start test server")?;
    let base_url = server.base_url().to_string();

    let dir = tempfile::tempdir()?;
    let scratch = dir.path().join("benchmark_data");

    let exe = env!("CARGO_BIN_EXE_unzip-bench");
    let scratch_arg = scratch.clone();
    let output = tokio::task::spawn_blocking(move || {
        Command::new(exe)
            .arg("bench")
            .arg("--base-url")
            .arg(&base_url)
            .arg("--scratch-dir")
            .arg(&scratch_arg)
            .arg("--case")
            .arg("small flat")
            .arg("--seed")
            .arg("3")
            .arg("--output")
            .arg("json")
            .output()
    })
    .await
    .context("spawn_blocking join")?
    .context("run unzip-bench binary")?;

    let uploads = server.stats().uploads_total();
    server.shutdown().await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::ensure!(
        output.status.success(),
        "unzip-bench failed: {:?}\nstdout:\n{stdout}\nstderr:\n{}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let rows = stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<BenchLine>(l).with_context(|| format!("parse line: {l}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    anyhow::ensure!(rows.len() == 1, "expected one row, got {rows:?}");
    let row = &rows[0];
    anyhow::ensure!(row.kind == "bench" && row.case == "Small Flat", "row {row:?}");
    anyhow::ensure!(row.size_mb == 1, "row {row:?}");
    anyhow::ensure!(
        row.fixture_bytes > 0 && row.fixture_bytes <= 1024 * 1024,
        "row {row:?}"
    );
    anyhow::ensure!(row.latency_secs > 0.0, "row {row:?}");
    anyhow::ensure!(row.status == "200" && row.status_code == Some(200), "row {row:?}");
    // Even layout, depth 0: five plain entries.
    anyhow::ensure!(row.doc_ids == Some(5), "row {row:?}");

    anyhow::ensure!(uploads == 1, "server saw {uploads} uploads");
    anyhow::ensure!(!scratch.exists(), "scratch dir should be removed after the run");

    Ok(())
}

#[tokio::test]
async fn e2e_bench_prints_a_table() -> anyhow::Result<()> {
    let server = TestServer::start().await.context("start test server")?;
    let base_url = server.base_url().to_string();
    let dir = tempfile::tempdir()?;
    let scratch = dir.path().join("bench");

    let exe = env!("CARGO_BIN_EXE_unzip-bench");
    let output = tokio::task::spawn_blocking(move || {
        Command::new(exe)
            .arg("bench")
            .arg("--base-url")
            .arg(&base_url)
            .arg("--scratch-dir")
            .arg(&scratch)
            .arg("--case")
            .arg("Small Flat")
            .output()
    })
    .await
    .context("spawn_blocking join")?
    .context("run unzip-bench binary")?;

    server.shutdown().await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::ensure!(output.status.success(), "stdout:\n{stdout}");
    anyhow::ensure!(stdout.contains("Test Case"), "stdout:\n{stdout}");
    let row = stdout
        .lines()
        .find(|l| l.starts_with("Small Flat"))
        .with_context(|| format!("no Small Flat row in:\n{stdout}"))?;
    anyhow::ensure!(row.trim_end().ends_with("| 200"), "row: {row}");
    anyhow::ensure!(stdout.contains("1 cases, 0 failed"), "stdout:\n{stdout}");
    Ok(())
}
