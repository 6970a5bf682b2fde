use unzip_bench_core::{BenchConfig, BenchRow, HttpClient, run_benchmark};

use crate::cli::BenchArgs;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;

pub async fn bench(args: BenchArgs) -> Result<ExitCode, RunError> {
    let config = BenchConfig {
        base_url: args.target.base_url().to_string(),
        scratch_dir: args.scratch_dir.clone(),
        timeout: args.target.timeout,
        seed: args.seed,
        ..BenchConfig::default()
    }
    .filter_cases(&args.cases);

    if config.cases.is_empty() {
        return Err(RunError::InvalidInput(anyhow::anyhow!(
            "no benchmark case matches {:?}",
            args.cases
        )));
    }

    let out = output::formatter(args.output);
    out.print_bench_header(&config.base_url);

    let mut on_row = |row: &BenchRow| out.print_bench_row(row);
    let rows = run_benchmark(&config, HttpClient::default(), &mut on_row).await?;

    out.print_bench_summary(&rows);
    Ok(ExitCode::Success)
}
