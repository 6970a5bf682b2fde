use unzip_bench_core::{HttpClient, SmokeParams, check_unzip_save_doc};

use crate::cli::SmokeArgs;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;

pub async fn smoke(args: SmokeArgs) -> Result<ExitCode, RunError> {
    let params = SmokeParams {
        document_link_id: args.document_link_id,
        client_id: args.client_id,
    };

    let out = output::formatter(args.output);
    let report = check_unzip_save_doc(
        &HttpClient::default(),
        args.target.base_url(),
        &params,
        args.target.timeout,
    )
    .await?;

    out.print_smoke(&report);

    if report.passed() {
        Ok(ExitCode::Success)
    } else {
        for msg in report.failure_messages() {
            tracing::warn!("{msg}");
        }
        Ok(ExitCode::SmokeFailed)
    }
}
