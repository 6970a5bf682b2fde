use unzip_bench_core::{HttpClient, ScenarioConfig, run_scenario};

use crate::cli::LoadArgs;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;
use crate::scenario_yaml::load_scenario_yaml;

pub async fn load(args: LoadArgs) -> Result<ExitCode, RunError> {
    let config = resolve_config(&args).await?;
    tracing::debug!(?config, "resolved load scenario");

    let out = output::formatter(args.output);
    out.print_load_header(&config);

    let report = run_scenario(&config, HttpClient::default(), out.as_observer()).await?;

    out.print_load_summary(&report)
        .map_err(RunError::RuntimeError)?;
    Ok(ExitCode::Success)
}

/// Built-in scenario, then the scenario file, then explicit flags.
async fn resolve_config(args: &LoadArgs) -> Result<ScenarioConfig, RunError> {
    let mut config = ScenarioConfig::default();

    if let Some(path) = &args.scenario {
        let doc = load_scenario_yaml(path)
            .await
            .map_err(RunError::InvalidInput)?;
        config = doc.apply(config);
    }

    if let Some(base_url) = &args.target.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(scratch_dir) = &args.scratch_dir {
        config.scratch_dir = scratch_dir.clone();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.target.timeout.is_some() {
        config.timeout = args.target.timeout;
    }

    Ok(config)
}
