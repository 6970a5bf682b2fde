use crate::cli::OutputFormat;
use unzip_bench_core::{BenchRow, ScenarioConfig, ScenarioObserver, ScenarioReport, SmokeReport};

mod human;
mod json;

pub(crate) trait OutputFormatter: ScenarioObserver {
    fn as_observer(&self) -> &dyn ScenarioObserver;

    fn print_load_header(&self, config: &ScenarioConfig);
    fn print_load_summary(&self, report: &ScenarioReport) -> anyhow::Result<()>;

    fn print_bench_header(&self, base_url: &str);
    fn print_bench_row(&self, row: &BenchRow);
    fn print_bench_summary(&self, rows: &[BenchRow]);

    fn print_smoke(&self, report: &SmokeReport);
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput::new()),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
