mod bench;
mod cli;
mod exit_codes;
mod fixture;
mod load;
mod logging;
mod output;
mod run_error;
mod scenario_yaml;
mod smoke;

use clap::Parser;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    let cli = match cli::Cli::try_parse() {
        Ok(v) => v,
        Err(err) => {
            use clap::error::ErrorKind;
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    exit_codes::ExitCode::Success.as_i32()
                }
                _ => exit_codes::ExitCode::InvalidInput.as_i32(),
            };
            std::process::exit(code);
        }
    };

    if let Err(err) = logging::init(cli.log_level.as_deref()) {
        eprintln!("invalid --log-level: {err}");
        std::process::exit(exit_codes::ExitCode::InvalidInput.as_i32());
    }

    let result = match cli.command {
        cli::Command::Load(args) => load::load(args).await,
        cli::Command::Bench(args) => bench::bench(args).await,
        cli::Command::Smoke(args) => smoke::smoke(args).await,
        cli::Command::Fixture(args) => fixture::fixture(args).await,
    };

    let code = match result {
        Ok(code) => code.as_i32(),
        Err(err) => {
            eprintln!("{err}");
            err.exit_code().as_i32()
        }
    };

    std::process::exit(code);
}
