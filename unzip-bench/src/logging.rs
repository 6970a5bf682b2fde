use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Diagnostics go to stderr so stdout stays clean for results and NDJSON.
///
/// `--log-level` wins over `RUST_LOG`; with neither, only warnings are shown. A malformed
/// `--log-level` is an error, a malformed `RUST_LOG` falls back to the default.
pub(crate) fn init(level: Option<&str>) -> Result<(), ParseError> {
    let env_filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
