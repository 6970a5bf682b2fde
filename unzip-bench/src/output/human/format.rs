use std::time::Duration;

use unzip_bench_core::StatusHistogram;

pub(crate) fn format_bytes(b: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    const GIB: u64 = 1024 * 1024 * 1024;

    if b >= GIB {
        return format!("{:.2}GiB", (b as f64) / (GIB as f64));
    }
    if b >= MIB {
        return format!("{:.2}MiB", (b as f64) / (MIB as f64));
    }
    if b >= KIB {
        return format!("{:.2}KiB", (b as f64) / (KIB as f64));
    }

    format!("{b}B")
}

pub(crate) fn format_rate(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.2}")
    } else {
        "0.00".to_string()
    }
}

/// Seconds with four decimals, the resolution latency tables are read at.
pub(crate) fn format_secs(d: Duration) -> String {
    format!("{:.4}s", d.as_secs_f64())
}

pub(crate) fn format_secs_opt(d: Option<Duration>) -> String {
    d.map(format_secs).unwrap_or_else(|| "-".to_string())
}

/// `{200: 48, 503: 2}` in status order.
pub(crate) fn format_statuses(statuses: &StatusHistogram) -> String {
    let inner = statuses
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{inner}}}")
}
