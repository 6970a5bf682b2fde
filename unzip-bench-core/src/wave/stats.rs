use std::collections::BTreeMap;
use std::time::Duration;

use hdrhistogram::Histogram;

use crate::{UploadResult, UploadStatus};

/// Index of the 95th percentile in an ascending sample of `n`: `floor(0.95 * n)`,
/// clamped to the last element.
///
/// With 20 samples this is index 19, the maximum.
pub fn p95_index(n: usize) -> usize {
    (n * 95 / 100).min(n.saturating_sub(1))
}

fn micros(latency: Duration) -> u64 {
    u64::try_from(latency.as_micros()).unwrap_or(u64::MAX).max(1)
}

/// Occurrences per upload outcome, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusHistogram {
    counts: BTreeMap<UploadStatus, u64>,
}

impl StatusHistogram {
    pub fn record(&mut self, status: UploadStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: &UploadStatus) -> u64 {
        self.counts.get(status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn failures(&self) -> u64 {
        self.counts
            .iter()
            .filter(|(status, _)| !status.is_success())
            .map(|(_, n)| n)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UploadStatus, &u64)> {
        self.counts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn merge(&mut self, other: &Self) {
        for (status, n) in other.iter() {
            *self.counts.entry(*status).or_insert(0) += n;
        }
    }
}

/// Latency and outcome aggregate for a set of uploads.
///
/// Exact samples back the mean and p95; the HDR histogram (microseconds) backs the
/// other quantiles and merges cheaply across waves.
#[derive(Debug, Clone)]
pub struct WaveStats {
    samples: Vec<Duration>,
    latency_us: Histogram<u64>,
    statuses: StatusHistogram,
    bytes_sent: u64,
    bytes_received: u64,
}

impl Default for WaveStats {
    fn default() -> Self {
        // Track up to one hour in microseconds (with 3 sigfigs).
        let latency_us = Histogram::<u64>::new_with_bounds(1, 3_600_000_000, 3)
            .unwrap_or_else(|err| panic!("failed to init histogram: {err}"));
        Self {
            samples: Vec::new(),
            latency_us,
            statuses: StatusHistogram::default(),
            bytes_sent: 0,
            bytes_received: 0,
        }
    }
}

impl WaveStats {
    pub fn record(&mut self, result: &UploadResult) {
        self.samples.push(result.latency);
        self.latency_us.saturating_record(micros(result.latency));
        self.statuses.record(result.status);
        self.bytes_sent = self.bytes_sent.saturating_add(result.bytes_sent);
        self.bytes_received = self.bytes_received.saturating_add(result.bytes_received);
    }

    pub fn merge(&mut self, other: &Self) {
        self.samples.extend_from_slice(&other.samples);
        if let Err(err) = self.latency_us.add(&other.latency_us) {
            tracing::warn!(error = %err, "latency histogram merge failed, re-recording samples");
            for latency in &other.samples {
                self.latency_us.saturating_record(micros(*latency));
            }
        }
        self.statuses.merge(&other.statuses);
        self.bytes_sent = self.bytes_sent.saturating_add(other.bytes_sent);
        self.bytes_received = self.bytes_received.saturating_add(other.bytes_received);
    }

    pub fn count(&self) -> u64 {
        self.samples.len() as u64
    }

    pub fn statuses(&self) -> &StatusHistogram {
        &self.statuses
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Arithmetic mean over exact samples.
    pub fn mean(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / u32::try_from(self.samples.len()).unwrap_or(u32::MAX))
    }

    /// `sorted[floor(0.95 * n)]` over exact samples.
    pub fn p95(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        sorted.get(p95_index(sorted.len())).copied()
    }

    /// Quantile from the HDR histogram; resolution is about 0.1%.
    pub fn quantile(&self, q: f64) -> Option<Duration> {
        #[allow(clippy::len_zero)]
        if self.latency_us.len() == 0 {
            return None;
        }
        Some(Duration::from_micros(self.latency_us.value_at_quantile(q)))
    }

    pub fn max(&self) -> Option<Duration> {
        self.samples.iter().max().copied()
    }
}
