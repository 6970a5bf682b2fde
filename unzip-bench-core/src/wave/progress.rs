use std::sync::Arc;
use std::time::Duration;

use crate::UploadStatus;

#[derive(Debug, Clone)]
pub struct WaveProgress {
    pub wave: String,
    /// Uploads finished so far, including this one.
    pub completed: u64,
    pub total: u64,
    pub elapsed: Duration,
    pub latency: Duration,
    pub status: UploadStatus,
}

/// Called once per finished upload, from the collecting task.
pub type ProgressFn = Arc<dyn Fn(WaveProgress) + Send + Sync + 'static>;
