use std::path::PathBuf;

use crate::fixture::MAX_NESTING_DEPTH;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run.
///
/// Failed uploads are not errors: transport failures and HTTP error statuses are recorded
/// as [`crate::UploadStatus`] values and the wave carries on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to generate fixture `{}`: {source}", path.display())]
    FixtureGeneration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read fixture `{}`: {source}", path.display())]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("nesting depth {0} exceeds the maximum of {max}", max = MAX_NESTING_DEPTH)]
    DepthTooLarge(u32),

    #[error("fixture pool is empty")]
    EmptyPool,

    #[error("wave `{0}`: `concurrency` must be a positive integer")]
    InvalidConcurrency(String),

    #[error("failed to remove scratch directory `{}`: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request: {0}")]
    Http(#[from] unzip_bench_http::Error),

    #[error("upload admission closed: {0}")]
    AdmissionClosed(#[from] tokio::sync::AcquireError),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// `true` when the error comes from bad input rather than from the environment.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::DepthTooLarge(_) | Self::EmptyPool | Self::InvalidConcurrency(_) | Self::Http(_)
        )
    }
}
