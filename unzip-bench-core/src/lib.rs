mod bench;
mod error;
mod fixture;
mod response;
mod scenario;
mod smoke;
mod upload;
mod wave;

pub use bench::{
    BenchCase, BenchConfig, BenchRow, DEFAULT_BENCH_SCRATCH_DIR, default_cases, run_benchmark,
};
pub use error::{Error, Result};
pub use fixture::{
    Fixture, FixtureGenerator, FixtureLayout, FixturePool, FixtureSpec, MAX_NESTING_DEPTH,
    create_fixture, write_sample_payload,
};
pub use response::{UnzipResponse, ZipNode};
pub use scenario::{
    DEFAULT_BASE_URL, DEFAULT_LOAD_SCRATCH_DIR, NoopObserver, ScenarioConfig, ScenarioObserver,
    ScenarioReport, default_pool, default_waves, run_scenario,
};
pub use smoke::{
    SmokeOutcome, SmokeParams, SmokeReport, UNZIP_SAVE_DOC_PATH, Validation,
    check_unzip_save_doc, validate_unzip_save_doc,
};
pub use upload::{
    TRANSPORT_SENTINEL, UNZIP_PATH, UPLOAD_FIELD, UploadResult, UploadStatus, Uploader,
    endpoint_url,
};
pub use wave::{
    ProgressFn, StatusHistogram, WaveConfig, WaveProgress, WaveReport, WaveStats, p95_index,
    run_wave,
};

pub use unzip_bench_http::{HttpClient, HttpTransportErrorKind};
