use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Json;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::{Duration, sleep};

mod archive;

pub const PATH_UNZIP: &str = "/unzip";
pub const PATH_UNZIP_SAVE_DOC: &str = "/unzip_save_doc";

const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    uploads_total: Arc<AtomicU64>,
    save_doc_requests_total: Arc<AtomicU64>,
    unzip_in_flight: Arc<AtomicU64>,
    unzip_in_flight_peak: Arc<AtomicU64>,
}

impl TestServerStats {
    fn inc_uploads_total(&self) {
        self.uploads_total.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_save_doc_requests_total(&self) {
        self.save_doc_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    fn enter_unzip(&self) -> InFlight {
        let now = self.unzip_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.unzip_in_flight_peak.fetch_max(now, Ordering::SeqCst);
        InFlight(self.unzip_in_flight.clone())
    }

    /// Well-formed `/unzip` uploads received (a `file` field was present).
    pub fn uploads_total(&self) -> u64 {
        self.uploads_total.load(Ordering::Relaxed)
    }

    pub fn save_doc_requests_total(&self) -> u64 {
        self.save_doc_requests_total.load(Ordering::Relaxed)
    }

    /// Highest number of `/unzip` requests handled at the same time.
    pub fn unzip_in_flight_peak(&self) -> u64 {
        self.unzip_in_flight_peak.load(Ordering::SeqCst)
    }
}

struct InFlight(Arc<AtomicU64>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Knobs for exercising client error paths.
#[derive(Debug, Clone, Default)]
pub struct TestServerConfig {
    /// Answer every upload with this status instead of listing the archive.
    pub unzip_status: Option<u16>,
    /// Hold each upload this long before answering.
    pub unzip_delay: Option<Duration>,
    /// Answer every upload with 200 and this JSON body instead of listing the archive.
    pub unzip_body: Option<&'static str>,
    /// Answer `/unzip_save_doc` with this status and a plain-text body.
    pub save_doc_status: Option<u16>,
}

#[derive(Clone)]
struct AppState {
    stats: TestServerStats,
    config: Arc<TestServerConfig>,
}

fn forced(status: u16) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, "forced status").into_response()
}

async fn handle_unzip(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let _in_flight = state.stats.enter_unzip();

    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let file_name = field.file_name().unwrap_or("upload.zip").to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((file_name, bytes)),
                    Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
                }
            }
            Ok(None) => break,
            Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        }
    }

    let Some((file_name, bytes)) = upload else {
        return (StatusCode::BAD_REQUEST, "missing multipart field `file`").into_response();
    };
    state.stats.inc_uploads_total();

    if let Some(delay) = state.config.unzip_delay {
        sleep(delay).await;
    }
    if let Some(status) = state.config.unzip_status {
        return forced(status);
    }
    if let Some(body) = state.config.unzip_body {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response();
    }
    if bytes.is_empty() {
        return (StatusCode::BAD_REQUEST, "empty file").into_response();
    }

    match archive::walk_upload(&file_name, &bytes) {
        Ok(body) => Json(body).into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, format!("invalid zip: {err}")).into_response(),
    }
}

async fn handle_unzip_save_doc(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.stats.inc_save_doc_requests_total();

    if let Some(status) = state.config.save_doc_status {
        return forced(status);
    }

    let (Some(document_link_id), Some(_client_id)) =
        (query.get("document_link_id"), query.get("client_id"))
    else {
        return (
            StatusCode::BAD_REQUEST,
            "document_link_id and client_id are required",
        )
            .into_response();
    };

    Json(archive::saved_document(document_link_id)).into_response()
}

pub fn router(stats: TestServerStats, config: TestServerConfig) -> Router {
    Router::new()
        .route(PATH_UNZIP, post(handle_unzip))
        .route(PATH_UNZIP_SAVE_DOC, get(handle_unzip_save_doc))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(AppState {
            stats,
            config: Arc::new(config),
        })
}

pub struct TestServer {
    base_url: String,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(TestServerConfig::default()).await
    }

    pub async fn start_with(config: TestServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::default();
        let app = router(stats.clone(), config);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        let base_url = format!("http://{addr}");

        Ok(Self {
            base_url,
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}
