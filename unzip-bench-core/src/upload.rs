use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use bytes::Bytes;
use unzip_bench_http::{HttpClient, HttpRequest, HttpTransportErrorKind, encode_file};

use crate::{Error, Result};

pub const UNZIP_PATH: &str = "/unzip";

/// Multipart field the service reads the archive from.
pub const UPLOAD_FIELD: &str = "file";
pub const UPLOAD_MIME: &str = "application/zip";

/// Status code older reports used in place of a transport failure.
pub const TRANSPORT_SENTINEL: u16 = 999;

/// Outcome of one upload, used as the status histogram key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UploadStatus {
    Success(u16),
    HttpError(u16),
    Transport(HttpTransportErrorKind),
}

impl UploadStatus {
    pub fn from_http_status(status: u16) -> Self {
        if status >= 400 {
            Self::HttpError(status)
        } else {
            Self::Success(status)
        }
    }

    /// HTTP status, if a response came back.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Success(code) | Self::HttpError(code) => Some(*code),
            Self::Transport(_) => None,
        }
    }

    /// Integer view for legacy reports; transport failures collapse to [`TRANSPORT_SENTINEL`].
    pub fn legacy_code(&self) -> u16 {
        self.code().unwrap_or(TRANSPORT_SENTINEL)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(code) | Self::HttpError(code) => write!(f, "{code}"),
            Self::Transport(kind) => write!(f, "transport:{kind}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadResult {
    pub latency: Duration,
    pub status: UploadStatus,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    /// Response body; empty on transport failure.
    pub body: Bytes,
}

/// Posts archives to `<base>/unzip` as multipart/form-data.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: HttpClient,
    url: String,
    timeout: Option<Duration>,
}

impl Uploader {
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            url: endpoint_url(base_url, UNZIP_PATH),
            timeout: None,
        }
    }

    /// Per-request deadline covering send and full body read. `None` waits indefinitely.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Reads `path` fully, then uploads it under its file name.
    ///
    /// Only an unreadable fixture is an `Err`; every network outcome is an [`UploadResult`].
    pub async fn upload(&self, path: &Path) -> Result<UploadResult> {
        let body = tokio::fs::read(path)
            .await
            .map_err(|source| Error::FixtureRead {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.zip".to_string());

        Ok(self.upload_bytes(&file_name, Bytes::from(body)).await)
    }

    pub async fn upload_bytes(&self, file_name: &str, body: Bytes) -> UploadResult {
        let req = encode_file(UPLOAD_FIELD, file_name, UPLOAD_MIME, body)
            .await
            .map(|form| HttpRequest::multipart(&self.url, form).timeout(self.timeout));

        let started = Instant::now();
        let res = match req {
            Ok(req) => self.client.request(req).await,
            Err(err) => Err(err),
        };
        let latency = started.elapsed();

        match res {
            Ok(res) => {
                let status = UploadStatus::from_http_status(res.status);
                tracing::trace!(
                    file = file_name,
                    %status,
                    latency_ms = latency.as_millis() as u64,
                    "upload finished"
                );
                UploadResult {
                    latency,
                    status,
                    bytes_sent: res.bytes_sent,
                    bytes_received: res.bytes_received,
                    body: res.body,
                }
            }
            Err(err) => {
                let kind = err.transport_error_kind();
                tracing::debug!(file = file_name, error = %err, %kind, "upload failed");
                UploadResult {
                    latency,
                    status: UploadStatus::Transport(kind),
                    bytes_sent: 0,
                    bytes_received: 0,
                    body: Bytes::new(),
                }
            }
        }
    }
}

/// Joins a base URL and an absolute path without doubling the slash.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use unzip_bench_testserver::{TestServer, TestServerConfig};

    #[test]
    fn status_classification() {
        assert_eq!(UploadStatus::from_http_status(200), UploadStatus::Success(200));
        assert_eq!(UploadStatus::from_http_status(302), UploadStatus::Success(302));
        assert_eq!(UploadStatus::from_http_status(503), UploadStatus::HttpError(503));

        let transport = UploadStatus::Transport(HttpTransportErrorKind::Connect);
        assert_eq!(transport.code(), None);
        assert_eq!(transport.legacy_code(), TRANSPORT_SENTINEL);
        assert_eq!(transport.to_string(), "transport:connect");
        assert_eq!(UploadStatus::HttpError(500).to_string(), "500");
    }

    #[test]
    fn endpoint_url_trims_trailing_slash() {
        assert_eq!(
            endpoint_url("http://localhost:8080/", UNZIP_PATH),
            "http://localhost:8080/unzip"
        );
        assert_eq!(
            endpoint_url("http://localhost:8080", UNZIP_PATH),
            "http://localhost:8080/unzip"
        );
    }

    #[tokio::test]
    async fn uploads_flat_fixture() {
        let server = TestServer::start().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let fixture = crate::create_fixture(dir.path(), "small_flat", 1, 0).unwrap();

        let uploader = Uploader::new(HttpClient::default(), server.base_url());
        let res = uploader.upload(&fixture.path).await.unwrap();

        assert_eq!(res.status, UploadStatus::Success(200));
        assert!(res.latency > Duration::ZERO);
        assert!(res.bytes_sent > fixture.size_bytes);

        let decoded = crate::UnzipResponse::from_slice(&res.body).unwrap();
        let root = decoded.metadata.unwrap();
        assert_eq!(root.name, "small_flat.zip");
        assert_eq!(fixture.entries, 5);
        assert_eq!(root.children.len(), 5);
        assert_eq!(server.stats().uploads_total(), 1);
    }

    #[tokio::test]
    async fn empty_object_reply_is_a_success() {
        let server = TestServer::start_with(TestServerConfig {
            unzip_body: Some("{}"),
            ..TestServerConfig::default()
        })
        .await
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let fixture = crate::create_fixture(dir.path(), "small_flat", 1, 0).unwrap();

        let uploader = Uploader::new(HttpClient::default(), server.base_url());
        let res = uploader.upload(&fixture.path).await.unwrap();

        assert_eq!(res.status, UploadStatus::Success(200));
        assert!(res.status.is_success());
        assert!(res.latency > Duration::ZERO);
        assert_eq!(res.body.as_ref(), b"{}");
        assert_eq!(
            crate::UnzipResponse::from_slice(&res.body).unwrap(),
            crate::UnzipResponse::default()
        );
        assert_eq!(server.stats().uploads_total(), 1);
    }

    #[tokio::test]
    async fn http_error_status_is_recorded_not_raised() {
        let server = TestServer::start_with(TestServerConfig {
            unzip_status: Some(503),
            ..TestServerConfig::default()
        })
        .await
        .unwrap();

        let uploader = Uploader::new(HttpClient::default(), server.base_url());
        let res = uploader
            .upload_bytes("x.zip", Bytes::from_static(b"PK\x05\x06"))
            .await;
        assert_eq!(res.status, UploadStatus::HttpError(503));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_status() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let uploader = Uploader::new(HttpClient::default(), &format!("http://127.0.0.1:{port}"));
        let res = uploader
            .upload_bytes("x.zip", Bytes::from_static(b"PK"))
            .await;

        assert_eq!(
            res.status,
            UploadStatus::Transport(HttpTransportErrorKind::Connect)
        );
        assert_eq!(res.bytes_received, 0);
    }

    #[tokio::test]
    async fn missing_fixture_is_an_error() {
        let uploader = Uploader::new(HttpClient::default(), "http://127.0.0.1:9");
        let err = uploader
            .upload(Path::new("/definitely/not/here.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FixtureRead { .. }));
    }
}
