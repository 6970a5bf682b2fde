use std::time::Duration;

use serde_json::Value;
use unzip_bench_http::{HttpClient, HttpRequest, HttpTransportErrorKind};

use crate::{Result, UnzipResponse, endpoint_url};

pub const UNZIP_SAVE_DOC_PATH: &str = "/unzip_save_doc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeParams {
    pub document_link_id: String,
    pub client_id: String,
}

impl Default for SmokeParams {
    fn default() -> Self {
        Self {
            document_link_id: "000000000a".to_string(),
            client_id: "CLIENT_TEST_001".to_string(),
        }
    }
}

/// One named check over the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl Validation {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SmokeOutcome {
    /// A 200 with a JSON body; `validations` says whether it has the expected shape.
    Checked {
        body: Value,
        validations: Vec<Validation>,
    },
    UnexpectedStatus {
        status: u16,
        body: String,
    },
    InvalidJson {
        error: String,
        body: String,
    },
    Transport {
        kind: HttpTransportErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmokeReport {
    pub url: String,
    pub latency: Duration,
    pub outcome: SmokeOutcome,
}

impl SmokeReport {
    pub fn passed(&self) -> bool {
        match &self.outcome {
            SmokeOutcome::Checked { validations, .. } => validations.iter().all(|v| v.passed),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match &self.outcome {
            SmokeOutcome::Checked { .. } | SmokeOutcome::InvalidJson { .. } => Some(200),
            SmokeOutcome::UnexpectedStatus { status, .. } => Some(*status),
            SmokeOutcome::Transport { .. } => None,
        }
    }

    /// Typed view of a checked body.
    pub fn response(&self) -> Option<UnzipResponse> {
        match &self.outcome {
            SmokeOutcome::Checked { body, .. } => serde_json::from_value(body.clone()).ok(),
            _ => None,
        }
    }

    /// One line per problem; empty when the check passed.
    pub fn failure_messages(&self) -> Vec<String> {
        match &self.outcome {
            SmokeOutcome::Checked { validations, .. } => validations
                .iter()
                .filter(|v| !v.passed)
                .map(|v| v.detail.clone())
                .collect(),
            SmokeOutcome::UnexpectedStatus { status, body } => {
                vec![format!("request failed with status {status}: {body}")]
            }
            SmokeOutcome::InvalidJson { error, body } => {
                vec![format!("failed to decode JSON response ({error}): {body}")]
            }
            SmokeOutcome::Transport { kind, message } => {
                vec![format!("request failed ({kind}): {message}")]
            }
        }
    }
}

/// Checks that `body` has a `docIds` list and a `metadata` object carrying `name` and
/// `children`. The metadata fields are only inspected when `metadata` is an object.
pub fn validate_unzip_save_doc(body: &Value) -> Vec<Validation> {
    let mut out = Vec::with_capacity(3);

    match body.get("docIds") {
        Some(Value::Array(ids)) => out.push(Validation::pass(
            "doc_ids",
            format!("'docIds' field is a list ({} ids)", ids.len()),
        )),
        _ => out.push(Validation::fail(
            "doc_ids",
            "'docIds' field is missing or not a list",
        )),
    }

    match body.get("metadata") {
        Some(Value::Object(metadata)) => {
            out.push(Validation::pass("metadata", "'metadata' field is present"));

            let has_name = metadata.get("name").is_some_and(is_truthy);
            let has_children = metadata.get("children").is_some_and(|c| !c.is_null());
            if has_name && has_children {
                out.push(Validation::pass(
                    "metadata_fields",
                    "'metadata' has expected fields (name, children)",
                ));
            } else {
                out.push(Validation::fail(
                    "metadata_fields",
                    "'metadata' is missing 'name' or 'children'",
                ));
            }
        }
        _ => out.push(Validation::fail(
            "metadata",
            "'metadata' field is missing or not a dictionary",
        )),
    }

    out
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// GETs `<base>/unzip_save_doc` and validates the body.
///
/// Network failures, non-200 answers and undecodable bodies all come back as a failed
/// [`SmokeReport`]; only a base URL that cannot carry the query string is an `Err`.
pub async fn check_unzip_save_doc(
    client: &HttpClient,
    base_url: &str,
    params: &SmokeParams,
    timeout: Option<Duration>,
) -> Result<SmokeReport> {
    let req = HttpRequest::get_with_query(
        &endpoint_url(base_url, UNZIP_SAVE_DOC_PATH),
        &[
            ("document_link_id", params.document_link_id.as_str()),
            ("client_id", params.client_id.as_str()),
        ],
    )?
    .timeout(timeout);
    let url = req.url.clone();

    let started = std::time::Instant::now();
    let res = client.request(req).await;
    let latency = started.elapsed();

    let outcome = match res {
        Err(err) => SmokeOutcome::Transport {
            kind: err.transport_error_kind(),
            message: err.to_string(),
        },
        Ok(res) if res.status != 200 => SmokeOutcome::UnexpectedStatus {
            status: res.status,
            body: String::from_utf8_lossy(&res.body).into_owned(),
        },
        Ok(res) => match serde_json::from_slice::<Value>(&res.body) {
            Ok(body) => {
                let validations = validate_unzip_save_doc(&body);
                SmokeOutcome::Checked { body, validations }
            }
            Err(err) => SmokeOutcome::InvalidJson {
                error: err.to_string(),
                body: String::from_utf8_lossy(&res.body).into_owned(),
            },
        },
    };

    let report = SmokeReport {
        url,
        latency,
        outcome,
    };
    tracing::debug!(url = %report.url, passed = report.passed(), "smoke check finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;
    use unzip_bench_testserver::{TestServer, TestServerConfig};

    #[test]
    fn well_formed_body_passes_every_validation() {
        let body = json!({"docIds": ["a", "b"], "metadata": {"name": "root", "children": []}});
        let validations = validate_unzip_save_doc(&body);
        assert_eq!(validations.len(), 3);
        assert!(validations.iter().all(|v| v.passed));
    }

    #[test]
    fn missing_doc_ids_fails_first_check_only() {
        let body = json!({"metadata": {"name": "root", "children": []}});
        let validations = validate_unzip_save_doc(&body);
        let failed: Vec<_> = validations.iter().filter(|v| !v.passed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "doc_ids");
    }

    #[test]
    fn metadata_fields_are_checked_only_for_objects() {
        let validations = validate_unzip_save_doc(&json!({"docIds": [], "metadata": "x"}));
        assert_eq!(validations.len(), 2);
        assert!(!validations[1].passed);

        let validations =
            validate_unzip_save_doc(&json!({"docIds": [], "metadata": {"name": "", "children": []}}));
        assert_eq!(validations.len(), 3);
        assert!(!validations[2].passed);

        let validations =
            validate_unzip_save_doc(&json!({"docIds": [], "metadata": {"name": "r", "children": null}}));
        assert!(!validations[2].passed);
    }

    #[tokio::test]
    async fn passes_against_test_server() {
        let server = TestServer::start().await.unwrap();
        let report = check_unzip_save_doc(
            &HttpClient::default(),
            server.base_url(),
            &SmokeParams::default(),
            Some(Duration::from_secs(5)),
        )
        .await
        .unwrap();

        assert!(report.passed(), "{:?}", report.failure_messages());
        assert_eq!(report.status(), Some(200));
        assert!(report.url.contains("document_link_id=000000000a"));
        assert!(report.url.contains("client_id=CLIENT_TEST_001"));
        assert!(report.response().unwrap().metadata.is_some());
        assert_eq!(server.stats().save_doc_requests_total(), 1);
    }

    #[tokio::test]
    async fn non_200_is_a_failed_check() {
        let server = TestServer::start_with(TestServerConfig {
            save_doc_status: Some(500),
            ..TestServerConfig::default()
        })
        .await
        .unwrap();

        let report = check_unzip_save_doc(
            &HttpClient::default(),
            server.base_url(),
            &SmokeParams::default(),
            None,
        )
        .await
        .unwrap();

        assert!(!report.passed());
        assert_eq!(report.status(), Some(500));
        assert_eq!(report.failure_messages().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_service_is_a_failed_check() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let report = check_unzip_save_doc(
            &HttpClient::default(),
            &format!("http://127.0.0.1:{port}"),
            &SmokeParams::default(),
            None,
        )
        .await
        .unwrap();

        assert!(!report.passed());
        assert!(matches!(
            report.outcome,
            SmokeOutcome::Transport {
                kind: HttpTransportErrorKind::Connect,
                ..
            }
        ));
    }
}
