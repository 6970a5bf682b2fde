use std::time::Duration;

use bytes::Bytes;

use crate::multipart::EncodedForm;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
    /// Estimated bytes sent on the wire for this request (HTTP/1.1 request line + headers + body).
    pub bytes_sent: u64,
    /// Estimated bytes received on the wire for this response (HTTP/1.1 status line + headers + body).
    pub bytes_received: u64,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: http::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: &str) -> Self {
        Self {
            method: http::Method::GET,
            url: url.to_string(),
            headers: Vec::new(),
            body: Bytes::new(),
            timeout: None,
        }
    }

    /// GET with URL-encoded query parameters appended to `url`.
    pub fn get_with_query(url: &str, query: &[(&str, &str)]) -> Result<Self> {
        let parsed = url::Url::parse_with_params(url, query)
            .map_err(|_| Error::InvalidUrl(url.to_string()))?;
        Ok(Self::get(parsed.as_str()))
    }

    pub fn post(url: &str, body: Bytes) -> Self {
        Self {
            method: http::Method::POST,
            url: url.to_string(),
            headers: Vec::new(),
            body,
            timeout: None,
        }
    }

    /// POST an encoded multipart/form-data body.
    ///
    /// `Content-Type` carries the form boundary; `Content-Length` is set explicitly by the
    /// client from the encoded body.
    pub fn multipart(url: &str, form: EncodedForm) -> Self {
        Self::post(url, form.body).header("content-type", form.content_type)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
