//! Best-effort HTTP/1.1 wire size accounting.
//!
//! Sizes are computed from the final request/response heads, so headers the client adds
//! implicitly (Host, Content-Length) are included. The reason phrase is ignored.

use http::HeaderMap;

const CRLF: u64 = 2;

/// `METHOD SP path SP HTTP/1.1 CRLF` + header block + body.
pub(crate) fn request_bytes(parts: &http::request::Parts, body_len: u64) -> u64 {
    let path = parts
        .uri
        .path_and_query()
        .map_or("/", |p| p.as_str())
        .len() as u64;
    let line = (parts.method.as_str().len() as u64)
        .saturating_add(1)
        .saturating_add(path)
        .saturating_add(1)
        .saturating_add(version_len(parts.version))
        .saturating_add(CRLF);

    line.saturating_add(header_block_bytes(&parts.headers))
        .saturating_add(body_len)
}

/// `HTTP/1.1 SP 200 CRLF` + header block (body excluded).
pub(crate) fn response_head_bytes(parts: &http::response::Parts) -> u64 {
    let line = version_len(parts.version)
        .saturating_add(1)
        .saturating_add(parts.status.as_str().len() as u64)
        .saturating_add(CRLF);
    line.saturating_add(header_block_bytes(&parts.headers))
}

fn header_block_bytes(headers: &HeaderMap) -> u64 {
    headers
        .iter()
        .map(|(name, value)| {
            // "name: value\r\n"
            (name.as_str().len() as u64)
                .saturating_add(2)
                .saturating_add(value.as_bytes().len() as u64)
                .saturating_add(CRLF)
        })
        .fold(CRLF, u64::saturating_add)
}

fn version_len(version: http::Version) -> u64 {
    match version {
        http::Version::HTTP_2 | http::Version::HTTP_3 => "HTTP/2".len() as u64,
        _ => "HTTP/1.1".len() as u64,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn request_bytes_counts_line_headers_and_body() {
        let req = http::Request::post("http://localhost:8080/unzip")
            .header("host", "localhost:8080")
            .header("content-length", "4")
            .body(())
            .unwrap();
        let (parts, ()) = req.into_parts();

        // "POST /unzip HTTP/1.1\r\n" = 22
        // "host: localhost:8080\r\n" = 22
        // "content-length: 4\r\n" = 19
        // "\r\n" = 2, body = 4
        assert_eq!(request_bytes(&parts, 4), 22 + 22 + 19 + 2 + 4);
    }

    #[test]
    fn response_head_ignores_reason_phrase() {
        let res = http::Response::builder()
            .status(200)
            .header("content-type", "application/json")
            .body(())
            .unwrap();
        let (parts, ()) = res.into_parts();

        // "HTTP/1.1 200\r\n" = 14, "content-type: application/json\r\n" = 32, "\r\n" = 2
        assert_eq!(response_head_bytes(&parts), 14 + 32 + 2);
    }
}
