//! multipart/form-data bodies.
//!
//! Encoding is done by `common-multipart-rfc7578`; the stream is buffered here so the client
//! can send an exact `Content-Length` and account the bytes it puts on the wire.

use std::io::Cursor;

use bytes::{Bytes, BytesMut};
use common_multipart_rfc7578::client::multipart::{Body, Form};
use futures_util::TryStreamExt as _;

use crate::{Error, Result};

/// A fully encoded form, ready to be used as a request body.
#[derive(Debug, Clone)]
pub struct EncodedForm {
    pub content_type: String,
    pub body: Bytes,
}

/// Encodes a form with a single file field.
pub async fn encode_file(
    field: &str,
    file_name: &str,
    content_type: &str,
    data: Bytes,
) -> Result<EncodedForm> {
    let mime: mime::Mime = content_type
        .parse()
        .map_err(|_| Error::InvalidMime(content_type.to_string()))?;

    let mut form = Form::default();
    form.add_reader_file_with_mime(
        field.to_string(),
        Cursor::new(data),
        file_name.to_string(),
        mime,
    );
    let content_type = form.content_type();

    let body = Body::from(form)
        .try_fold(BytesMut::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await
        .map_err(|e| Error::Multipart(e.to_string()))?;

    Ok(EncodedForm {
        content_type,
        body: body.freeze(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::HttpTransportErrorKind;

    #[tokio::test]
    async fn file_part_carries_name_filename_and_mime() {
        let form = encode_file(
            "file",
            "small_flat.zip",
            "application/zip",
            Bytes::from_static(b"PK\x03\x04"),
        )
        .await
        .unwrap();

        let boundary = form
            .content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert!(!boundary.is_empty());

        let text = String::from_utf8_lossy(&form.body);
        assert!(text.starts_with(&format!("--{boundary}\r\n")), "{text}");
        assert!(text.contains("name=\"file\""), "{text}");
        assert!(text.contains("filename=\"small_flat.zip\""), "{text}");
        assert!(text.contains("application/zip"), "{text}");
        assert!(text.contains("PK\u{3}\u{4}"), "{text}");
        assert!(text.trim_end().ends_with(&format!("--{boundary}--")), "{text}");
    }

    #[tokio::test]
    async fn malformed_mime_is_a_build_error() {
        let err = encode_file("file", "a.zip", "zip", Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.transport_error_kind(),
            HttpTransportErrorKind::RequestBuild
        );
    }
}
