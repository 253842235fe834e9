//! Minimal HTTP response model.
//!
//! A [`Response`] carries the final URL (after redirects, if the client
//! follows them), status code + reason, and response headers. The body is
//! *not* buffered up front: it is read when [`Response::text`] or
//! [`Response::bytes`] is awaited, so a dropped connection after the status
//! line surfaces at that point.
//!
//! ## Notes
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names.
//! - `status_text` is the reason phrase sent by the server, or the status
//!   code’s canonical phrase when the server's matches it or is absent.
//! - Text is always decoded as UTF-8, whatever charset `Content-Type` names.
use std::fmt;

use futures::future::BoxFuture;
use http::HeaderMap;

use crate::errors::NetError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Pending read of a response body.
pub type BodyFuture = BoxFuture<'static, Result<Vec<u8>, NetError>>;

pub struct Response {
    /// Final URL of the response (after redirects, if any).
    pub url: url::Url,

    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    body: BodyFuture,
}

impl Response {
    pub fn new(
        url: url::Url,
        status: u16,
        status_text: impl Into<String>,
        headers: HeaderMap,
        body: BodyFuture,
    ) -> Self {
        Self {
            url,
            status,
            status_text: status_text.into(),
            headers,
            body,
        }
    }

    /// Response whose body is already in memory.
    pub fn buffered(
        url: url::Url,
        status: u16,
        status_text: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        let body = body.into();
        Self::new(
            url,
            status,
            status_text,
            HeaderMap::new(),
            Box::pin(futures::future::ready(Ok(body))),
        )
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// True for statuses in `200..=299`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Reads the raw body.
    pub async fn bytes(self) -> Result<Vec<u8>, NetError> {
        self.body.await
    }

    /// Reads the body and decodes it as UTF-8 text.
    pub async fn text(self) -> Result<String, NetError> {
        let body = self.body.await?;
        Ok(decode_body(&body))
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url.as_str())
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

fn decode_body(body: &[u8]) -> String {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
    String::from_utf8_lossy(body).into_owned()
}
