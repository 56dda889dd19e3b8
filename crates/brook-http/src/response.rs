//! HTTP response types

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use http::HeaderMap;

use crate::error::HttpError;

/// Push-based delivery channel for one request: zero or more items, at most
/// one error, terminated by stream end. Dropping the stream cancels the
/// request and releases the response body.
pub type ResponseStream<R> = BoxStream<'static, Result<R, HttpError>>;

/// Status line of a completed round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatus {
    code: u16,
    message: String,
}

impl HttpStatus {
    /// Create an HttpStatus from a code and a message
    pub fn of(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// HTTP status code
    pub fn code(&self) -> u16 {
        self.code
    }

    /// HTTP status message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Raw HTTP response: status line, headers and a lazily read body.
///
/// Whichever component drains the body owns the underlying connection's
/// stream; dropping the response releases it.
pub struct RawResponse {
    status: u16,
    status_message: String,
    headers: HeaderMap,
    body: BoxStream<'static, Result<Bytes, HttpError>>,
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("status_message", &self.status_message)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl RawResponse {
    /// Assemble a response from its parts.
    ///
    /// Used by [`Transport`](crate::transport::Transport) implementations;
    /// also handy for tests that need deterministic body chunk boundaries.
    pub fn from_parts(
        status: u16,
        status_message: impl Into<String>,
        headers: HeaderMap,
        body: BoxStream<'static, Result<Bytes, HttpError>>,
    ) -> Self {
        Self {
            status,
            status_message: status_message.into(),
            headers,
            body,
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the HTTP status message
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Status line as an [`HttpStatus`] value
    pub fn http_status(&self) -> HttpStatus {
        HttpStatus::of(self.status, self.status_message.clone())
    }

    /// Read the entire body as bytes
    pub async fn bytes(mut self) -> Result<Vec<u8>, HttpError> {
        let mut out = Vec::new();
        while let Some(chunk) = self.body.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    /// Read the entire body as UTF-8 text
    pub async fn text(self) -> Result<String, HttpError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes).map_err(|e| HttpError::Transform(e.to_string()))
    }

    /// Take ownership of the body chunk stream
    pub fn into_body_stream(self) -> BoxStream<'static, Result<Bytes, HttpError>> {
        self.body
    }
}
