//! Transport selection and the transport engine boundary
//!
//! A [`Transport`] performs exactly one network round trip: it takes a fully
//! resolved [`RequestDescriptor`] and yields a [`RawResponse`] regardless of
//! status code, or fails with a transport-level error. Redirects, TLS and
//! connection pooling belong to the engine behind the trait, configured once
//! from a [`ClientConfig`](crate::ClientConfig).

use std::path::PathBuf;

use async_trait::async_trait;
use http::{HeaderMap, Method};

use crate::error::HttpError;
use crate::response::RawResponse;

mod tcp;
#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub mod unix_addr;

pub use tcp::TcpTransport;
#[cfg(unix)]
pub use unix::UnixTransport;

/// Content type sent for string bodies
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
/// Content type sent for raw byte bodies
pub const OCTET_CONTENT_TYPE: &str = "application/octet-stream";
/// Content type sent for tar archive uploads
pub const TAR_CONTENT_TYPE: &str = "application/tar";

/// Request payload, absent for GET/HEAD/DELETE
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No payload
    #[default]
    Empty,
    /// A string payload, sent as JSON
    Text(String),
    /// A raw byte payload, sent as octet-stream
    Bytes(Vec<u8>),
    /// A tar archive read from disk, sent as a tar media type
    TarFile(PathBuf),
}

impl RequestBody {
    /// Whether a payload is present
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// Content type implied by the payload kind, if any
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Text(_) => Some(JSON_CONTENT_TYPE),
            RequestBody::Bytes(_) => Some(OCTET_CONTENT_TYPE),
            RequestBody::TarFile(_) => Some(TAR_CONTENT_TYPE),
        }
    }
}

/// One fully resolved request, created per call
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,
    /// Fully qualified URL
    pub url: String,
    /// Header mapping, unique keys, last write wins
    pub headers: HeaderMap,
    /// Optional payload
    pub body: RequestBody,
}

/// The transport engine boundary.
///
/// Implementations own pooling, TLS and redirect following. They must be
/// safe for concurrent use; this layer adds no locking of its own.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Perform one round trip. A non-success status is not an error here;
    /// interpretation of the status code belongs to the delivery pipeline.
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, HttpError>;
}
