//! Unix domain socket transport
//!
//! Compatibility shim around a hyper client whose connector plays both hooks
//! at once: it intercepts hostnames carrying the reserved socket marker
//! (there is no DNS phase for it to go through) and opens a local
//! [`UnixStream`] at the decoded path instead of a TCP connection.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, Uri};
use http_body_util::{BodyStream, Full};
use hyper_util::client::legacy::connect::{Connected, Connection};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::UnixStream;
use tower::Service;

use super::unix_addr::decode_hostname;
use super::{RequestBody, RequestDescriptor, Transport};
use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::response::RawResponse;

/// Transport over a local unix domain socket.
///
/// Redirect following does not apply on this transport; `connect_timeout`
/// guards the socket connect, `read_timeout` bounds the round trip, and
/// `retry_on_connection_failure` maps to the engine's canceled-request retry.
#[derive(Debug, Clone)]
pub struct UnixTransport {
    inner: Client<UnixConnector, Full<Bytes>>,
    read_timeout: Option<Duration>,
}

impl UnixTransport {
    /// Build a transport from a configuration
    pub fn new(config: &ClientConfig) -> Self {
        let connector = UnixConnector {
            connect_timeout: config.connect_timeout(),
        };
        let inner = Client::builder(TokioExecutor::new())
            .retry_canceled_requests(config.retry_on_connection_failure())
            .build(connector);
        Self {
            inner,
            read_timeout: config.read_timeout(),
        }
    }
}

#[async_trait]
impl Transport for UnixTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, HttpError> {
        tracing::info!("making {} request to {}", request.method, request.url);

        let uri: Uri = request.url.parse().map_err(|e| {
            HttpError::InvalidArgument(format!("invalid url {}: {e}", request.url))
        })?;

        let content_type = request.body.content_type();
        let payload = match request.body {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Text(text) => Bytes::from(text),
            RequestBody::Bytes(bytes) => Bytes::from(bytes),
            RequestBody::TarFile(path) => {
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    HttpError::Transport(format!("unable to read tar at {}: {e}", path.display()))
                })?;
                Bytes::from(bytes)
            }
        };

        let mut req = Request::builder()
            .method(request.method)
            .uri(uri)
            .body(Full::new(payload))
            .map_err(|e| HttpError::InvalidArgument(e.to_string()))?;
        if let Some(content_type) = content_type {
            req.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        for (name, value) in request.headers.iter() {
            req.headers_mut().insert(name, value.clone());
        }

        let round_trip = self.inner.request(req);
        let response = match self.read_timeout {
            Some(timeout) => tokio::time::timeout(timeout, round_trip)
                .await
                .map_err(|_| HttpError::Transport("request timed out".to_string()))?,
            None => round_trip.await,
        }
        .map_err(|e| {
            tracing::error!("transport failure: {e}");
            HttpError::Transport(e.to_string())
        })?;

        let (parts, body) = response.into_parts();
        let status = parts.status;
        tracing::debug!("received response with code '{}'", status.as_u16());

        let message = status.canonical_reason().unwrap_or_default().to_string();
        let chunks = BodyStream::new(body)
            .try_filter_map(|frame| async move { Ok(frame.into_data().ok()) })
            .map_err(|e| HttpError::Transport(e.to_string()))
            .boxed();

        Ok(RawResponse::from_parts(
            status.as_u16(),
            message,
            parts.headers,
            chunks,
        ))
    }
}

/// Connector that resolves marker hostnames to unix domain sockets
#[derive(Debug, Clone)]
struct UnixConnector {
    connect_timeout: Option<Duration>,
}

impl Service<Uri> for UnixConnector {
    type Response = UnixConnection;
    type Error = io::Error;
    type Future = Pin<Box<dyn Future<Output = Result<UnixConnection, io::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let connect_timeout = self.connect_timeout;
        Box::pin(async move {
            let host = uri
                .host()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "uri has no host"))?;
            let socket_path = decode_hostname(host)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
            tracing::debug!("connecting via '{socket_path}'");

            let connect = UnixStream::connect(socket_path);
            let stream = match connect_timeout {
                Some(timeout) => tokio::time::timeout(timeout, connect)
                    .await
                    .map_err(|_| {
                        io::Error::new(io::ErrorKind::TimedOut, "unix socket connect timed out")
                    })??,
                None => connect.await?,
            };
            Ok(UnixConnection {
                inner: TokioIo::new(stream),
            })
        })
    }
}

/// One established unix socket connection handed to the engine
#[derive(Debug)]
struct UnixConnection {
    inner: TokioIo<UnixStream>,
}

impl hyper::rt::Read for UnixConnection {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: hyper::rt::ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl hyper::rt::Write for UnixConnection {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

impl Connection for UnixConnection {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_default_config() {
        let transport = UnixTransport::new(&ClientConfig::default());
        let _ = format!("{:?}", transport);
    }

    #[tokio::test]
    async fn test_connector_rejects_unmarked_hostname() {
        let mut connector = UnixConnector {
            connect_timeout: None,
        };
        let uri: Uri = "http://example.com/version"
            .parse()
            .expect("Valid test uri");
        let err = connector
            .call(uri)
            .await
            .expect_err("Plain hostnames must not open sockets");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_unreadable_tar_fails_as_transport() {
        let transport = UnixTransport::new(&ClientConfig::default());
        let request = RequestDescriptor {
            method: http::Method::POST,
            url: "http://61.socket/build".to_string(),
            headers: http::HeaderMap::new(),
            body: RequestBody::TarFile("/definitely/not/here.tar".into()),
        };
        let err = transport
            .execute(request)
            .await
            .expect_err("Missing tar must fail");
        assert!(matches!(err, HttpError::Transport(_)));
    }
}
