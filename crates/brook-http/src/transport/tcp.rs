//! TCP/TLS transport backed by reqwest

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use tokio_util::io::ReaderStream;

use super::{RequestBody, RequestDescriptor, Transport};
use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::response::RawResponse;

const MAX_REDIRECT_HOPS: usize = 10;

/// Transport over TCP, optionally TLS, delegating to a pooled
/// [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct TcpTransport {
    inner: reqwest::Client,
}

impl TcpTransport {
    /// Build a transport from a configuration and an optional PEM root
    /// certificate path.
    ///
    /// Fails with [`HttpError::Configuration`] when the certificate file is
    /// unreadable or not valid PEM. The engine's pooled-connection retry is
    /// built in and not switchable here; `retry_on_connection_failure` is
    /// honored where the engine exposes it (see the unix transport). A
    /// configured `write_timeout` becomes the whole-request deadline, the
    /// closest control the engine offers.
    pub fn new(config: &ClientConfig, root_certificate: Option<&Path>) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder().redirect(redirect_policy(config));

        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.read_timeout() {
            builder = builder.read_timeout(timeout);
        }
        if let Some(timeout) = config.write_timeout() {
            builder = builder.timeout(timeout);
        }

        if let Some(cert_path) = root_certificate {
            let pem = std::fs::read(cert_path).map_err(|e| {
                HttpError::Configuration(format!(
                    "unable to read certificate at {}: {e}",
                    cert_path.display()
                ))
            })?;
            // The engine accepts malformed PEM silently, so parse it first
            let parsed = rustls_pemfile::certs(&mut pem.as_slice())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    HttpError::Configuration(format!(
                        "invalid certificate at {}: {e}",
                        cert_path.display()
                    ))
                })?;
            if parsed.is_empty() {
                return Err(HttpError::Configuration(format!(
                    "no PEM certificates found at {}",
                    cert_path.display()
                )));
            }
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                HttpError::Configuration(format!(
                    "invalid certificate at {}: {e}",
                    cert_path.display()
                ))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::Configuration(e.to_string()))?;
        Ok(Self { inner })
    }
}

fn redirect_policy(config: &ClientConfig) -> Policy {
    if !config.follow_redirects() {
        return Policy::none();
    }
    if config.follow_tls_redirects() {
        return Policy::default();
    }
    // Follow redirects but stop when the scheme changes between http and https
    Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECT_HOPS {
            return attempt.error("too many redirects");
        }
        let crossed_scheme = attempt
            .previous()
            .last()
            .map(|prev| prev.scheme() != attempt.url().scheme())
            .unwrap_or(false);
        if crossed_scheme {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

#[async_trait]
impl Transport for TcpTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, HttpError> {
        tracing::info!("making {} request to {}", request.method, request.url);

        let mut headers = HeaderMap::new();
        if let Some(content_type) = request.body.content_type() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        for (name, value) in request.headers.iter() {
            headers.insert(name, value.clone());
        }

        let mut builder = self
            .inner
            .request(request.method, &request.url)
            .headers(headers);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Text(text) => builder.body(text),
            RequestBody::Bytes(bytes) => builder.body(bytes),
            RequestBody::TarFile(path) => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    HttpError::Transport(format!("unable to read tar at {}: {e}", path.display()))
                })?;
                builder.body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            }
        };

        let response = builder.send().await.map_err(|e| {
            tracing::error!("transport failure: {e}");
            HttpError::Transport(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!("received response with code '{}'", status.as_u16());

        let message = status.canonical_reason().unwrap_or_default().to_string();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| HttpError::Transport(e.to_string())))
            .boxed();

        Ok(RawResponse::from_parts(
            status.as_u16(),
            message,
            headers,
            body,
        ))
    }
}
