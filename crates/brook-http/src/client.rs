//! HTTP client front end

use std::path::Path;
use std::sync::Arc;

use http::Method;

use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::transport::TcpTransport;
#[cfg(unix)]
use crate::transport::{unix_addr, UnixTransport};

/// Asynchronous HTTP client bound to one base endpoint.
///
/// Owns one configured transport handle for its lifetime; cheap to clone and
/// safe for concurrent use, since each request carries its own state.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    transport: Arc<dyn crate::transport::Transport>,
}

impl HttpClient {
    /// Create a client for a base URL with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, HttpError> {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a client for a base URL with an explicit configuration
    pub fn with_config(
        base_url: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, HttpError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(HttpError::InvalidArgument(
                "baseApiUrl can't be null or empty".to_string(),
            ));
        }
        let transport = TcpTransport::new(&config, None)?;
        Ok(Self {
            base_url,
            transport: Arc::new(transport),
        })
    }

    /// Create a client for `http://host:port`
    pub fn from_host_port(
        host: &str,
        port: u16,
        config: ClientConfig,
    ) -> Result<Self, HttpError> {
        let base_url = format!("http://{host}:{port}");
        validate_base_url(&base_url)?;
        tracing::info!("base API url {base_url}");
        Self::with_config(base_url, config)
    }

    /// Create a client for `https://host:port`, trusting the PEM root
    /// certificate at `cert_path`
    pub fn from_host_port_tls(
        host: &str,
        port: u16,
        cert_path: &Path,
        config: ClientConfig,
    ) -> Result<Self, HttpError> {
        let base_url = format!("https://{host}:{port}");
        validate_base_url(&base_url)?;
        tracing::info!("base API url {base_url}");
        let transport = TcpTransport::new(&config, Some(cert_path))?;
        Ok(Self {
            base_url,
            transport: Arc::new(transport),
        })
    }

    /// Create a client that talks HTTP over the unix domain socket at
    /// `socket_path`.
    ///
    /// The socket path is carried as a synthetic hostname so that endpoint
    /// resolution stays ordinary; the transport's connector recognizes the
    /// marker and opens the local socket instead of a network connection.
    #[cfg(unix)]
    pub fn unix(socket_path: impl AsRef<str>, config: ClientConfig) -> Self {
        let base_url = format!("http://{}", unix_addr::encode_hostname(socket_path.as_ref()));
        Self {
            base_url,
            transport: Arc::new(UnixTransport::new(&config)),
        }
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a GET request against `endpoint`
    pub fn get(&self, endpoint: impl Into<String>) -> RequestBuilder {
        self.request(Method::GET, endpoint)
    }

    /// Start a POST request against `endpoint`
    pub fn post(&self, endpoint: impl Into<String>) -> RequestBuilder {
        self.request(Method::POST, endpoint)
    }

    /// Start a DELETE request against `endpoint`
    pub fn delete(&self, endpoint: impl Into<String>) -> RequestBuilder {
        self.request(Method::DELETE, endpoint)
    }

    /// Start a HEAD request against `endpoint`
    pub fn head(&self, endpoint: impl Into<String>) -> RequestBuilder {
        self.request(Method::HEAD, endpoint)
    }

    fn request(&self, method: Method, endpoint: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(
            self.transport.clone(),
            self.base_url.clone(),
            method,
            endpoint.into(),
        )
    }
}

fn validate_base_url(base_url: &str) -> Result<(), HttpError> {
    url::Url::parse(base_url)
        .map_err(|e| HttpError::InvalidArgument(format!("invalid base url {base_url}: {e}")))?;
    Ok(())
}
