//! Client configuration

use std::time::Duration;

/// Immutable transport configuration, built once via [`ClientConfigBuilder`]
/// and owned by one client for its lifetime.
///
/// Absent timeouts mean "use the transport engine's default".
#[derive(Debug, Clone)]
pub struct ClientConfig {
    follow_redirects: bool,
    follow_tls_redirects: bool,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_on_connection_failure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            follow_tls_redirects: true,
            read_timeout: None,
            write_timeout: None,
            connect_timeout: None,
            retry_on_connection_failure: true,
        }
    }
}

impl ClientConfig {
    /// Start building a configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Whether plain redirects are followed
    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    /// Whether redirects that cross between http and https are followed
    pub fn follow_tls_redirects(&self) -> bool {
        self.follow_tls_redirects
    }

    /// Read timeout, if configured
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Write timeout, if configured
    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }

    /// Connect timeout, if configured
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Whether the transport may retry once on a failed pooled connection
    pub fn retry_on_connection_failure(&self) -> bool {
        self.retry_on_connection_failure
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug)]
pub struct ClientConfigBuilder {
    follow_redirects: bool,
    follow_tls_redirects: bool,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_on_connection_failure: bool,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            follow_tls_redirects: true,
            read_timeout: None,
            write_timeout: None,
            connect_timeout: None,
            retry_on_connection_failure: true,
        }
    }
}

impl ClientConfigBuilder {
    /// Follow plain redirects (default true)
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Follow redirects crossing between http and https (default true)
    pub fn follow_tls_redirects(mut self, follow: bool) -> Self {
        self.follow_tls_redirects = follow;
        self
    }

    /// Set the read timeout
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Retry once on a failed pooled connection (default true)
    pub fn retry_on_connection_failure(mut self, retry: bool) -> Self {
        self.retry_on_connection_failure = retry;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            follow_redirects: self.follow_redirects,
            follow_tls_redirects: self.follow_tls_redirects,
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
            connect_timeout: self.connect_timeout,
            retry_on_connection_failure: self.retry_on_connection_failure,
        }
    }
}
