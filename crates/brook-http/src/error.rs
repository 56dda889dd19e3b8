//! HTTP error types

use thiserror::Error;

/// Errors surfaced by the client, either synchronously (argument and
/// configuration validation) or through the failure path of a
/// [`ResponseStream`](crate::ResponseStream).
#[derive(Debug, Error)]
pub enum HttpError {
    /// A required argument was null-ish or blank
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Client configuration could not be applied (e.g. unreadable TLS certificate)
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A hostname did not carry the unix socket marker or its payload was not decodable
    #[error("malformed socket address: {0}")]
    MalformedAddress(String),
    /// The service answered with a non-success status code
    #[error("service returned {status} with message {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// HTTP status message
        message: String,
    },
    /// Transport-level failure (DNS, connect, TLS handshake, read/write I/O)
    #[error("transport error: {0}")]
    Transport(String),
    /// In-band application error detected mid-stream despite a success status
    #[error("stream response error: {0}")]
    StreamResponse(String),
    /// A caller-supplied transformer rejected the payload
    #[error("transform error: {0}")]
    Transform(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            HttpError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            HttpError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Transform(err.to_string())
    }
}

#[cfg(unix)]
impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(err.to_string())
    }
}

#[cfg(unix)]
impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let error = HttpError::Status {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "service returned 404 with message Not Found"
        );
    }

    #[test]
    fn test_invalid_argument_display() {
        let error = HttpError::InvalidArgument("endpoint can't be null or empty".to_string());
        assert_eq!(
            format!("{}", error),
            "invalid argument: endpoint can't be null or empty"
        );
    }

    #[test]
    fn test_transport_display() {
        let error = HttpError::Transport("connection refused".to_string());
        assert_eq!(format!("{}", error), "transport error: connection refused");
    }

    #[test]
    fn test_stream_response_display() {
        let error = HttpError::StreamResponse(r#"{"error":"boom"}"#.to_string());
        assert_eq!(
            format!("{}", error),
            r#"stream response error: {"error":"boom"}"#
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let result: Result<String, _> = serde_json::from_str("not valid json");
        let json_error = result.expect_err("Invalid JSON should produce an error");
        let http_error: HttpError = json_error.into();

        assert!(matches!(http_error, HttpError::Transform(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let http_error: HttpError = io_error.into();

        assert!(matches!(http_error, HttpError::Transport(_)));
    }
}
