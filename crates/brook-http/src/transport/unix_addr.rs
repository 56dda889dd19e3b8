//! Unix socket address codec
//!
//! Generic URL and name-resolution machinery wants a hostname, but a unix
//! domain socket lives at a filesystem path. The path is smuggled through as
//! a hex-encoded hostname label carrying a reserved suffix that no real DNS
//! name ends with; the connector recognizes the suffix, short-circuits name
//! resolution and opens the socket at the decoded path instead. The encoding
//! must stay behind the transport layer and never leak into endpoint
//! resolution.

use crate::error::HttpError;

/// Reserved hostname suffix marking an encoded unix socket path
pub const SOCKET_HOSTNAME_SUFFIX: &str = ".socket";

/// Encode a filesystem socket path as a synthetic hostname
pub fn encode_hostname(socket_path: &str) -> String {
    format!("{}{SOCKET_HOSTNAME_SUFFIX}", hex::encode(socket_path))
}

/// Decode a synthetic hostname back into the socket path it names.
///
/// Fails with [`HttpError::MalformedAddress`] when the reserved suffix is
/// absent or the remaining label is not valid hex-encoded UTF-8.
pub fn decode_hostname(hostname: &str) -> Result<String, HttpError> {
    let encoded = hostname
        .strip_suffix(SOCKET_HOSTNAME_SUFFIX)
        .ok_or_else(|| {
            HttpError::MalformedAddress(format!(
                "hostname '{hostname}' does not end with {SOCKET_HOSTNAME_SUFFIX}"
            ))
        })?;
    let bytes = hex::decode(encoded)
        .map_err(|e| HttpError::MalformedAddress(format!("hostname '{hostname}': {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| HttpError::MalformedAddress(format!("hostname '{hostname}': {e}")))
}

/// Whether a hostname carries the reserved unix socket marker
pub fn is_socket_hostname(hostname: &str) -> bool {
    hostname.ends_with(SOCKET_HOSTNAME_SUFFIX)
}
