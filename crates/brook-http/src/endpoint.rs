//! Endpoint URL resolution

use crate::error::HttpError;

/// A single `name=value` query string pair.
///
/// Parameters are serialized in the order supplied by the caller. Values are
/// not URL-escaped by this layer; callers must pre-escape when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameter {
    name: String,
    value: String,
}

impl QueryParameter {
    /// Create a query parameter from a name and a value
    pub fn of(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for QueryParameter {
    fn from((name, value): (N, V)) -> Self {
        Self::of(name, value)
    }
}

/// Build the fully qualified request URL from a base URL, an endpoint path
/// and ordered query parameters.
///
/// One trailing slash is stripped from `base_url`, the endpoint is given
/// exactly one leading slash, and the query string is either empty or starts
/// with exactly one `?`. Fails with [`HttpError::InvalidArgument`] when
/// either `base_url` or `endpoint` is blank after trimming.
pub fn resolve_endpoint_url(
    base_url: &str,
    endpoint: &str,
    query_parameters: &[QueryParameter],
) -> Result<String, HttpError> {
    if base_url.trim().is_empty() {
        return Err(HttpError::InvalidArgument(
            "baseApiUrl can't be null or empty".to_string(),
        ));
    }
    if endpoint.trim().is_empty() {
        return Err(HttpError::InvalidArgument(
            "endpoint can't be null or empty".to_string(),
        ));
    }

    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let endpoint = if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{endpoint}")
    };
    let query = query_string(query_parameters);

    Ok(format!("{base}{endpoint}{query}"))
}

fn query_string(query_parameters: &[QueryParameter]) -> String {
    if query_parameters.is_empty() {
        return String::new();
    }
    let joined = query_parameters
        .iter()
        .map(|qp| format!("{}={}", qp.name(), qp.value()))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{joined}")
}
