//! Per-request builder and execution entry points
//!
//! One builder per HTTP method replaces the original surface of many
//! overloaded entry points: headers, query parameters, body and transformer
//! are named optional pieces, defaulted when absent. Argument validation
//! (URL resolution, header syntax, body/method mismatch) happens
//! synchronously in the finisher, before any stream exists; everything later
//! is delivered through the stream's failure path.

use std::path::PathBuf;
use std::sync::Arc;

use async_stream::stream;
use bytes::Bytes;
use futures::StreamExt;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;

use crate::delivery;
use crate::endpoint::{resolve_endpoint_url, QueryParameter};
use crate::error::HttpError;
use crate::response::{HttpStatus, RawResponse, ResponseStream};
use crate::transport::{RequestBody, RequestDescriptor, Transport};

type NoCheck = fn(&str) -> bool;

/// Builder for one request against a client's base endpoint.
///
/// Finishers perform exactly one network round trip when the returned stream
/// is first polled; dropping the stream cancels the request.
#[derive(Debug)]
pub struct RequestBuilder {
    transport: Arc<dyn Transport>,
    base_url: String,
    method: Method,
    endpoint: String,
    headers: Vec<(String, String)>,
    query: Vec<QueryParameter>,
    body: RequestBody,
}

impl RequestBuilder {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        base_url: String,
        method: Method,
        endpoint: String,
    ) -> Self {
        Self {
            transport,
            base_url,
            method,
            endpoint,
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Add a header. Keys are unique; a later write wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several headers at once
    pub fn headers<N, V>(mut self, headers: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(n, v)| (n.into(), v.into())));
        self
    }

    /// Append a query parameter; parameters are serialized in call order
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push(QueryParameter::of(name, value));
        self
    }

    /// Append several query parameters
    pub fn query_params(mut self, params: impl IntoIterator<Item = QueryParameter>) -> Self {
        self.query.extend(params);
        self
    }

    /// Set a string body, sent as JSON (POST only)
    pub fn body_text(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Text(body.into());
        self
    }

    /// Set a raw byte body, sent as octet-stream (POST only)
    pub fn body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = RequestBody::Bytes(body.into());
        self
    }

    /// Set a tar archive body read from disk (POST only)
    pub fn body_tar(mut self, path: impl Into<PathBuf>) -> Self {
        self.body = RequestBody::TarFile(path.into());
        self
    }

    // === Whole-body finishers ===

    /// Deliver the response body as a single text item
    pub fn text(self) -> Result<ResponseStream<String>, HttpError> {
        self.run(delivery::deliver_text)
    }

    /// Apply a single-value transformer to the whole body text
    pub fn one<R, F>(self, transformer: F) -> Result<ResponseStream<R>, HttpError>
    where
        R: Send + 'static,
        F: Fn(String) -> Result<R, HttpError> + Send + 'static,
    {
        self.run(move |response| delivery::deliver_one(response, transformer))
    }

    /// Apply a sequence transformer to the whole body text and deliver each
    /// element in order
    pub fn many<R, F>(self, transformer: F) -> Result<ResponseStream<R>, HttpError>
    where
        R: Send + 'static,
        F: Fn(String) -> Result<Vec<R>, HttpError> + Send + 'static,
    {
        self.run(move |response| delivery::deliver_many(response, transformer))
    }

    /// Decode the body as JSON into a single value
    pub fn json<T>(self) -> Result<ResponseStream<T>, HttpError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.one(|text| serde_json::from_str(&text).map_err(HttpError::from))
    }

    /// Decode the body as a JSON array and deliver each element in order
    pub fn json_seq<T>(self) -> Result<ResponseStream<T>, HttpError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.many(|text| serde_json::from_str::<Vec<T>>(&text).map_err(HttpError::from))
    }

    /// Deliver the status line as a single item
    pub fn status(self) -> Result<ResponseStream<HttpStatus>, HttpError> {
        self.run(delivery::deliver_status)
    }

    /// Deliver the raw response (status, headers, lazy body) as a single item
    pub fn response(self) -> Result<ResponseStream<RawResponse>, HttpError> {
        self.run(delivery::deliver_response)
    }

    // === Streaming finishers ===

    /// Stream raw body chunks as they arrive
    pub fn byte_stream(self) -> Result<ResponseStream<Bytes>, HttpError> {
        self.run(delivery::stream_bytes)
    }

    /// Stream body chunks as text
    pub fn stream_text(self) -> Result<ResponseStream<String>, HttpError> {
        self.stream(Ok)
    }

    /// Incrementally decode body chunks with a per-chunk transformer
    pub fn stream<R, F>(self, transformer: F) -> Result<ResponseStream<R>, HttpError>
    where
        R: Send + 'static,
        F: Fn(String) -> Result<R, HttpError> + Send + 'static,
    {
        self.run(move |response| delivery::stream_chunks(response, transformer, None::<NoCheck>))
    }

    /// Stream body chunks as text, failing with the offending payload when a
    /// chunk matches the error predicate
    pub fn stream_text_with_error_check<P>(
        self,
        error_check: P,
    ) -> Result<ResponseStream<String>, HttpError>
    where
        P: Fn(&str) -> bool + Send + 'static,
    {
        self.stream_with_error_check(Ok, error_check)
    }

    /// Incrementally decode body chunks, failing with the offending payload
    /// when a chunk matches the error predicate
    pub fn stream_with_error_check<R, F, P>(
        self,
        transformer: F,
        error_check: P,
    ) -> Result<ResponseStream<R>, HttpError>
    where
        R: Send + 'static,
        F: Fn(String) -> Result<R, HttpError> + Send + 'static,
        P: Fn(&str) -> bool + Send + 'static,
    {
        self.run(move |response| delivery::stream_chunks(response, transformer, Some(error_check)))
    }

    fn run<R, D>(self, deliver: D) -> Result<ResponseStream<R>, HttpError>
    where
        R: Send + 'static,
        D: FnOnce(RawResponse) -> ResponseStream<R> + Send + 'static,
    {
        let (transport, request) = self.into_descriptor()?;
        Ok(Box::pin(stream! {
            match transport.execute(request).await {
                Ok(response) => {
                    let mut inner = deliver(response);
                    while let Some(item) = inner.next().await {
                        yield item;
                    }
                }
                Err(e) => yield Err(e),
            }
        }))
    }

    fn into_descriptor(self) -> Result<(Arc<dyn Transport>, RequestDescriptor), HttpError> {
        let url = resolve_endpoint_url(&self.base_url, &self.endpoint, &self.query)?;

        if !self.body.is_empty() && self.method != Method::POST {
            return Err(HttpError::InvalidArgument(format!(
                "{} requests cannot carry a body",
                self.method
            )));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                HttpError::InvalidArgument(format!("invalid header name '{name}': {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                HttpError::InvalidArgument(format!("invalid header value for '{name}': {e}"))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok((
            self.transport,
            RequestDescriptor {
                method: self.method,
                url,
                headers,
                body: self.body,
            },
        ))
    }
}
