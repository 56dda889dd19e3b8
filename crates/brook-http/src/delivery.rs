//! Response delivery: whole-body transformation and incremental decoding
//!
//! Every function here turns a [`RawResponse`] into a [`ResponseStream`].
//! A non-success status yields exactly one [`HttpError::Status`] and never
//! invokes a transformer. Producers are generator blocks that suspend at
//! every yield and every body read, so a dropped consumer stops the drain
//! within one iteration and the body is released on every exit path.

use async_stream::stream;
use bytes::Bytes;
use futures::StreamExt;

use crate::error::HttpError;
use crate::response::{HttpStatus, RawResponse, ResponseStream};

fn status_failure(response: &RawResponse) -> HttpError {
    HttpError::Status {
        status: response.status(),
        message: response.status_message().to_string(),
    }
}

/// Deliver the whole body as one text item. An empty successful body
/// completes with zero items.
pub(crate) fn deliver_text(response: RawResponse) -> ResponseStream<String> {
    Box::pin(stream! {
        if !response.is_success() {
            yield Err(status_failure(&response));
            return;
        }
        match response.text().await {
            Ok(text) if text.is_empty() => {}
            Ok(text) => yield Ok(text),
            Err(e) => yield Err(e),
        }
    })
}

/// Read the whole body, apply a single-value transformer once, deliver one item
pub(crate) fn deliver_one<R, F>(response: RawResponse, transformer: F) -> ResponseStream<R>
where
    R: Send + 'static,
    F: Fn(String) -> Result<R, HttpError> + Send + 'static,
{
    Box::pin(stream! {
        if !response.is_success() {
            yield Err(status_failure(&response));
            return;
        }
        match response.text().await {
            Ok(text) => yield transformer(text),
            Err(e) => yield Err(e),
        }
    })
}

/// Read the whole body, apply a sequence transformer once, deliver each
/// element in order
pub(crate) fn deliver_many<R, F>(response: RawResponse, transformer: F) -> ResponseStream<R>
where
    R: Send + 'static,
    F: Fn(String) -> Result<Vec<R>, HttpError> + Send + 'static,
{
    Box::pin(stream! {
        if !response.is_success() {
            yield Err(status_failure(&response));
            return;
        }
        match response.text().await {
            Ok(text) => match transformer(text) {
                Ok(items) => {
                    for item in items {
                        yield Ok(item);
                    }
                }
                Err(e) => yield Err(e),
            },
            Err(e) => yield Err(e),
        }
    })
}

/// Deliver the status line as a single item
pub(crate) fn deliver_status(response: RawResponse) -> ResponseStream<HttpStatus> {
    Box::pin(stream! {
        if !response.is_success() {
            yield Err(status_failure(&response));
            return;
        }
        yield Ok(response.http_status());
    })
}

/// Deliver the raw response itself as a single item
pub(crate) fn deliver_response(response: RawResponse) -> ResponseStream<RawResponse> {
    Box::pin(stream! {
        if !response.is_success() {
            yield Err(status_failure(&response));
            return;
        }
        yield Ok(response);
    })
}

/// Stream raw body chunks as they arrive
pub(crate) fn stream_bytes(response: RawResponse) -> ResponseStream<Bytes> {
    Box::pin(stream! {
        if !response.is_success() {
            yield Err(status_failure(&response));
            return;
        }
        let mut body = response.into_body_stream();
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => yield Ok(bytes),
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    })
}

/// Incrementally decode body chunks, optionally watching for an in-band
/// error payload.
///
/// A chunk matching `error_check` yields one [`HttpError::StreamResponse`]
/// carrying the offending payload and terminates, even though the HTTP
/// status was success.
pub(crate) fn stream_chunks<R, F, P>(
    response: RawResponse,
    transformer: F,
    error_check: Option<P>,
) -> ResponseStream<R>
where
    R: Send + 'static,
    F: Fn(String) -> Result<R, HttpError> + Send + 'static,
    P: Fn(&str) -> bool + Send + 'static,
{
    Box::pin(stream! {
        if !response.is_success() {
            yield Err(status_failure(&response));
            return;
        }
        let mut body = response.into_body_stream();
        while let Some(chunk) = body.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let text = match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(e) => {
                    yield Err(HttpError::Transform(e.to_string()));
                    return;
                }
            };
            if let Some(check) = &error_check {
                if check(&text) {
                    yield Err(HttpError::StreamResponse(text));
                    return;
                }
            }
            match transformer(text) {
                Ok(item) => yield Ok(item),
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    })
}
