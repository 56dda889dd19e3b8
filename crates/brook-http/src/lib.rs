//! Push-based asynchronous HTTP client
//!
//! This crate issues GET/POST/DELETE/HEAD requests against a base endpoint,
//! reachable over TCP/TLS or a unix domain socket, and delivers every
//! response — single value or streamed — as a [`ResponseStream`]: a
//! `futures::Stream` of `Result<R, HttpError>` items. Dropping the stream
//! cancels the request and releases the response body.
//!
//! The underlying HTTP engine (pooling, redirects, TLS) is delegated to the
//! transport behind the [`transport::Transport`] trait; this crate owns URL
//! resolution, transport selection, the response transformation pipeline and
//! the error taxonomy.
//!
//! Query parameter values are not URL-escaped by this layer; callers must
//! pre-escape when needed.
//!
//! # Example
//!
//! ```no_run
//! use brook_http::{HttpClient, HttpError};
//! use futures::StreamExt;
//!
//! async fn example() -> Result<(), HttpError> {
//!     let client = HttpClient::new("http://localhost:2375")?;
//!     let mut containers = client
//!         .get("/containers/json")
//!         .query("all", "true")
//!         .json_seq::<serde_json::Value>()?;
//!     while let Some(container) = containers.next().await {
//!         println!("{}", container?);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod delivery;
mod endpoint;
mod error;
mod request;
mod response;
pub mod transport;

pub use client::HttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use endpoint::{resolve_endpoint_url, QueryParameter};
pub use error::HttpError;
pub use request::RequestBuilder;
pub use response::{HttpStatus, RawResponse, ResponseStream};
