//! Fluent builder for outbound HTTP requests.
//!
//! # Overview
//! A `Request` is configured through chained setters, then materialized into
//! an `HttpRequest` and sent through a `Transport`. The reply body is decoded
//! from JSON into one of two caller-declared shapes depending on the status:
//! the success shape for 2xx, the failure shape for everything else.
//!
//! ```no_run
//! use fluent_request::Request;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct Search { name: String }
//!
//! #[derive(Debug, Deserialize)]
//! struct User { id: u32, name: String }
//!
//! #[derive(Debug, Deserialize)]
//! struct ApiError { message: String }
//!
//! let response = Request::new()
//!     .get("https://api.example.com/users")
//!     .set_query(Search { name: "John".into() })
//!     .add_header("Accept", "application/json")
//!     .set_success::<Vec<User>>()
//!     .set_failure::<ApiError>()
//!     .execute()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Design
//! - Setters take and return the builder by value so calls chain.
//!   `derive` copies a builder; the copy shares only the transport and the
//!   query/body payloads.
//! - Body and query values are any `Serialize` type, encoded with
//!   `serde_json` and `serde_urlencoded` when the request is built. A query
//!   that fails to encode is dropped rather than failing the request.
//! - The transport is a one-method trait; `UreqTransport` is the blocking
//!   default with a fixed timeout, and tests substitute closures.

pub mod builder;
pub mod error;
pub mod execute;
pub mod http;
pub mod materialize;
pub mod response;
pub mod transport;

pub use builder::{Payload, Request};
pub use error::{ExecuteError, RequestError, TransportError};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse, Target};
pub use response::Response;
pub use transport::{FnTransport, Transport, UreqTransport, DEFAULT_TIMEOUT};
