//! Error types for building and executing requests.
//!
//! # Design
//! `RequestError` covers every failure that leaves no response behind: the
//! request could not be materialized, the transport failed, or the reply body
//! could not be read. Decoding a reply is different because status and
//! headers are already known, so `ExecuteError::Decode` hands the partially
//! populated `Response` back together with the cause.

use std::fmt;

use crate::response::Response;

/// Boxed error returned by a [`Transport`](crate::Transport).
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that abort a request before a response exists.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// No valid request target was stored on the builder.
    #[error("malformed request url")]
    MalformedUrl,

    /// A header name or value could not be represented on the wire.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The transport failed to exchange the request.
    #[error(transparent)]
    Transport(TransportError),

    /// The reply body stream could not be read to the end.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] std::io::Error),
}

/// Errors returned by `Request::execute`.
#[derive(Debug)]
pub enum ExecuteError<S, F> {
    /// Nothing was received, or nothing could be read.
    Request(RequestError),

    /// The reply arrived but its body did not match the declared shape.
    Decode {
        response: Response<S, F>,
        source: serde_json::Error,
    },
}

impl<S, F> ExecuteError<S, F> {
    /// The partially populated response, if the reply was received.
    pub fn response(&self) -> Option<&Response<S, F>> {
        match self {
            ExecuteError::Request(_) => None,
            ExecuteError::Decode { response, .. } => Some(response),
        }
    }

    pub fn into_response(self) -> Option<Response<S, F>> {
        match self {
            ExecuteError::Request(_) => None,
            ExecuteError::Decode { response, .. } => Some(response),
        }
    }
}

impl<S, F> From<RequestError> for ExecuteError<S, F> {
    fn from(err: RequestError) -> Self {
        ExecuteError::Request(err)
    }
}

impl<S, F> fmt::Display for ExecuteError<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteError::Request(err) => fmt::Display::fmt(err, f),
            ExecuteError::Decode { source, .. } => {
                write!(f, "failed to decode API response: {source}")
            }
        }
    }
}

impl<S: fmt::Debug, F: fmt::Debug> std::error::Error for ExecuteError<S, F> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecuteError::Request(err) => std::error::Error::source(err),
            ExecuteError::Decode { source, .. } => Some(source),
        }
    }
}
