//! The network seam.
//!
//! # Design
//! A transport exchanges one `HttpRequest` for one `HttpResponse`, blocking
//! the calling thread. Builders hold it behind an `Arc` and derived builders
//! share it, so implementations must be usable from several threads at once.
//! `UreqTransport` is the production default; tests plug in closures through
//! `FnTransport` or their own types.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Target};

/// Deadline applied by the default transport to a whole request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Sends a request and returns the reply with its body unread.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Adapts a closure into a [`Transport`].
pub struct FnTransport<Func>(pub Func);

impl<Func> Transport for FnTransport<Func>
where
    Func: Fn(HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (self.0)(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// Non-2xx replies are returned as data, not as errors, so the executor can
/// route them to the failure shape.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let uri: http::Uri = match url {
            Target::Absolute(absolute) => absolute.as_str().parse()?,
            Target::Relative(reference) => {
                return Err(format!("relative url `{reference}` has no host to connect to").into())
            }
        };

        let response = match body {
            Some(bytes) => {
                let mut outgoing = http::Request::new(bytes);
                *outgoing.method_mut() = method.into();
                *outgoing.uri_mut() = uri;
                *outgoing.headers_mut() = headers;
                self.agent.run(outgoing)?
            }
            None => {
                let mut outgoing = http::Request::new(());
                *outgoing.method_mut() = method.into();
                *outgoing.uri_mut() = uri;
                *outgoing.headers_mut() = headers;
                self.agent.run(outgoing)?
            }
        };

        let (parts, body) = response.into_parts();
        Ok(HttpResponse::new(
            parts.status.as_u16(),
            parts.headers,
            body.into_reader(),
        ))
    }
}
