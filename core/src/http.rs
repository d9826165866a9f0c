//! HTTP descriptor types exchanged with a [`Transport`](crate::Transport).
//!
//! # Design
//! These types describe HTTP requests and replies as plain data. The builder
//! materializes an `HttpRequest`, a transport turns it into an `HttpResponse`,
//! and the executor decodes that reply. Keeping both sides as data lets tests
//! swap the network for any function that maps one to the other.
//!
//! The reply body stays a stream (`Box<dyn Read>`) so the executor decides
//! when it is consumed and dropped.

use std::fmt;
use std::io::{Cursor, Read};

use http::HeaderMap;
use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
        }
    }
}

/// Where a request is sent.
///
/// Absolute URLs are normalized by `url::Url`. Relative references such as
/// `/users?x=1` have no base to resolve against, so they are kept as given;
/// a transport that needs a host rejects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Absolute(Url),
    Relative(String),
}

impl Target {
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        match Url::parse(input) {
            Ok(url) => Ok(Target::Absolute(url)),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Target::Relative(input.to_string())),
            Err(err) => Err(err),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Target::Absolute(url) => url.as_str(),
            Target::Relative(reference) => reference,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Target::Absolute(url) => url.query(),
            Target::Relative(reference) => {
                let before_fragment = reference.split('#').next().unwrap_or_default();
                before_fragment.split_once('?').map(|(_, query)| query)
            }
        }
    }

    /// Replaces the whole query component; `None` removes it.
    pub fn set_query(&mut self, query: Option<&str>) {
        match self {
            Target::Absolute(url) => url.set_query(query),
            Target::Relative(reference) => {
                let (rest, fragment) = match reference.split_once('#') {
                    Some((rest, fragment)) => (rest, Some(fragment)),
                    None => (reference.as_str(), None),
                };
                let mut updated = rest.split('?').next().unwrap_or_default().to_string();
                if let Some(query) = query {
                    updated.push('?');
                    updated.push_str(query);
                }
                if let Some(fragment) = fragment {
                    updated.push('#');
                    updated.push_str(fragment);
                }
                *reference = updated;
            }
        }
    }
}

impl From<Url> for Target {
    fn from(url: Url) -> Self {
        Target::Absolute(url)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wire-ready HTTP request.
///
/// Produced by `Request::build_request`. Headers are the builder's header
/// map at materialization time; the body is already JSON-encoded.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Target,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// An HTTP reply as handed back by a transport.
///
/// The body is an unread stream. Dropping the value releases it.
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Box<dyn Read>,
}

impl HttpResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Read + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }

    /// Reply whose body is an in-memory buffer.
    pub fn from_bytes(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, headers, Cursor::new(body.into()))
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
