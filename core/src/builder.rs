//! The chainable request specification.
//!
//! # Design
//! `Request` collects intent only; nothing is encoded or sent until
//! `build_request` or `execute` runs. Setters consume and return the builder
//! so calls chain. Result shapes are type parameters: declaring one swaps the
//! type and stores the decoder for it, clearing one disables decoding for
//! that status class.
//!
//! `derive` produces an independent builder. The header map and shape slots
//! are duplicated, the transport is shared, and query and body stay shared
//! `Arc`s since they are treated as immutable payloads.

use std::fmt;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::http::{HttpMethod, Target};
use crate::transport::{Transport, UreqTransport};

/// A serializable value usable as a request body or query.
///
/// Implemented for every `Serialize + Send + Sync` type.
pub trait Payload: Send + Sync {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
    fn to_query(&self) -> Result<String, serde_urlencoded::ser::Error>;
}

impl<T: Serialize + Send + Sync> Payload for T {
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn to_query(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self)
    }
}

pub(crate) type Decoder<T> = fn(&[u8]) -> serde_json::Result<T>;

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(bytes)
}

/// A fluent HTTP request builder.
///
/// `S` is the type a 2xx reply body decodes into and `F` the type any other
/// reply body decodes into. Both default to `()` with decoding disabled.
pub struct Request<S = (), F = ()> {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) method: HttpMethod,
    pub(crate) url: Option<Target>,
    pub(crate) headers: HeaderMap,
    pub(crate) query: Option<Arc<dyn Payload>>,
    pub(crate) body: Option<Arc<dyn Payload>>,
    pub(crate) success: Option<Decoder<S>>,
    pub(crate) failure: Option<Decoder<F>>,
    pub(crate) invalid_header: Option<String>,
}

impl Request {
    /// Creates a `GET` builder using the default [`UreqTransport`].
    pub fn new() -> Self {
        Self::with_transport(Arc::new(UreqTransport::default()))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            method: HttpMethod::default(),
            url: None,
            headers: HeaderMap::new(),
            query: None,
            body: None,
            success: None,
            failure: None,
            invalid_header: None,
        }
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, F> Request<S, F> {
    /// Sets the method and stores `url` in normalized form.
    ///
    /// Relative references are kept as given. A URL that does not parse
    /// leaves the stored URL untouched.
    pub fn set_method(mut self, method: HttpMethod, url: &str) -> Self {
        self.method = method;
        match Target::parse(url) {
            Ok(parsed) => self.url = Some(parsed),
            Err(err) => debug!(url, error = %err, "ignoring unparseable url"),
        }
        self
    }

    pub fn get(self, url: &str) -> Self {
        self.set_method(HttpMethod::Get, url)
    }

    pub fn post(self, url: &str) -> Self {
        self.set_method(HttpMethod::Post, url)
    }

    pub fn put(self, url: &str) -> Self {
        self.set_method(HttpMethod::Put, url)
    }

    pub fn patch(self, url: &str) -> Self {
        self.set_method(HttpMethod::Patch, url)
    }

    pub fn delete(self, url: &str) -> Self {
        self.set_method(HttpMethod::Delete, url)
    }

    pub fn head(self, url: &str) -> Self {
        self.set_method(HttpMethod::Head, url)
    }

    /// Appends `value` to the values already stored under `key`.
    pub fn add_header(mut self, key: &str, value: &str) -> Self {
        if let Some((name, value)) = self.header_pair(key, value) {
            self.headers.append(name, value);
        }
        self
    }

    /// Replaces every value stored under `key` with `value`.
    pub fn set_header(mut self, key: &str, value: &str) -> Self {
        if let Some((name, value)) = self.header_pair(key, value) {
            self.headers.insert(name, value);
        }
        self
    }

    fn header_pair(&mut self, key: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => Some((name, value)),
            _ => {
                // Reported by build_request; the first offender wins.
                self.invalid_header.get_or_insert_with(|| key.to_string());
                None
            }
        }
    }

    /// Stores the value encoded into the query string when the request is built.
    pub fn set_query<Q: Serialize + Send + Sync + 'static>(mut self, query: Q) -> Self {
        self.query = Some(Arc::new(query));
        self
    }

    /// Stores the value sent as the JSON request body.
    pub fn set_body<B: Serialize + Send + Sync + 'static>(mut self, body: B) -> Self {
        self.body = Some(Arc::new(body));
        self
    }

    /// Decodes 2xx reply bodies into `T`.
    pub fn set_success<T: DeserializeOwned>(self) -> Request<T, F> {
        Request {
            transport: self.transport,
            method: self.method,
            url: self.url,
            headers: self.headers,
            query: self.query,
            body: self.body,
            success: Some(decode_json::<T>),
            failure: self.failure,
            invalid_header: self.invalid_header,
        }
    }

    /// Decodes non-2xx reply bodies into `T`.
    pub fn set_failure<T: DeserializeOwned>(self) -> Request<S, T> {
        Request {
            transport: self.transport,
            method: self.method,
            url: self.url,
            headers: self.headers,
            query: self.query,
            body: self.body,
            success: self.success,
            failure: Some(decode_json::<T>),
            invalid_header: self.invalid_header,
        }
    }

    pub fn clear_success(mut self) -> Self {
        self.success = None;
        self
    }

    pub fn clear_failure(mut self) -> Self {
        self.failure = None;
        self
    }

    /// Returns an independent copy that shares only the transport and the
    /// query/body payloads with `self`.
    pub fn derive(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            query: self.query.clone(),
            body: self.body.clone(),
            success: self.success,
            failure: self.failure,
            invalid_header: self.invalid_header.clone(),
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> Option<&Target> {
        self.url.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl<S, F> Clone for Request<S, F> {
    fn clone(&self) -> Self {
        self.derive()
    }
}

impl<S, F> fmt::Debug for Request<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url.as_ref().map(Target::as_str))
            .field("headers", &self.headers)
            .field("query", &self.query.is_some())
            .field("body", &self.body.is_some())
            .field("success", &self.success.is_some())
            .field("failure", &self.failure.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde::Deserialize;

    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::transport::FnTransport;

    #[derive(Serialize)]
    struct Query {
        id: u32,
        name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    fn offline() -> Arc<dyn Transport> {
        Arc::new(FnTransport(|_req: HttpRequest| {
            Err::<HttpResponse, TransportError>("offline".into())
        }))
    }

    fn values<'a>(request: &'a Request<impl Sized, impl Sized>, key: &str) -> Vec<&'a str> {
        request
            .headers()
            .get_all(key)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect()
    }

    #[test]
    fn new_request_defaults() {
        let request = Request::new();
        assert_eq!(request.method(), HttpMethod::Get);
        assert!(request.url().is_none());
        assert!(request.headers().is_empty());
        assert!(request.query.is_none());
        assert!(request.body.is_none());
        assert!(request.success.is_none());
        assert!(request.failure.is_none());
    }

    #[test]
    fn verb_setters_set_exactly_their_method() {
        let cases = [
            (Request::new().get("http://example.com"), HttpMethod::Get),
            (Request::new().post("http://example.com"), HttpMethod::Post),
            (Request::new().delete("http://example.com"), HttpMethod::Delete),
            (Request::new().put("http://example.com"), HttpMethod::Put),
            (Request::new().patch("http://example.com"), HttpMethod::Patch),
            (Request::new().head("http://example.com"), HttpMethod::Head),
        ];
        for (request, expected) in cases {
            assert_eq!(request.method(), expected);
            assert_eq!(request.url().unwrap().as_str(), "http://example.com/");
            assert!(request.headers().is_empty());
            assert!(request.query.is_none());
            assert!(request.body.is_none());
        }
    }

    #[test]
    fn unparseable_url_keeps_previous_url() {
        let request = Request::new()
            .get("http://example.com/users")
            .post("http://[::1");
        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.url().unwrap().as_str(), "http://example.com/users");
    }

    #[test]
    fn relative_url_is_stored_and_takes_the_query() {
        let request = Request::with_transport(offline())
            .get("/users?x=1")
            .set_query(Query {
                id: 20,
                name: "John".to_string(),
            });
        assert_eq!(
            request.url(),
            Some(&Target::Relative("/users?x=1".to_string()))
        );

        let built = request.build_request().unwrap();
        assert_eq!(built.url.as_str(), "/users?id=20&name=John");
    }

    #[test]
    fn add_header_accumulates_values() {
        let request = Request::new().add_header("A", "B").add_header("a", "C");
        assert_eq!(values(&request, "a"), vec!["B", "C"]);
    }

    #[test]
    fn header_keys_are_case_normalized() {
        let request = Request::new()
            .add_header("content-tYPE", "application/json")
            .add_header("Content-Type", "text/plain")
            .add_header("User-AGENT", "chrome");
        assert_eq!(request.headers().keys_len(), 2);
        assert_eq!(
            values(&request, "content-type"),
            vec!["application/json", "text/plain"]
        );
        assert_eq!(values(&request, "USER-AGENT"), vec!["chrome"]);
    }

    #[test]
    fn set_header_replaces_all_values() {
        let request = Request::new()
            .add_header("Accept", "text/html")
            .add_header("accept", "text/plain")
            .set_header("ACCEPT", "application/json");
        assert_eq!(values(&request, "accept"), vec!["application/json"]);
    }

    #[test]
    fn invalid_header_is_recorded_not_stored() {
        let request = Request::new()
            .add_header("bad header", "x")
            .add_header("other\n", "y");
        assert!(request.headers().is_empty());
        assert_eq!(request.invalid_header.as_deref(), Some("bad header"));
    }

    #[test]
    fn derive_shares_only_the_transport() {
        let original = Request::with_transport(offline())
            .post("http://example.com")
            .set_query(Query {
                id: 20,
                name: "John".to_string(),
            })
            .add_header("Client-ID", "1234");
        let derived = original.derive();

        assert!(Arc::ptr_eq(original.transport(), derived.transport()));
        assert_eq!(derived.method(), HttpMethod::Post);
        assert_eq!(derived.url(), original.url());
        assert_eq!(derived.headers(), original.headers());
        assert!(Arc::ptr_eq(
            original.query.as_ref().unwrap(),
            derived.query.as_ref().unwrap()
        ));

        let derived = derived.add_header("client-id", "5678");
        assert_eq!(values(&original, "client-id"), vec!["1234"]);
        assert_eq!(values(&derived, "client-id"), vec!["1234", "5678"]);
    }

    #[test]
    fn derive_before_or_after_adding_headers() {
        let after = Request::new().add_header("A", "B").add_header("a", "c").derive();
        let before = Request::new().add_header("A", "B").derive().add_header("a", "c");
        assert_eq!(values(&after, "a"), vec!["B", "c"]);
        assert_eq!(values(&before, "a"), vec!["B", "c"]);
    }

    #[test]
    fn derived_shape_slots_are_independent() {
        let original = Request::with_transport(offline()).set_failure::<User>();
        let derived = original.derive().clear_failure();
        assert!(original.failure.is_some());
        assert!(derived.failure.is_none());
    }

    #[test]
    fn shape_setters_keep_other_state() {
        let request = Request::new()
            .put("http://example.com/users/1")
            .set_header("X-Trace", "abc")
            .set_body(Query {
                id: 1,
                name: "Ann".to_string(),
            })
            .set_success::<User>()
            .set_failure::<serde_json::Value>();
        assert_eq!(request.method(), HttpMethod::Put);
        assert_eq!(values(&request, "x-trace"), vec!["abc"]);
        assert!(request.body.is_some());
        assert!(request.success.is_some());
        assert!(request.failure.is_some());

        let request = request.clear_success();
        assert!(request.success.is_none());
        assert!(request.failure.is_some());
    }

    #[test]
    fn declared_decoder_reads_json() {
        let request = Request::new().set_success::<User>();
        let decode = request.success.unwrap();
        let user = decode(br#"{"id":200,"name":"John"}"#).unwrap();
        assert_eq!(
            user,
            User {
                id: 200,
                name: "John".to_string()
            }
        );
    }
}
