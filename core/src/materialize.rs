//! Turning builder state into a wire-ready [`HttpRequest`].

use tracing::warn;

use crate::builder::Request;
use crate::error::RequestError;
use crate::http::{HttpRequest, Target};

impl<S, F> Request<S, F> {
    /// Materializes the request without sending it.
    ///
    /// The body is serialized to JSON and the query value, if any, replaces
    /// the query component of the stored URL. A query value that cannot be
    /// url-encoded is dropped and the request is built without one.
    pub fn build_request(&self) -> Result<HttpRequest, RequestError> {
        let body = match &self.body {
            Some(payload) => Some(payload.to_json().map_err(RequestError::Encode)?),
            None => None,
        };

        let mut url = self.url.clone().ok_or(RequestError::MalformedUrl)?;
        match &url {
            Target::Absolute(absolute) if absolute.cannot_be_a_base() => {
                return Err(RequestError::MalformedUrl)
            }
            Target::Relative(reference) if reference.is_empty() => {
                return Err(RequestError::MalformedUrl)
            }
            _ => {}
        }
        if let Some(name) = &self.invalid_header {
            return Err(RequestError::InvalidHeader(name.clone()));
        }

        if let Some(query) = &self.query {
            match query.to_query() {
                Ok(encoded) if encoded.is_empty() => url.set_query(None),
                Ok(encoded) => url.set_query(Some(&encoded)),
                Err(err) => warn!(error = %err, "query could not be encoded, sending without one"),
            }
        }

        Ok(HttpRequest {
            method: self.method,
            url,
            headers: self.headers.clone(),
            body,
        })
    }
}
