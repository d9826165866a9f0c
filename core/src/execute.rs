//! Sending a request and decoding its reply.

use std::io::Read;

use tracing::debug;

use crate::builder::{Decoder, Request};
use crate::error::{ExecuteError, RequestError};
use crate::http::HttpResponse;
use crate::response::{is_success_status, Response};

impl<S, F> Request<S, F> {
    /// Builds the request, sends it through the transport and decodes the
    /// reply body.
    ///
    /// A 2xx body decodes into the success shape and any other body into the
    /// failure shape. A class with no declared shape is not decoded. When
    /// decoding fails the error still carries the response with its status
    /// and headers.
    pub fn execute(&self) -> Result<Response<S, F>, ExecuteError<S, F>> {
        let request = self.build_request()?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let HttpResponse {
            status,
            headers,
            body: mut stream,
        } = self
            .transport
            .send(request)
            .map_err(RequestError::Transport)?;
        debug!(status, "received response");

        let mut body = Vec::new();
        stream.read_to_end(&mut body).map_err(RequestError::BodyRead)?;
        drop(stream);

        let mut response = Response::new(status, headers);
        let decoded = if is_success_status(status) {
            decode_into(self.success, &body, &mut response.success)
        } else {
            decode_into(self.failure, &body, &mut response.failure)
        };

        match decoded {
            Ok(()) => Ok(response),
            Err(source) => {
                debug!(status, error = %source, "response body did not match declared shape");
                Err(ExecuteError::Decode { response, source })
            }
        }
    }
}

fn decode_into<T>(
    decoder: Option<Decoder<T>>,
    body: &[u8],
    slot: &mut Option<T>,
) -> serde_json::Result<()> {
    if let Some(decode) = decoder {
        *slot = Some(decode(body)?);
    }
    Ok(())
}
