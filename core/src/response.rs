use http::HeaderMap;

/// The result of one executed request.
///
/// `success` is only ever set for a 2xx status and `failure` only for any
/// other status, and each only when the matching shape was declared on the
/// builder.
#[derive(Debug, Clone)]
pub struct Response<S, F> {
    pub status: u16,
    pub headers: HeaderMap,
    pub success: Option<S>,
    pub failure: Option<F>,
}

impl<S, F> Response<S, F> {
    pub(crate) fn new(status: u16, headers: HeaderMap) -> Self {
        Self {
            status,
            headers,
            success: None,
            failure: None,
        }
    }

    /// Whether the status falls in the success class, 200 through 299.
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

pub(crate) fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}
