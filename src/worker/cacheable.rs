// Cacheability filter.
// Decides whether a request/response pair is eligible for storage.

use http::StatusCode;
use url::Url;

use crate::http::{Request, Response};

/// True iff the response is a readable same-origin 200 answering a GET.
/// Anything else is never persisted.
pub fn is_cacheable(request: &Request, response: &Response, scope: &Url) -> bool {
    if response.is_opaque() || response.status != StatusCode::OK {
        return false;
    }
    if !request.same_origin(scope) {
        return false;
    }
    request.is_get()
}
