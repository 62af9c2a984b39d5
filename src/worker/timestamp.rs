// Timestamp codec.
// Attaches and reads the single retrieval-time marker on a stored response.

use http::header::{HeaderName, HeaderValue};

use crate::http::Response;

/// Header carrying the storage time as an integer epoch-millisecond
/// string. This is the only persisted metadata distinguishing a tagged
/// entry from a raw response.
pub const TS_HEADER: &str = "x-sw-cache-time";

/// Return a copy of the response with the timestamp header set to `now`.
///
/// Opaque responses cannot be read or re-headed; they yield `None` and
/// must never be stored.
pub fn tag(response: &Response, now_millis: i64) -> Option<Response> {
    if response.is_opaque() {
        return None;
    }

    let value = HeaderValue::from_str(&now_millis.to_string()).ok()?;
    let mut tagged = response.clone();
    tagged.set_header(HeaderName::from_static(TS_HEADER), value);
    Some(tagged)
}

/// Extract the stored timestamp; missing or unparsable → `None`.
pub fn read_timestamp(response: &Response) -> Option<i64> {
    response.header(TS_HEADER)?.parse().ok()
}
