// Freshness evaluator.
// The sole staleness authority; no other component judges freshness independently.

use std::time::Duration;

use crate::http::Response;

use super::timestamp::read_timestamp;

/// Whether a stored response is still inside the freshness window.
///
/// An entry without a readable timestamp is never fresh. Age is measured
/// as `now - stored_at` and must lie in `[0, ttl]` inclusive; a negative
/// age means clock skew and is not trusted.
pub fn is_fresh(response: &Response, now_millis: i64, ttl: Duration) -> bool {
    let Some(stored_at) = read_timestamp(response) else {
        return false;
    };

    let age = now_millis - stored_at;
    age >= 0 && age as u128 <= ttl.as_millis()
}
