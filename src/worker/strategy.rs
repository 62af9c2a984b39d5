// TTL fetch strategy.
// Fresh entries short-circuit the network; stale plus network failure is a hard 503.

use http::StatusCode;
use tracing::{debug, warn};

use crate::http::{Request, Response};

use super::Worker;
use super::cacheable::is_cacheable;
use super::freshness::is_fresh;
use super::timestamp::tag;

/// Body of the synthetic failure response when the network is down and no
/// fresh entry exists.
pub const FAILURE_MESSAGE: &str = "Network failed and no fresh cache available";

impl Worker {
    /// Serve a GET under the strict TTL policy.
    ///
    /// A fresh cached entry is returned without any network I/O. A miss or
    /// stale entry forces a live fetch; on success the response is tagged
    /// and stored (static generation for manifest paths, runtime
    /// otherwise), on failure a synthetic 503 is returned. A stale entry
    /// is never substituted for a failed fetch.
    ///
    /// Two concurrent requests for the same stale identity may both fetch
    /// and both store; the store is an idempotent overwrite, so the last
    /// write wins at the cost of a redundant fetch.
    pub(crate) async fn fetch_with_strict_ttl(&self, request: &Request) -> Response {
        let key = request.key();

        let cached = match self.cache.lookup(&key).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(url = %request.url, error = %e, "cache lookup failed, treating as miss");
                None
            }
        };

        if let Some(cached) = cached {
            if is_fresh(&cached, self.clock.now_millis(), self.config.ttl) {
                debug!(url = %request.url, "fresh cache hit");
                return cached;
            }
            debug!(url = %request.url, "cache entry stale, forcing network fetch");
        }

        match self.fetcher.fetch(request).await {
            Ok(live) => self.tag_and_store(request, live).await,
            Err(e) => {
                warn!(url = %request.url, error = %e, "network failed with no fresh cache");
                network_failure_response()
            }
        }
    }

    /// Tag and store a live response if it is eligible; non-cacheable
    /// responses pass through unmodified and unstored.
    async fn tag_and_store(&self, request: &Request, live: Response) -> Response {
        if !is_cacheable(request, &live, &self.config.scope) {
            debug!(url = %request.url, status = %live.status, "response not cacheable, passing through");
            return live;
        }

        let Some(tagged) = tag(&live, self.clock.now_millis()) else {
            return live;
        };

        let generation = if self.config.is_precached(request.path()) {
            self.cache.static_name()
        } else {
            self.cache.runtime_name()
        };

        if let Err(e) = self
            .cache
            .store(generation, request.key(), tagged.clone())
            .await
        {
            warn!(url = %request.url, error = %e, "failed to store fetched response");
        }

        tagged
    }
}

/// The documented 503 wire shape: JSON with a single error field.
pub(crate) fn network_failure_response() -> Response {
    Response::json(
        StatusCode::SERVICE_UNAVAILABLE,
        &serde_json::json!({ "error": FAILURE_MESSAGE }),
    )
    .unwrap_or_else(|_| Response::new(StatusCode::SERVICE_UNAVAILABLE, Vec::new()))
}
