// Request router.
// Claims GET requests, special-cases the dynamic endpoint, delegates the rest.

use http::StatusCode;
use tracing::{debug, warn};

use crate::http::{Request, Response};

use super::Worker;
use super::freshness::is_fresh;
use super::timestamp::tag;

impl Worker {
    /// The synchronous claim/decline decision made while the interception
    /// event is still on the stack. Only GET is ever intercepted.
    pub fn intercepts(&self, request: &Request) -> bool {
        request.is_get()
    }

    /// Route an intercepted request. `None` means the request was
    /// declined and falls through to default handling.
    pub async fn dispatch(&self, request: &Request) -> Option<Response> {
        if !self.intercepts(request) {
            return None;
        }
        Some(self.handle(request).await)
    }

    /// Answer a claimed GET: the designated same-origin dynamic endpoint
    /// bypasses the generic strategy; everything else runs the strict TTL
    /// policy. Always produces a response, never a fault.
    pub async fn handle(&self, request: &Request) -> Response {
        if request.same_origin(&self.config.scope)
            && request.path() == self.config.dynamic_endpoint
        {
            return self.handle_dynamic(request).await;
        }
        self.fetch_with_strict_ttl(request).await
    }

    /// Locally-simulated dynamic endpoint: serve the runtime-cached copy
    /// while fresh, else synthesize the current time, tag it, and store
    /// it. No upstream exists, so this path never yields a 503.
    async fn handle_dynamic(&self, request: &Request) -> Response {
        let key = request.key();
        let now = self.clock.now_millis();

        let cached = match self.cache.lookup_in(self.cache.runtime_name(), &key).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(url = %request.url, error = %e, "dynamic endpoint cache lookup failed");
                None
            }
        };
        if let Some(cached) = cached {
            if is_fresh(&cached, now, self.config.ttl) {
                debug!(url = %request.url, "dynamic endpoint served from cache");
                return cached;
            }
        }

        let payload = serde_json::json!({ "now": self.clock.now_iso() });
        let response = match Response::json(StatusCode::OK, &payload) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "failed to encode dynamic payload");
                Response::new(StatusCode::OK, Vec::new())
            }
        };
        let tagged = tag(&response, now).unwrap_or(response);

        if let Err(e) = self
            .cache
            .store(self.cache.runtime_name(), key, tagged.clone())
            .await
        {
            warn!(url = %request.url, error = %e, "failed to store dynamic payload");
        }

        tagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::config::WorkerConfig;
    use crate::worker::testing::{ManualClock, ScriptedFetcher, get, ok_body};
    use http::Method;
    use std::sync::Arc;
    use url::Url;

    const T: i64 = 1_700_000_000_000;

    struct Rig {
        worker: Worker,
        fetcher: Arc<ScriptedFetcher>,
        clock: Arc<ManualClock>,
    }

    fn rig(fetcher: ScriptedFetcher) -> Rig {
        let fetcher = Arc::new(fetcher);
        let clock = Arc::new(ManualClock::new(T));
        let worker = Worker::with_collaborators(
            WorkerConfig::new("v1", Url::parse("https://app.example/").unwrap()),
            Arc::new(MemoryStorage::new()),
            fetcher.clone(),
            clock.clone(),
            Arc::new(crate::worker::NoClients),
        );
        Rig {
            worker,
            fetcher,
            clock,
        }
    }

    fn parse_now(response: &Response) -> String {
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        body["now"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_non_get_is_not_intercepted() {
        let rig = rig(ScriptedFetcher::unreachable());
        let post = Request::new(
            Method::POST,
            Url::parse("https://app.example/api/submit").unwrap(),
        );

        assert!(!rig.worker.intercepts(&post));
        assert!(rig.worker.dispatch(&post).await.is_none());
        assert_eq!(rig.fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_endpoint_succeeds_without_any_network() {
        let rig = rig(ScriptedFetcher::unreachable());
        let request = get("https://app.example/api/time");

        let served = rig.worker.dispatch(&request).await.unwrap();

        assert_eq!(served.status, StatusCode::OK);
        assert_eq!(served.header("content-type"), Some("application/json"));
        let now = parse_now(&served);
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
        assert_eq!(rig.fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_endpoint_serves_cached_copy_inside_ttl() {
        let rig = rig(ScriptedFetcher::unreachable());
        let request = get("https://app.example/api/time");

        let first = rig.worker.handle(&request).await;
        rig.clock.advance(60_000);
        let second = rig.worker.handle(&request).await;

        assert_eq!(parse_now(&first), parse_now(&second));
    }

    #[tokio::test]
    async fn test_dynamic_endpoint_regenerates_after_ttl() {
        let rig = rig(ScriptedFetcher::unreachable());
        let request = get("https://app.example/api/time");

        let first = rig.worker.handle(&request).await;
        rig.clock.advance(180_001);
        let second = rig.worker.handle(&request).await;

        assert_eq!(second.status, StatusCode::OK);
        assert_ne!(parse_now(&first), parse_now(&second));
    }

    #[tokio::test]
    async fn test_dynamic_path_on_foreign_origin_uses_ttl_strategy() {
        let rig = rig(ScriptedFetcher::always(ok_body("elsewhere")));
        let request = get("https://other.example/api/time");

        let served = rig.worker.handle(&request).await;

        assert_eq!(served.body, b"elsewhere");
        assert_eq!(rig.fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_other_gets_delegate_to_ttl_strategy() {
        let rig = rig(ScriptedFetcher::unreachable());
        let request = get("https://app.example/missing");

        let served = rig.worker.dispatch(&request).await.unwrap();

        assert_eq!(served.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(rig.fetcher.call_count(), 1);
    }
}
