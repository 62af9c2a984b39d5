// Shared test doubles for the worker modules.
// Manual clock, scripted fetcher, and request/response helpers.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use http::StatusCode;
use url::Url;

use crate::error::{Result, StrataError};
use crate::http::{Request, Response};
use crate::net::Fetch;

/// Clock pinned to a settable instant.
pub(crate) struct ManualClock {
    now: Mutex<i64>,
}

impl ManualClock {
    pub(crate) fn new(start: i64) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub(crate) fn set(&self, now: i64) {
        *self.now.lock().unwrap() = now;
    }

    pub(crate) fn advance(&self, millis: i64) {
        *self.now.lock().unwrap() += millis;
    }
}

impl crate::clock::Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        *self.now.lock().unwrap()
    }
}

/// Fetcher that replays scripted replies and counts every call.
///
/// With an empty script and no default reply, every fetch fails the way a
/// dead network does.
pub(crate) struct ScriptedFetcher {
    replies: Mutex<VecDeque<Result<Response>>>,
    default_reply: Option<Response>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    /// No replies at all: the network is unreachable.
    pub(crate) fn unreachable() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every fetch succeeds with a clone of the given response.
    pub(crate) fn always(response: Response) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: Some(response),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue one successful reply ahead of the default.
    pub(crate) fn push_ok(&self, response: Response) {
        self.replies.lock().unwrap().push_back(Ok(response));
    }

    /// Queue one network failure ahead of the default.
    pub(crate) fn push_failure(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(StrataError::Other("connection refused".to_string())));
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for ScriptedFetcher {
    async fn fetch(&self, _request: &Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        match &self.default_reply {
            Some(response) => Ok(response.clone()),
            None => Err(StrataError::Other("network unreachable".to_string())),
        }
    }
}

pub(crate) fn get(url: &str) -> Request {
    Request::get(Url::parse(url).unwrap())
}

pub(crate) fn ok_body(body: &str) -> Response {
    Response::new(StatusCode::OK, body.as_bytes().to_vec())
}
