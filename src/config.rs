// Worker configuration.
// Version, TTL, scope origin, precache manifest, and the dynamic endpoint path.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Default freshness window: 3 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 60);

/// Shell assets fetched into the static generation at install time.
pub const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/index.html",
    "/styles.css",
    "/app.js",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
    "/manifest.webmanifest",
];

/// Configuration for one deployed version of the caching layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Build/deploy identifier embedded in generation names.
    pub version: String,
    /// Freshness window measured from the stored timestamp.
    pub ttl: Duration,
    /// Registered scope; only requests to this origin are ever cached.
    pub scope: Url,
    /// Ordered manifest of same-origin paths precached on install.
    pub precache: Vec<String>,
    /// Path of the locally-simulated dynamic endpoint.
    pub dynamic_endpoint: String,
}

impl WorkerConfig {
    /// Config for the given version and scope with the reference policy
    /// defaults (3 minute TTL, shell manifest, `/api/time`).
    pub fn new(version: impl Into<String>, scope: Url) -> Self {
        Self {
            version: version.into(),
            ttl: DEFAULT_TTL,
            scope,
            precache: DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect(),
            dynamic_endpoint: "/api/time".to_string(),
        }
    }

    /// Whether a request path is part of the precache manifest.
    pub fn is_precached(&self, path: &str) -> bool {
        self.precache.iter().any(|p| p == path)
    }

    /// Resolve a manifest path against the scope origin.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.scope.join(path)?)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::new(
            "v1.0.0",
            Url::parse("http://localhost:8080/").expect("static scope URL"),
        )
    }
}
