// Cache generation manager.
// Owns the static/runtime generation names for one version and all generation lifecycles.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::http::{RequestKey, Response};

use super::store::CacheStorage;

/// Name of the precached-shell generation for a version.
pub fn static_generation(version: &str) -> String {
    format!("static-{version}")
}

/// Name of the runtime generation for a version.
pub fn runtime_generation(version: &str) -> String {
    format!("runtime-{version}")
}

/// Exclusive owner of generation lifecycles. Other components read and
/// write entries only through this interface; none of them creates or
/// deletes generations directly.
#[derive(Clone)]
pub struct CacheManager {
    storage: Arc<dyn CacheStorage>,
    static_name: String,
    runtime_name: String,
}

impl CacheManager {
    pub fn new(storage: Arc<dyn CacheStorage>, version: &str) -> Self {
        Self {
            storage,
            static_name: static_generation(version),
            runtime_name: runtime_generation(version),
        }
    }

    /// Current static generation name.
    pub fn static_name(&self) -> &str {
        &self.static_name
    }

    /// Current runtime generation name.
    pub fn runtime_name(&self) -> &str {
        &self.runtime_name
    }

    /// Open-or-create a generation.
    pub async fn open(&self, generation: &str) -> Result<()> {
        self.storage.open(generation).await
    }

    /// Search the static generation first, then the runtime generation.
    /// First match wins; the order is fixed for determinism.
    pub async fn lookup(&self, key: &RequestKey) -> Result<Option<Response>> {
        if let Some(found) = self.storage.get(&self.static_name, key).await? {
            return Ok(Some(found));
        }
        self.storage.get(&self.runtime_name, key).await
    }

    /// Look up an entry in one named generation only.
    pub async fn lookup_in(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>> {
        self.storage.get(generation, key).await
    }

    /// Store an entry in a generation, overwriting any prior entry for
    /// the same identity.
    pub async fn store(&self, generation: &str, key: RequestKey, response: Response) -> Result<()> {
        self.storage.put(generation, key, response).await
    }

    /// Delete every generation whose name is not current. Returns the
    /// evicted names. Invoked exactly once per activation.
    pub async fn evict_orphans(&self) -> Result<Vec<String>> {
        let current: HashSet<&str> =
            [self.static_name.as_str(), self.runtime_name.as_str()].into();

        let mut evicted = Vec::new();
        for name in self.storage.list_generations().await? {
            if !current.contains(name.as_str()) {
                self.storage.delete_generation(&name).await?;
                evicted.push(name);
            }
        }

        if !evicted.is_empty() {
            info!(evicted = ?evicted, "evicted orphan cache generations");
        }
        Ok(evicted)
    }
}
