// Worker module: the request-interception core.
// Freshness policy, TTL fetch strategy, routing, and lifecycle management.

use std::sync::{Arc, Mutex};

use crate::cache::{CacheManager, CacheStorage};
use crate::clock::{Clock, SystemClock};
use crate::config::WorkerConfig;
use crate::net::Fetch;

pub mod cacheable;
pub mod freshness;
pub mod lifecycle;
pub mod router;
pub mod strategy;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod testing;

pub use cacheable::is_cacheable;
pub use freshness::is_fresh;
pub use lifecycle::{Clients, NoClients, WorkerState};
pub use timestamp::{TS_HEADER, read_timestamp, tag};

/// The interception core for one deployed version.
///
/// Collaborators (storage, network, clock, clients) are injected so the
/// whole policy runs against fakes in tests. Concurrency safety across
/// interleaved requests relies on per-identity overwrite idempotence in
/// the store, not on locking.
pub struct Worker {
    config: WorkerConfig,
    cache: CacheManager,
    fetcher: Arc<dyn Fetch>,
    clock: Arc<dyn Clock>,
    clients: Arc<dyn lifecycle::Clients>,
    state: Mutex<WorkerState>,
}

impl Worker {
    /// Worker with the system clock and no client registry.
    pub fn new(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetch>,
    ) -> Self {
        Self::with_collaborators(
            config,
            storage,
            fetcher,
            Arc::new(SystemClock),
            Arc::new(NoClients),
        )
    }

    /// Worker with every collaborator supplied by the embedder.
    pub fn with_collaborators(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetch>,
        clock: Arc<dyn Clock>,
        clients: Arc<dyn lifecycle::Clients>,
    ) -> Self {
        let cache = CacheManager::new(storage, &config.version);
        Self {
            config,
            cache,
            fetcher,
            clock,
            clients,
            state: Mutex::new(WorkerState::Installing),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }
}
