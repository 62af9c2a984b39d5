// Lifecycle manager.
// Install-time precache, activate-time orphan eviction, and client claiming.

use async_trait::async_trait;
use http::StatusCode;
use tracing::{info, warn};

use crate::error::{Result, StrataError};
use crate::http::Request;

use super::Worker;
use super::timestamp::tag;

/// Lifecycle position of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Precaching the manifest into the new static generation.
    Installing,
    /// Installed; waiting is skipped immediately for fast rollout.
    Waiting,
    /// Controlling clients and intercepting requests.
    Active,
    /// Replaced by a newer version's activation.
    Superseded,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Installing => "installing",
            WorkerState::Waiting => "waiting",
            WorkerState::Active => "active",
            WorkerState::Superseded => "superseded",
        }
    }
}

/// Registry of open client pages; `claim_all` puts them under this
/// version's control without waiting for their next navigation.
#[async_trait]
pub trait Clients: Send + Sync {
    async fn claim_all(&self) -> Result<()>;
}

/// Client registry for embedders without controllable pages.
#[derive(Debug, Default)]
pub struct NoClients;

#[async_trait]
impl Clients for NoClients {
    async fn claim_all(&self) -> Result<()> {
        Ok(())
    }
}

impl Worker {
    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, next: WorkerState) {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
    }

    /// Populate the new static generation from the precache manifest.
    ///
    /// All-or-nothing: every manifest path is fetched before anything is
    /// stored, so a single failure (including a non-200) aborts the
    /// install with no entries written and the prior generation set
    /// untouched. A failed install is fatal to this version's rollout.
    pub async fn install(&self) -> Result<()> {
        self.set_state(WorkerState::Installing);
        info!(version = %self.config.version, "installing");

        let mut fetched = Vec::with_capacity(self.config.precache.len());
        for path in &self.config.precache {
            let url = self.config.resolve(path)?;
            let request = Request::get(url);

            let response =
                self.fetcher
                    .fetch(&request)
                    .await
                    .map_err(|e| StrataError::Precache {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
            if response.status != StatusCode::OK {
                return Err(StrataError::Precache {
                    path: path.clone(),
                    reason: format!("status {}", response.status),
                });
            }

            let tagged = tag(&response, self.clock.now_millis()).ok_or_else(|| {
                StrataError::Precache {
                    path: path.clone(),
                    reason: "opaque response".to_string(),
                }
            })?;
            fetched.push((request.key(), tagged));
        }

        self.cache.open(self.cache.static_name()).await?;
        for (key, response) in fetched {
            self.cache
                .store(self.cache.static_name(), key, response)
                .await?;
        }

        // Skip the waiting phase: forced activation over deferring to the
        // next navigation.
        self.set_state(WorkerState::Waiting);
        info!(
            version = %self.config.version,
            precached = self.config.precache.len(),
            "installed, waiting phase skipped"
        );
        Ok(())
    }

    /// Evict every generation outside the current `{static, runtime}`
    /// pair, then claim open clients so this version intercepts
    /// immediately.
    pub async fn activate(&self) -> Result<()> {
        self.cache.open(self.cache.runtime_name()).await?;

        let evicted = self.cache.evict_orphans().await?;
        if let Err(e) = self.clients.claim_all().await {
            warn!(error = %e, "client claim failed");
            return Err(e);
        }

        self.set_state(WorkerState::Active);
        info!(
            version = %self.config.version,
            evicted = evicted.len(),
            "activated and claimed clients"
        );
        Ok(())
    }

    /// Mark this version as decommissioned by a newer activation.
    pub fn mark_superseded(&self) {
        self.set_state(WorkerState::Superseded);
        info!(version = %self.config.version, "superseded");
    }
}
