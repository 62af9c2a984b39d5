// Cache storage collaborator interface and in-memory backend.
// A key-value store of named generations, each mapping request identity to a response.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::http::{RequestKey, Response};

/// External storage collaborator: named generations of request → response
/// entries. The core only uses these primitives and does not own their
/// persistence implementation.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Idempotent open-or-create of a generation.
    async fn open(&self, generation: &str) -> Result<()>;

    /// Look up an entry in one generation.
    async fn get(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>>;

    /// Associate identity with entry, overwriting any prior entry.
    async fn put(&self, generation: &str, key: RequestKey, response: Response) -> Result<()>;

    /// Remove a single entry. Returns whether it existed.
    async fn delete_entry(&self, generation: &str, key: &RequestKey) -> Result<bool>;

    /// Names of all existing generations.
    async fn list_generations(&self) -> Result<Vec<String>>;

    /// Delete a whole generation. Returns whether it existed.
    async fn delete_generation(&self, generation: &str) -> Result<bool>;
}

/// In-memory storage for tests and embedders that do not need persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    generations: Mutex<HashMap<String, HashMap<RequestKey, Response>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, HashMap<RequestKey, Response>>> {
        // A poisoned lock still holds a structurally sound map.
        self.generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, generation: &str) -> Result<()> {
        self.lock().entry(generation.to_string()).or_default();
        Ok(())
    }

    async fn get(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>> {
        Ok(self
            .lock()
            .get(generation)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(&self, generation: &str, key: RequestKey, response: Response) -> Result<()> {
        self.lock()
            .entry(generation.to_string())
            .or_default()
            .insert(key, response);
        Ok(())
    }

    async fn delete_entry(&self, generation: &str, key: &RequestKey) -> Result<bool> {
        Ok(self
            .lock()
            .get_mut(generation)
            .is_some_and(|entries| entries.remove(key).is_some()))
    }

    async fn list_generations(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete_generation(&self, generation: &str) -> Result<bool> {
        Ok(self.lock().remove(generation).is_some())
    }
}
