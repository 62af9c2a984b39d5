// Persistent cache storage backend.
// One directory per generation, one JSON envelope file per entry, atomic writes.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};
use crate::http::{RequestKey, Response};

use super::store::CacheStorage;

/// Filesystem-backed storage: `<base>/<generation>/<entry>.json`.
///
/// The envelope persists status, headers, and body verbatim; the retrieval
/// timestamp travels inside the tagged header like any other header, so no
/// second freshness channel exists on disk.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    base: PathBuf,
}

/// On-disk shape of one stored entry.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl DiskStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Storage rooted at the platform cache directory
    /// (~/.cache/strata on Linux).
    pub fn default_dir() -> Option<Self> {
        ProjectDirs::from("", "", "strata").map(|dirs| Self::new(dirs.cache_dir()))
    }

    fn generation_dir(&self, generation: &str) -> PathBuf {
        self.base.join(sanitize_name(generation))
    }

    fn entry_path(&self, generation: &str, key: &RequestKey) -> PathBuf {
        self.generation_dir(generation)
            .join(format!("{}.json", entry_file_stem(key)))
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, generation: &str) -> Result<()> {
        fs::create_dir_all(self.generation_dir(generation))?;
        Ok(())
    }

    async fn get(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>> {
        let path = self.entry_path(generation, key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let entry: PersistedEntry = serde_json::from_str(&contents)?;
        Ok(Some(entry.into_response()?))
    }

    async fn put(&self, generation: &str, key: RequestKey, response: Response) -> Result<()> {
        let path = self.entry_path(generation, &key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entry = PersistedEntry::from_response(&response);
        let json = serde_json::to_string(&entry)?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    async fn delete_entry(&self, generation: &str, key: &RequestKey) -> Result<bool> {
        let path = self.entry_path(generation, key);
        if path.exists() {
            fs::remove_file(&path)?;
            return Ok(true);
        }
        Ok(false)
    }

    async fn list_generations(&self) -> Result<Vec<String>> {
        if !self.base.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete_generation(&self, generation: &str) -> Result<bool> {
        let dir = self.generation_dir(generation);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            return Ok(true);
        }
        Ok(false)
    }
}

impl PersistedEntry {
    fn from_response(response: &Response) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Self {
            status: response.status.as_u16(),
            headers,
            body: response.body.clone(),
        }
    }

    fn into_response(self) -> Result<Response> {
        let status = http::StatusCode::from_u16(self.status)
            .map_err(|e| StrataError::Storage(format!("bad persisted status: {e}")))?;
        let mut response = Response::new(status, self.body);
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                http::header::HeaderName::try_from(name.as_str()),
                http::HeaderValue::from_str(value),
            ) {
                response.headers.insert(name, value);
            }
        }
        Ok(response)
    }
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Entry filename: sanitized key prefix plus a collision-resistant hash
/// of the exact identity (sanitizing alone can alias distinct URLs).
fn entry_file_stem(key: &RequestKey) -> String {
    let full = key.as_storage_key();
    let mut hasher = DefaultHasher::new();
    full.hash(&mut hasher);

    let mut prefix = sanitize_name(&full);
    prefix.truncate(80);
    format!("{}-{:016x}", prefix, hasher.finish())
}
