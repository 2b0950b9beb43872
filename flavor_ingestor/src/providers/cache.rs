//! Replay cache for entity sources.
//!
//! A full FlavorDB pass walks a thousand ids; re-running the sync should not
//! hit the network again for ids already seen. [`CachedSource`] wraps any
//! [`EntitySource`] and keeps each answer (including "not found") as a JSON
//! file named after its cache key. Transport errors are never cached, so a
//! failed id is retried on the next run.
//!
//! An unreadable or corrupt entry is logged and treated as a miss.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::Error;
use crate::providers::{EntityPayload, EntitySource, ProviderError};

/// Cache key under which an entity answer is stored.
pub fn cache_key(entity_id: u32) -> String {
    format!("flavordb_{entity_id}")
}

/// Directory of `<key>.json` files.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Creates a cache rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the cache.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Looks up a stored answer. `Ok(None)` is a plain miss.
    pub async fn get(&self, key: &str) -> Result<Option<EntityPayload>, Error> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| Error::CorruptCacheEntry {
                    key: key.to_string(),
                    source,
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Io { path, source }),
        }
    }

    /// Stores an answer, replacing any previous entry for the key.
    ///
    /// Writes go through a temporary file and a rename so a crash never
    /// leaves a half-written entry behind.
    pub async fn put(&self, key: &str, payload: &EntityPayload) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| Error::Io {
                path: self.dir.clone(),
                source,
            })?;

        let bytes = serde_json::to_vec(payload).map_err(|source| Error::CorruptCacheEntry {
            key: key.to_string(),
            source,
        })?;

        let path = self.entry_path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| Error::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| Error::Io { path, source })
    }
}

/// An [`EntitySource`] that answers from a [`ResponseCache`] first.
pub struct CachedSource<S> {
    inner: S,
    cache: ResponseCache,
}

impl<S> CachedSource<S> {
    /// Wraps `inner`, storing its answers in `cache`.
    pub fn new(inner: S, cache: ResponseCache) -> Self {
        Self { inner, cache }
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: EntitySource> EntitySource for CachedSource<S> {
    async fn fetch_entity(&self, entity_id: u32) -> Result<EntityPayload, ProviderError> {
        let key = cache_key(entity_id);

        match self.cache.get(&key).await {
            Ok(Some(payload)) => {
                debug!(entity_id, "replaying cached entity");
                return Ok(payload);
            }
            Ok(None) => {}
            Err(err) => warn!(entity_id, %err, "ignoring unreadable cache entry"),
        }

        let payload = self.inner.fetch_entity(entity_id).await?;
        if let Err(err) = self.cache.put(&key, &payload).await {
            warn!(entity_id, %err, "could not store entity in cache");
        }
        Ok(payload)
    }
}
