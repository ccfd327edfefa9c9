//! In-memory cache implementation.
//!
//! This module provides [`MemoryCache`], an in-memory implementation of
//! [`CacheClient`] suitable for testing and embedded use.
//!
//! # Features
//!
//! - **Thread-safe**: Uses [`parking_lot::RwLock`] for concurrent access
//! - **TTL support**: Expired entries are dropped lazily on access
//! - **Cheap clones**: All clones share the same underlying map
//!
//! # Example
//!
//! ```
//! use relier_cache::{CacheClient, CacheKey, MemoryCache};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = MemoryCache::new();
//!     let key = CacheKey::new("greeting");
//!
//!     cache.set(&key, b"hello".to_vec()).await.unwrap();
//!     let value = cache.get(&key).await.unwrap();
//!
//!     assert_eq!(value.unwrap().as_ref(), b"hello");
//! }
//! ```
//!
//! # Limitations
//!
//! - Data is not persisted; all entries are lost when the process exits
//! - Shard hints are accepted and ignored (there is only one shard)
//! - There is no background sweeper; long-lived processes should call
//!   [`purge_expired`](MemoryCache::purge_expired) periodically

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::{
    client::CacheClient,
    error::{CacheError, CacheResult},
    key::CacheKey,
};

#[derive(Debug, Clone)]
struct Entry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-memory [`CacheClient`] backed by a hash map.
///
/// # Cloning
///
/// `MemoryCache` is cheaply cloneable via [`Arc`]. All clones share the same
/// underlying entries, which lets a test hand one handle to the code under
/// test and keep another for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryCache {
    /// Creates an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every entry whose TTL has elapsed, returning how many were
    /// dropped.
    ///
    /// Reads already treat expired entries as absent; this only reclaims the
    /// memory they occupy.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before - entries.len();
        if purged > 0 {
            tracing::trace!(purged, "purged expired cache entries");
        }
        purged
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|entry| !entry.is_expired(now)).count()
    }

    /// Whether the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(
        &self,
        key: &CacheKey,
        value: Vec<u8>,
        expires_at: Option<Instant>,
    ) -> CacheResult<()> {
        key.validate()?;
        self.entries
            .write()
            .insert(key.text().to_owned(), Entry { value: Bytes::from(value), expires_at });
        Ok(())
    }

    /// Drops the entry if it is still expired; a concurrent overwrite with a
    /// fresh value is left alone.
    fn drop_if_expired(&self, key: &CacheKey, now: Instant) {
        let mut entries = self.entries.write();
        if entries.get(key.text()).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key.text());
        }
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Bytes>> {
        key.validate()?;
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key.text()) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        self.drop_if_expired(key, now);
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> CacheResult<()> {
        self.insert(key, value, None)
    }

    async fn set_with_ttl(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.insert(key, value, Some(Instant::now() + ttl))
    }

    async fn set_if_absent(&self, key: &CacheKey, value: Vec<u8>) -> CacheResult<()> {
        key.validate()?;
        let now = Instant::now();
        let mut entries = self.entries.write();
        match entries.get(key.text()) {
            Some(entry) if !entry.is_expired(now) => Err(CacheError::conflict(key.text())),
            _ => {
                entries.insert(
                    key.text().to_owned(),
                    Entry { value: Bytes::from(value), expires_at: None },
                );
                Ok(())
            }
        }
    }

    async fn delete(&self, key: &CacheKey) -> CacheResult<()> {
        key.validate()?;
        self.entries.write().remove(key.text());
        Ok(())
    }
}
