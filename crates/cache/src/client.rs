//! Cache client trait definition.
//!
//! This module defines the [`CacheClient`] trait, the core abstraction over a
//! flat distributed cache in the memcached family. It deliberately captures
//! the weakest contract such services share:
//!
//! - **Keys map to opaque byte values**: no structure, no secondary lookups
//! - **Each operation is individually atomic**: no transactions, no batches
//! - **Values are transient**: eviction or restart can drop any entry at any time
//!
//! Layers that need richer semantics (lists, indexes, conditional chains)
//! must build them out of these five operations and tolerate the gaps between
//! them.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{error::CacheResult, key::CacheKey};

/// Abstract client for a flat, TTL-capable cache service.
///
/// Implementations are expected to be thread-safe (`Send + Sync`) and support
/// concurrent operations. Every operation validates its key against the
/// contract documented on [`CacheKey::validate`].
///
/// # Key Operations
///
/// | Method | Description |
/// |--------|-------------|
/// | [`get`](CacheClient::get) | Retrieve a value by key |
/// | [`set`](CacheClient::set) | Store a non-expiring value |
/// | [`set_with_ttl`](CacheClient::set_with_ttl) | Store with automatic expiration |
/// | [`set_if_absent`](CacheClient::set_if_absent) | Insert only when the key is absent |
/// | [`delete`](CacheClient::delete) | Remove a key |
///
/// # Example
///
/// ```
/// use relier_cache::{CacheClient, CacheKey, MemoryCache};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let cache = MemoryCache::new();
/// let key = CacheKey::new("greeting");
///
/// cache.set(&key, b"hello".to_vec()).await.unwrap();
/// let value = cache.get(&key).await.unwrap();
/// assert_eq!(value.as_deref(), Some(&b"hello"[..]));
/// # });
/// ```
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Retrieves a value by key.
    ///
    /// An entry whose TTL has elapsed is reported as absent, whether or not
    /// the implementation has physically reclaimed it yet.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the key holds a live value
    /// - `Ok(None)` if the key is absent or expired
    /// - `Err(...)` on cache errors
    #[must_use = "cache operations may fail and errors must be handled"]
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Bytes>>;

    /// Stores a value with no expiry.
    ///
    /// If the key already exists, its value is overwritten and any existing
    /// TTL is cleared.
    #[must_use = "cache operations may fail and errors must be handled"]
    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> CacheResult<()>;

    /// Stores a value that expires after `ttl`.
    ///
    /// Overwriting an existing entry replaces its deadline; repeated calls
    /// therefore refresh the expiry window.
    #[must_use = "cache operations may fail and errors must be handled"]
    async fn set_with_ttl(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// Atomically inserts a value only if the key is absent.
    ///
    /// # Semantics
    ///
    /// - Succeeds exactly when the key holds no live value (absent, deleted,
    ///   or expired). The stored value has no expiry.
    /// - Fails with [`Conflict`](crate::CacheError::Conflict) when a live
    ///   value is present, leaving it untouched.
    ///
    /// The check and the insert are one atomic step: of N concurrent callers
    /// on an absent key, exactly one succeeds and the rest observe
    /// `Conflict`. This is the primitive for electing a single writer of a
    /// well-known key; losers should re-read to pick up the winner's value.
    #[must_use = "a lost insert race surfaces as a conflict and must be handled"]
    async fn set_if_absent(&self, key: &CacheKey, value: Vec<u8>) -> CacheResult<()>;

    /// Deletes a key.
    ///
    /// If the key doesn't exist, this is a no-op (returns `Ok(())`).
    #[must_use = "cache operations may fail and errors must be handled"]
    async fn delete(&self, key: &CacheKey) -> CacheResult<()>;
}

#[async_trait]
impl<C: CacheClient + ?Sized> CacheClient for std::sync::Arc<C> {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> CacheResult<()> {
        (**self).set(key, value).await
    }

    async fn set_with_ttl(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        (**self).set_with_ttl(key, value, ttl).await
    }

    async fn set_if_absent(&self, key: &CacheKey, value: Vec<u8>) -> CacheResult<()> {
        (**self).set_if_absent(key, value).await
    }

    async fn delete(&self, key: &CacheKey) -> CacheResult<()> {
        (**self).delete(key).await
    }
}
