//! Test helpers for exercising cache-dependent code.
//!
//! Enable with the `testutil` feature (in `[dev-dependencies]`) to get
//! [`FaultyCache`], a delegating [`CacheClient`] wrapper that injects
//! failures at chosen points. Layers built over a cache must surface write
//! failures rather than swallow them; this wrapper makes those paths
//! testable without a real flaky server.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::{
    client::CacheClient,
    error::{CacheError, CacheResult},
    key::CacheKey,
};

#[derive(Debug, Default)]
struct FaultState {
    /// Writes remaining before the next injected failure; disarmed once fired.
    fail_write_after: Option<u32>,
    fail_reads: bool,
}

/// Wraps a [`CacheClient`] and fails selected operations with
/// [`CacheError::Connection`].
///
/// "Writes" are `set`, `set_with_ttl`, `set_if_absent`, and `delete`; `get`
/// is a read. An armed write failure fires once and disarms, so a test can
/// let the failure happen and then inspect or keep driving the same cache.
///
/// # Example
///
/// ```
/// use relier_cache::{CacheClient, CacheKey, MemoryCache};
/// use relier_cache::testutil::FaultyCache;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let cache = FaultyCache::new(MemoryCache::new());
/// let key = CacheKey::new("k");
///
/// cache.fail_write_after(1);
/// cache.set(&key, b"first".to_vec()).await.unwrap();
/// assert!(cache.set(&key, b"second".to_vec()).await.is_err());
/// // Disarmed again: the next write goes through.
/// cache.set(&key, b"third".to_vec()).await.unwrap();
/// # });
/// ```
#[derive(Clone)]
pub struct FaultyCache<C> {
    inner: C,
    state: Arc<Mutex<FaultState>>,
}

impl<C> FaultyCache<C> {
    /// Wraps `inner` with no faults armed.
    pub fn new(inner: C) -> Self {
        Self { inner, state: Arc::new(Mutex::new(FaultState::default())) }
    }

    /// Arms a single write failure, firing on the `n`-th write from now
    /// (`0` fails the very next write).
    pub fn fail_write_after(&self, n: u32) {
        self.state.lock().fail_write_after = Some(n);
    }

    /// Disarms any pending write failure.
    pub fn clear_write_failure(&self) {
        self.state.lock().fail_write_after = None;
    }

    /// Makes every `get` fail until switched off again.
    pub fn fail_reads(&self, enabled: bool) {
        self.state.lock().fail_reads = enabled;
    }

    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn check_write(&self, op: &str) -> CacheResult<()> {
        let mut state = self.state.lock();
        match state.fail_write_after.take() {
            Some(0) => Err(CacheError::connection(format!("simulated {op} failure"))),
            Some(n) => {
                state.fail_write_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn check_read(&self, op: &str) -> CacheResult<()> {
        if self.state.lock().fail_reads {
            Err(CacheError::connection(format!("simulated {op} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<C: CacheClient> CacheClient for FaultyCache<C> {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Bytes>> {
        self.check_read("get")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> CacheResult<()> {
        self.check_write("set")?;
        self.inner.set(key, value).await
    }

    async fn set_with_ttl(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.check_write("set_with_ttl")?;
        self.inner.set_with_ttl(key, value, ttl).await
    }

    async fn set_if_absent(&self, key: &CacheKey, value: Vec<u8>) -> CacheResult<()> {
        self.check_write("set_if_absent")?;
        self.inner.set_if_absent(key, value).await
    }

    async fn delete(&self, key: &CacheKey) -> CacheResult<()> {
        self.check_write("delete")?;
        self.inner.delete(key).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::memory::MemoryCache;

    fn key(text: &str) -> CacheKey {
        CacheKey::new(text)
    }

    #[tokio::test]
    async fn test_unarmed_wrapper_delegates() {
        let cache = FaultyCache::new(MemoryCache::new());

        cache.set(&key("k"), b"v".to_vec()).await.unwrap();
        assert_eq!(cache.get(&key("k")).await.unwrap(), Some(Bytes::from("v")));
        cache.delete(&key("k")).await.unwrap();
        assert_eq!(cache.get(&key("k")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_failure_counts_down_and_disarms() {
        let cache = FaultyCache::new(MemoryCache::new());

        cache.fail_write_after(1);

        // Write 0 passes, write 1 fails, write 2 passes again.
        cache.set(&key("a"), b"1".to_vec()).await.unwrap();
        assert!(cache.set(&key("b"), b"2".to_vec()).await.is_err());
        cache.set(&key("c"), b"3".to_vec()).await.unwrap();

        // The failed write never reached the inner cache.
        assert_eq!(cache.inner().get(&key("b")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_counts_as_write() {
        let cache = FaultyCache::new(MemoryCache::new());
        cache.set(&key("k"), b"v".to_vec()).await.unwrap();

        cache.fail_write_after(0);
        assert!(cache.delete(&key("k")).await.is_err());

        // Value survives the failed delete.
        assert_eq!(cache.get(&key("k")).await.unwrap(), Some(Bytes::from("v")));
    }

    #[tokio::test]
    async fn test_read_failures_toggle() {
        let cache = FaultyCache::new(MemoryCache::new());
        cache.set(&key("k"), b"v".to_vec()).await.unwrap();

        cache.fail_reads(true);
        assert!(cache.get(&key("k")).await.is_err());

        cache.fail_reads(false);
        assert_eq!(cache.get(&key("k")).await.unwrap(), Some(Bytes::from("v")));
    }

    #[tokio::test]
    async fn test_clones_share_fault_state() {
        let cache = FaultyCache::new(MemoryCache::new());
        let other = cache.clone();

        other.fail_write_after(0);
        assert!(cache.set(&key("k"), b"v".to_vec()).await.is_err());
    }
}
