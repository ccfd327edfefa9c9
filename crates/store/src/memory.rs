//! In-process artifact store.
//!
//! [`MemoryStore`] implements [`ArtifactStore`] against process memory
//! instead of a shared cache: associations live in a per-server list under
//! a lock, nonces in a TTL cache, and the signing secret in a once-cell.
//! Nothing is shared across processes, which makes it suitable for tests
//! and single-process deployments, and a behavioral reference for
//! [`CacheStore`](crate::CacheStore).
//!
//! Semantics match the cache-backed store where the contract is observable:
//! lookups by handle return exactly what was stored, best-lookup prefers
//! the greatest remaining lifetime with ties going to the newest entry, and
//! a nonce is consumable once. The in-process consume is atomic, so the
//! double-consumption race the contract tolerates cannot happen here.

use std::{collections::HashMap, fmt, sync::OnceLock};

use async_trait::async_trait;
use moka::future::Cache;
use parking_lot::RwLock;
use zeroize::Zeroizing;

use crate::{
    association::{AssociationData, handle_is_valid},
    config::StoreConfig,
    error::{StoreError, StoreResult},
    secret::{self, SecretSource},
    store::ArtifactStore,
};

/// [`ArtifactStore`] backed by process memory.
///
/// Lookups hand out owned copies, so the association type must be
/// [`Clone`]. The key prefix of a [`StoreConfig`] has no meaning here and
/// is ignored; the nonce TTL and secret phrase are honored.
pub struct MemoryStore<A> {
    /// Per-server associations, newest first.
    associations: RwLock<HashMap<String, Vec<A>>>,
    nonces: Cache<String, ()>,
    secret: OnceLock<Zeroizing<Vec<u8>>>,
}

impl<A> MemoryStore<A> {
    /// Creates an empty store with the default nonce TTL and a signing
    /// secret generated on first use.
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    /// Creates an empty store honoring `nonce_ttl` and `secret_phrase`.
    pub fn with_config(config: &StoreConfig) -> Self {
        let secret = OnceLock::new();
        if let Some(fixed) = SecretSource::from_phrase(config.secret_phrase()).fixed() {
            let _ = secret.set(fixed);
        }

        Self {
            associations: RwLock::new(HashMap::new()),
            nonces: Cache::builder().time_to_live(config.nonce_ttl()).build(),
            secret,
        }
    }
}

impl<A> Default for MemoryStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for MemoryStore<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("servers", &self.associations.read().len())
            .field("nonces", &self.nonces.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<A> ArtifactStore for MemoryStore<A>
where
    A: AssociationData + Clone,
{
    type Association = A;

    #[tracing::instrument(skip(self, association), fields(handle = %association.handle()))]
    async fn store_association(&self, server_id: &str, association: &A) -> StoreResult<()> {
        let handle = association.handle();
        if !handle_is_valid(handle) {
            return Err(StoreError::invalid_handle(handle));
        }

        let mut map = self.associations.write();
        let list = map.entry(server_id.to_owned()).or_default();
        match list.iter_mut().find(|known| known.handle() == handle) {
            // Overwrite in place; updates never change list position.
            Some(slot) => *slot = association.clone(),
            None => list.insert(0, association.clone()),
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_association(
        &self,
        server_id: &str,
        handle: Option<&str>,
    ) -> StoreResult<Option<A>> {
        let map = self.associations.read();
        let Some(list) = map.get(server_id) else {
            return Ok(None);
        };

        let found = match handle {
            Some(handle) => list.iter().find(|known| known.handle() == handle),
            // Strictly greater, so ties keep the earlier find, which is
            // the newest entry. Same ordering as the cache-backed scan.
            None => {
                let mut best: Option<&A> = None;
                for candidate in list {
                    let better = match best {
                        None => true,
                        Some(current) => candidate.expires_in() > current.expires_in(),
                    };
                    if better {
                        best = Some(candidate);
                    }
                }
                best
            }
        };
        Ok(found.cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn remove_association(&self, server_id: &str, handle: &str) -> StoreResult<bool> {
        let mut map = self.associations.write();
        let Some(list) = map.get_mut(server_id) else {
            return Ok(false);
        };

        let Some(index) = list.iter().position(|known| known.handle() == handle) else {
            return Ok(false);
        };
        list.remove(index);
        if list.is_empty() {
            map.remove(server_id);
        }
        Ok(true)
    }

    #[tracing::instrument(skip(self, nonce))]
    async fn store_nonce(&self, nonce: &str) -> StoreResult<()> {
        self.nonces.insert(nonce.to_owned(), ()).await;
        Ok(())
    }

    #[tracing::instrument(skip(self, nonce))]
    async fn use_nonce(&self, nonce: &str) -> StoreResult<bool> {
        // Atomic take; a second consumer gets None.
        Ok(self.nonces.remove(nonce).await.is_some())
    }

    #[tracing::instrument(skip(self))]
    async fn signing_secret(&self) -> StoreResult<Zeroizing<Vec<u8>>> {
        Ok(self.secret.get_or_init(secret::generate_secret).clone())
    }
}
