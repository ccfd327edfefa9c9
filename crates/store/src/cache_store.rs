//! Cache-backed artifact store.
//!
//! [`CacheStore`] persists every artifact in a flat cache through the five
//! operations of [`CacheClient`], with no server-side lists, transactions,
//! or secondary lookups. Nonces and the signing secret map onto single keys
//! directly; the interesting part is the association index.
//!
//! # The association index
//!
//! "All associations for a server" is a singly-linked list threaded through
//! independent cache entries. Each record stores the handle of the next
//! record beside its payload, and a per-server root pointer names the head
//! (the most recently inserted handle):
//!
//! ```text
//!   root(S) ──► rec(S,h3) ──► rec(S,h2) ──► rec(S,h1) ──► (empty)
//! ```
//!
//! Scans walk the chain from the root; point lookups hit a record's key
//! directly, linked or not.
//!
//! # Partial failure
//!
//! The cache offers no multi-key atomicity, so a crash or eviction between
//! the writes of one operation must leave nothing worse than an *orphan*: a
//! record that scans no longer reach but point lookups still find. Inserts
//! therefore advance the root before writing the record (a dangling head
//! reads as an empty list), updates never move a record, and removal
//! repairs the chain before deleting. Unparsable entries are pruned on
//! sight and reported as absent. Every failed cache write surfaces as an
//! error; none is downgraded to a no-op.

use std::{collections::HashSet, marker::PhantomData, time::Duration};

use async_trait::async_trait;
use relier_cache::{CacheClient, CacheError};
use zeroize::Zeroizing;

use crate::{
    association::{AssociationData, handle_is_valid},
    config::StoreConfig,
    error::{StoreError, StoreResult},
    keys::KeyEncoder,
    record::AssociationRecord,
    secret::{self, SecretSource},
    store::ArtifactStore,
};

/// Read-then-publish rounds before secret provisioning gives up.
const SECRET_ATTEMPTS: u32 = 3;

/// [`ArtifactStore`] over any [`CacheClient`].
///
/// The store itself is stateless apart from its configuration: all shared
/// state lives in the cache, so any number of `CacheStore` instances across
/// any number of processes may serve the same cache concurrently, provided
/// they agree on the key prefix and secret phrase.
///
/// # Example
///
/// ```
/// use relier_cache::MemoryCache;
/// use relier_store::{CacheStore, StoreConfig};
/// # use relier_store::{AssociationData, ArtifactStore};
/// # #[derive(Debug)] struct NoAssoc;
/// # impl AssociationData for NoAssoc {
/// #     type DecodeError = std::convert::Infallible;
/// #     fn handle(&self) -> &str { "h" }
/// #     fn expires_in(&self) -> i64 { 0 }
/// #     fn to_bytes(&self) -> Vec<u8> { Vec::new() }
/// #     fn from_bytes(_: &[u8]) -> Result<Self, Self::DecodeError> { Ok(NoAssoc) }
/// # }
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let config = StoreConfig::builder().key_prefix("openid_").build().unwrap();
/// let store: CacheStore<_, NoAssoc> = CacheStore::new(MemoryCache::new(), config);
///
/// store.store_nonce("once").await.unwrap();
/// assert!(store.use_nonce("once").await.unwrap());
/// assert!(!store.use_nonce("once").await.unwrap());
/// # });
/// ```
pub struct CacheStore<C, A> {
    cache: C,
    keys: KeyEncoder,
    nonce_ttl: Duration,
    secret: SecretSource,
    _association: PhantomData<fn() -> A>,
}

impl<C, A> CacheStore<C, A>
where
    C: CacheClient,
    A: AssociationData,
{
    /// Creates a store over `cache` with the given configuration.
    pub fn new(cache: C, config: StoreConfig) -> Self {
        Self {
            keys: KeyEncoder::new(config.key_prefix()),
            nonce_ttl: config.nonce_ttl(),
            secret: SecretSource::from_phrase(config.secret_phrase()),
            cache,
            _association: PhantomData,
        }
    }

    /// The underlying cache client.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Reads and parses the record for `(server_id, handle)`.
    ///
    /// An unparsable record is pruned and reported as absent. The prune
    /// permanently orphans whatever the bad record linked to; orphans stay
    /// reachable by point lookup.
    async fn read_record(
        &self,
        server_id: &str,
        handle: &str,
    ) -> StoreResult<Option<AssociationRecord<A>>> {
        let key = self.keys.association(server_id, handle);
        let Some(bytes) = self.cache.get(&key).await? else {
            return Ok(None);
        };

        match AssociationRecord::parse(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(error) => {
                tracing::warn!(%key, %error, "pruning unparsable association record");
                self.cache.delete(&key).await?;
                Ok(None)
            }
        }
    }

    async fn write_record(
        &self,
        server_id: &str,
        record: &AssociationRecord<A>,
    ) -> StoreResult<()> {
        let key = self.keys.association(server_id, record.data.handle());
        self.cache.set(&key, record.encode()).await?;
        Ok(())
    }

    /// Current head handle for `server_id`; empty when the list is empty.
    async fn read_root(&self, server_id: &str) -> StoreResult<String> {
        let key = self.keys.root(server_id);
        match self.cache.get(&key).await? {
            None => Ok(String::new()),
            Some(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(handle) => Ok(handle),
                Err(_) => {
                    // A head we can't read as a handle is as good as no head.
                    tracing::warn!(%key, "pruning unparsable root pointer");
                    self.cache.delete(&key).await?;
                    Ok(String::new())
                }
            },
        }
    }

    async fn write_root(&self, server_id: &str, handle: &str) -> StoreResult<()> {
        let key = self.keys.root(server_id);
        self.cache.set(&key, handle.as_bytes().to_vec()).await?;
        Ok(())
    }

    /// Walks the list and keeps the record with the most remaining
    /// lifetime. Strictly-greater comparison, so ties keep the earlier
    /// find, which sits closer to the head.
    async fn scan_best(&self, server_id: &str) -> StoreResult<Option<A>> {
        let mut cursor = self.read_root(server_id).await?;
        let mut visited = HashSet::new();
        let mut best: Option<A> = None;
        let mut best_expires = i64::MIN;

        while !cursor.is_empty() {
            if !visited.insert(cursor.clone()) {
                tracing::warn!(
                    server = server_id,
                    handle = %cursor,
                    "association list cycle; treating as end of list"
                );
                break;
            }

            // A gap truncates the reachable list; records past it are
            // orphans and stay out of scan results.
            let Some(record) = self.read_record(server_id, &cursor).await? else {
                break;
            };

            let AssociationRecord { next, data } = record;
            let expires = data.expires_in();
            if best.is_none() || expires > best_expires {
                best_expires = expires;
                best = Some(data);
            }
            cursor = next;
        }

        tracing::debug!(
            server = server_id,
            walked = visited.len(),
            found = best.is_some(),
            "scanned association list"
        );
        Ok(best)
    }
}

#[async_trait]
impl<C, A> ArtifactStore for CacheStore<C, A>
where
    C: CacheClient,
    A: AssociationData,
{
    type Association = A;

    #[tracing::instrument(skip(self, association), fields(handle = %association.handle()))]
    async fn store_association(&self, server_id: &str, association: &A) -> StoreResult<()> {
        let handle = association.handle();
        if !handle_is_valid(handle) {
            return Err(StoreError::invalid_handle(handle));
        }

        let next = match self.read_record(server_id, handle).await? {
            // Known handle: overwrite the payload, keep the list position.
            // The link is preserved as-is, even a self-link left behind by
            // an interrupted insert; the scan's cycle guard absorbs those.
            Some(existing) => existing.next,
            // New handle: it becomes the head. Advance the root before
            // writing the record; if we die in between, the dangling head
            // reads as an empty list instead of surfacing a stale record.
            None => {
                let head = self.read_root(server_id).await?;
                self.write_root(server_id, handle).await?;
                head
            }
        };

        let key = self.keys.association(server_id, handle);
        self.cache.set(&key, AssociationRecord::encode_parts(&next, association)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_association(
        &self,
        server_id: &str,
        handle: Option<&str>,
    ) -> StoreResult<Option<A>> {
        match handle {
            Some(handle) => {
                Ok(self.read_record(server_id, handle).await?.map(|record| record.data))
            }
            None => self.scan_best(server_id).await,
        }
    }

    #[tracing::instrument(skip(self))]
    async fn remove_association(&self, server_id: &str, handle: &str) -> StoreResult<bool> {
        let Some(target) = self.read_record(server_id, handle).await? else {
            return Ok(false);
        };

        // Unlink before deleting. The walk finds whoever points at the
        // target: the root itself (head case) or a predecessor record.
        let mut cursor = self.read_root(server_id).await?;
        let mut visited = HashSet::new();
        let mut predecessor: Option<AssociationRecord<A>> = None;

        while !cursor.is_empty() && cursor != handle {
            if !visited.insert(cursor.clone()) {
                tracing::warn!(
                    server = server_id,
                    handle = %cursor,
                    "association list cycle; treating as end of list"
                );
                break;
            }

            match self.read_record(server_id, &cursor).await? {
                Some(record) => {
                    cursor = record.next.clone();
                    predecessor = Some(record);
                }
                // Gap before the target: it is not reachable from the
                // root, so there is no link to repair.
                None => break,
            }
        }

        if cursor == handle {
            match predecessor {
                // Target is the head: advance the root past it.
                None => self.write_root(server_id, &target.next).await?,
                // Interior or tail: splice the predecessor over it.
                Some(mut previous) => {
                    previous.next = target.next;
                    self.write_record(server_id, &previous).await?;
                }
            }
        }

        self.cache.delete(&self.keys.association(server_id, handle)).await?;
        Ok(true)
    }

    #[tracing::instrument(skip(self, nonce))]
    async fn store_nonce(&self, nonce: &str) -> StoreResult<()> {
        let key = self.keys.nonce(nonce);
        self.cache.set_with_ttl(&key, Vec::new(), self.nonce_ttl).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, nonce))]
    async fn use_nonce(&self, nonce: &str) -> StoreResult<bool> {
        let key = self.keys.nonce(nonce);
        if self.cache.get(&key).await?.is_none() {
            return Ok(false);
        }

        // Between the get and the delete another consumer can slip in; both
        // then report success. Accepted, see the trait docs.
        self.cache.delete(&key).await?;
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    async fn signing_secret(&self) -> StoreResult<Zeroizing<Vec<u8>>> {
        if let Some(fixed) = self.secret.fixed() {
            return Ok(fixed);
        }

        let key = self.keys.signing_secret();
        for _ in 0..SECRET_ATTEMPTS {
            if let Some(bytes) = self.cache.get(&key).await? {
                return Ok(Zeroizing::new(bytes.to_vec()));
            }

            let fresh = secret::generate_secret();
            match self.cache.set_if_absent(&key, fresh.to_vec()).await {
                Ok(()) => return Ok(fresh),
                // Lost the publish race; loop back and read the winner.
                Err(CacheError::Conflict { .. }) => continue,
                Err(error) => return Err(error.into()),
            }
        }

        // Every round both missed the read and lost the race: the cache is
        // dropping the secret between operations.
        Err(StoreError::secret_provisioning(SECRET_ATTEMPTS))
    }
}
