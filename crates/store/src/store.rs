//! Storage trait for ephemeral security artifacts.
//!
//! This module provides the [`ArtifactStore`] trait that abstracts
//! persistence of the three artifact kinds an authentication flow needs:
//! key-agreement associations, single-use nonces, and one shared signing
//! secret. Implementations can use different backends (a distributed cache
//! for production, in-memory for testing).
//!
//! # Usage
//!
//! ```
//! use relier_store::{ArtifactStore, StoreResult};
//!
//! async fn best_association<S: ArtifactStore>(
//!     store: &S,
//!     server_id: &str,
//! ) -> StoreResult<Option<S::Association>> {
//!     store.get_association(server_id, None).await
//! }
//! ```

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::{association::AssociationData, error::StoreResult};

/// Persistence layer for ephemeral security artifacts.
///
/// Everything an `ArtifactStore` holds is transient by design: an
/// implementation may lose any artifact at any time (evictions, restarts),
/// and callers must treat "absent" as a normal answer. In the worst case a
/// lost artifact fails an in-progress authentication that would otherwise
/// have succeeded; it can never make a forged one pass.
///
/// # Concurrency
///
/// Each operation is individually atomic; no atomicity is promised across
/// operations. Implementations must tolerate concurrent calls without
/// panicking or corrupting state, but narrow documented races are allowed
/// (see [`use_nonce`](ArtifactStore::use_nonce)).
///
/// # Implementations
///
/// | Implementation | Backing | Use case |
/// |----------------|---------|----------|
/// | [`CacheStore`](crate::CacheStore) | any [`CacheClient`](relier_cache::CacheClient) | production |
/// | [`MemoryStore`](crate::MemoryStore) | process memory | testing, embedding |
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// The association type this store persists.
    type Association: AssociationData;

    /// Adds or refreshes an association for a server.
    ///
    /// A handle not yet known for `server_id` is inserted as the newest
    /// association; storing an existing handle again overwrites its payload
    /// in place. At most one association exists per `(server_id, handle)`.
    ///
    /// # Errors
    ///
    /// - [`InvalidHandle`](crate::StoreError::InvalidHandle) if the
    ///   association's handle is empty or not printable ASCII
    /// - [`Cache`](crate::StoreError::Cache) if a backing write fails; the
    ///   association must then be assumed not stored
    async fn store_association(
        &self,
        server_id: &str,
        association: &Self::Association,
    ) -> StoreResult<()>;

    /// Retrieves an association for a server.
    ///
    /// With `Some(handle)`, looks up exactly that association. With `None`,
    /// returns the known association with the most remaining lifetime
    /// (ties prefer the most recently stored).
    ///
    /// # Returns
    ///
    /// - `Ok(Some(association))` if found
    /// - `Ok(None)` if the server has no (matching) association
    /// - `Err(...)` on backing failures
    async fn get_association(
        &self,
        server_id: &str,
        handle: Option<&str>,
    ) -> StoreResult<Option<Self::Association>>;

    /// Removes one association.
    ///
    /// Other associations stored for the same server remain retrievable.
    ///
    /// # Returns
    ///
    /// Whether the association was present.
    async fn remove_association(&self, server_id: &str, handle: &str) -> StoreResult<bool>;

    /// Registers a nonce so a later [`use_nonce`](ArtifactStore::use_nonce)
    /// can accept it once.
    ///
    /// Registration is idempotent; re-registering restarts the nonce's
    /// validity window. Any string is a valid nonce.
    async fn store_nonce(&self, nonce: &str) -> StoreResult<()>;

    /// Consumes a nonce.
    ///
    /// Returns `true` exactly when the nonce is currently registered and
    /// unexpired, and unregisters it in the same call. Unknown, expired,
    /// and already-consumed nonces return `false`.
    ///
    /// Concurrent consumers of the same nonce may in rare interleavings
    /// both observe `true`; implementations keep that window as small as
    /// their backing store allows but do not mask it with locking.
    async fn use_nonce(&self, nonce: &str) -> StoreResult<bool>;

    /// Returns the shared secret used for signing authentication tokens.
    ///
    /// Every caller of the same logical store observes the same bytes,
    /// creating the secret on first use if needed. The bytes are wrapped in
    /// [`Zeroizing`] so they are wiped from memory on drop.
    async fn signing_secret(&self) -> StoreResult<Zeroizing<Vec<u8>>>;
}
