//! Shared test utilities for artifact store testing.
//!
//! Provides a concrete [`AssociationData`] implementation plus helpers for
//! building pre-populated stores. Feature-gated behind `testutil` to keep
//! the JSON codec out of production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! relier-store = { path = "../store", features = ["testutil"] }
//! ```
//!
//! Then import helpers:
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use relier_store::testutil::{TestAssociation, make_handle, populated_store};
//! ```

use relier_cache::MemoryCache;
use serde::{Deserialize, Serialize};

use crate::{
    association::AssociationData, cache_store::CacheStore, config::StoreConfig,
    store::ArtifactStore,
};

/// A minimal association payload with a JSON wire form.
///
/// The `secret` field stands in for real key material so that payload
/// round-trips exercise more than the handle. [`TestAssociation::new`]
/// derives it from the handle, keeping fixtures deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAssociation {
    /// Association handle; must satisfy the store's handle rules to be
    /// storable, but invalid handles can be constructed for rejection tests.
    pub handle: String,
    /// Remaining lifetime in seconds.
    pub expires_in: i64,
    /// Stand-in key material.
    pub secret: Vec<u8>,
}

impl TestAssociation {
    /// Creates an association with a secret derived from the handle.
    #[must_use]
    pub fn new(handle: impl Into<String>, expires_in: i64) -> Self {
        let handle = handle.into();
        let secret = handle.bytes().rev().collect();
        Self { handle, expires_in, secret }
    }
}

impl AssociationData for TestAssociation {
    type DecodeError = serde_json::Error;

    fn handle(&self) -> &str {
        &self.handle
    }

    fn expires_in(&self) -> i64 {
        self.expires_in
    }

    fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("plain struct serializes to JSON")
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::DecodeError> {
        serde_json::from_slice(bytes)
    }
}

/// Create a deterministic valid handle from an index.
///
/// Produces handles like `"handle-0042"` (zero-padded to 4 digits).
#[must_use]
pub fn make_handle(idx: usize) -> String {
    format!("handle-{idx:04}")
}

/// Create a memory-cache-backed store pre-populated with associations for
/// `server_id`.
///
/// Associations are stored in slice order, so the last entry ends up the
/// newest. The store uses a default configuration.
///
/// # Panics
///
/// Panics if any store operation fails (should not happen over
/// [`MemoryCache`]).
pub async fn populated_store(
    server_id: &str,
    associations: &[(&str, i64)],
) -> CacheStore<MemoryCache, TestAssociation> {
    let store = CacheStore::new(MemoryCache::new(), StoreConfig::default());
    for &(handle, expires_in) in associations {
        store
            .store_association(server_id, &TestAssociation::new(handle, expires_in))
            .await
            .expect("populate store failed");
    }
    store
}
