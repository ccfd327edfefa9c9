//! Conformance test suite for [`ArtifactStore`] implementations.
//!
//! This module provides async test functions that validate whether an
//! [`ArtifactStore`] implementation satisfies the trait contract. Every
//! store, cache-backed or in-process, can run the same suite to ensure
//! interchangeability.
//!
//! The suite asserts only what the trait promises. Behavior the contract
//! leaves open, like tie-breaking between equally long-lived associations
//! or nonce expiry timing, belongs in each implementation's own tests.
//!
//! # Usage
//!
//! Enable the `testutil` feature and call each conformance function with a
//! fresh store instance:
//!
//! ```no_run
//! use relier_store::{MemoryStore, conformance};
//!
//! #[tokio::test]
//! async fn assoc_store_then_lookup_roundtrip() {
//!     conformance::assoc_store_then_lookup_roundtrip(&MemoryStore::new()).await;
//! }
//! ```
//!
//! # Test Categories
//!
//! | Category | Functions | Contract aspect |
//! |----------|-----------|-----------------|
//! | Association | 8 tests | Store/lookup/remove and best-lookup ordering |
//! | Nonce | 3 tests | Single-use consumption |
//! | Secret | 2 tests | Stability and concurrent agreement |

use std::sync::Arc;

use crate::{error::StoreError, store::ArtifactStore, testutil::TestAssociation};

// ============================================================================
// Association — store/lookup/remove and best-lookup ordering (8 tests)
// ============================================================================

/// Lookup of an unknown handle returns `Ok(None)`, and so does best-lookup
/// on a server with no associations.
pub async fn assoc_lookup_missing_returns_none<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let server = "https://missing.example/endpoint";
    let by_handle = store.get_association(server, Some("nope")).await;
    assert!(by_handle.is_ok(), "lookup of unknown handle should not error: {by_handle:?}");
    assert_eq!(by_handle.expect("checked above"), None);

    let best = store.get_association(server, None).await.expect("best lookup");
    assert_eq!(best, None, "empty server should have no best association");
}

/// Store then lookup round-trips the payload.
pub async fn assoc_store_then_lookup_roundtrip<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let server = "https://roundtrip.example/endpoint";
    let assoc = TestAssociation::new("rt-1", 600);

    store.store_association(server, &assoc).await.expect("store");
    let found = store.get_association(server, Some("rt-1")).await.expect("lookup");
    assert_eq!(found, Some(assoc), "stored association should round-trip");
}

/// Storing an existing handle again overwrites the payload.
pub async fn assoc_store_overwrites_payload<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let server = "https://overwrite.example/endpoint";

    store.store_association(server, &TestAssociation::new("ow-1", 100)).await.expect("store");
    store.store_association(server, &TestAssociation::new("ow-1", 900)).await.expect("overwrite");

    let found = store.get_association(server, Some("ow-1")).await.expect("lookup");
    assert_eq!(found.expect("present").expires_in, 900, "overwrite should replace payload");
}

/// Best-lookup returns the association with the greatest remaining
/// lifetime, regardless of insertion order.
pub async fn assoc_best_prefers_longest_lived<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let server = "https://best.example/endpoint";

    // Longest-lived first, so the newest association is not the best one.
    store.store_association(server, &TestAssociation::new("long", 100)).await.expect("store long");
    store.store_association(server, &TestAssociation::new("short", 50)).await.expect("store short");

    let best = store.get_association(server, None).await.expect("best lookup");
    assert_eq!(
        best.expect("present").handle,
        "long",
        "best lookup must pick the greatest expires_in, not the newest entry"
    );
}

/// Remove reports whether the handle was present and makes it unknown.
pub async fn assoc_remove_reports_presence<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let server = "https://remove.example/endpoint";

    store.store_association(server, &TestAssociation::new("rm-1", 60)).await.expect("store");

    assert!(store.remove_association(server, "rm-1").await.expect("remove"), "was present");
    assert!(!store.remove_association(server, "rm-1").await.expect("re-remove"), "already gone");
    let found = store.get_association(server, Some("rm-1")).await.expect("lookup");
    assert_eq!(found, None, "removed association should be unknown");
}

/// Removing a handle that was never stored returns `false`, not an error.
pub async fn assoc_remove_unknown_returns_false<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let result = store.remove_association("https://noop.example/endpoint", "ghost").await;
    assert!(result.is_ok(), "removing an unknown handle should not error: {result:?}");
    assert!(!result.expect("checked above"));
}

/// Associations under one server are invisible to another.
pub async fn assoc_servers_are_isolated<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let server_a = "https://tenant-a.example/endpoint";
    let server_b = "https://tenant-b.example/endpoint";

    store.store_association(server_a, &TestAssociation::new("iso-1", 60)).await.expect("store");

    let found = store.get_association(server_b, Some("iso-1")).await.expect("cross lookup");
    assert_eq!(found, None, "association must not leak across servers");
    let best = store.get_association(server_b, None).await.expect("cross best lookup");
    assert_eq!(best, None);
    assert!(!store.remove_association(server_b, "iso-1").await.expect("cross remove"));
}

/// Empty and non-printable handles are rejected with `InvalidHandle`.
pub async fn assoc_invalid_handle_rejected<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let server = "https://invalid.example/endpoint";

    for handle in ["", "has space", "line\nbreak", "tab\there"] {
        let result = store.store_association(server, &TestAssociation::new(handle, 60)).await;
        assert!(
            matches!(result, Err(StoreError::InvalidHandle { .. })),
            "handle {handle:?} should be rejected, got: {result:?}"
        );
    }
}

// ============================================================================
// Nonce — single-use consumption (3 tests)
// ============================================================================

/// Consuming a nonce that was never registered returns `false`.
pub async fn nonce_consume_unknown_returns_false<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let result = store.use_nonce("conf-nonce-unknown").await;
    assert!(result.is_ok(), "consuming an unknown nonce should not error: {result:?}");
    assert!(!result.expect("checked above"));
}

/// A registered nonce is consumable exactly once.
pub async fn nonce_register_then_consume_once<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    store.store_nonce("conf-nonce-once").await.expect("register");

    assert!(store.use_nonce("conf-nonce-once").await.expect("first consume"));
    assert!(!store.use_nonce("conf-nonce-once").await.expect("second consume"), "single use");
}

/// A consumed nonce can be registered again and consumed again.
pub async fn nonce_reregister_after_consume<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    store.store_nonce("conf-nonce-again").await.expect("register");
    assert!(store.use_nonce("conf-nonce-again").await.expect("consume"));

    store.store_nonce("conf-nonce-again").await.expect("re-register");
    assert!(store.use_nonce("conf-nonce-again").await.expect("re-consume"));
}

// ============================================================================
// Secret — stability and concurrent agreement (2 tests)
// ============================================================================

/// Repeated `signing_secret` calls return the identical non-empty value.
pub async fn secret_is_stable_across_calls<S>(store: &S)
where
    S: ArtifactStore<Association = TestAssociation>,
{
    let first = store.signing_secret().await.expect("first call");
    let second = store.signing_secret().await.expect("second call");

    assert!(!first.is_empty(), "signing secret must not be empty");
    assert_eq!(*first, *second, "signing secret must be stable across calls");
}

/// Concurrent `signing_secret` callers all observe one identical value.
///
/// Requires `S: 'static` so the store can be shared across spawned tasks
/// via `Arc`.
pub async fn secret_concurrent_callers_agree<S>(store: Arc<S>)
where
    S: ArtifactStore<Association = TestAssociation> + 'static,
{
    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.signing_secret().await.expect("concurrent signing_secret")
        }));
    }

    let reference = store.signing_secret().await.expect("reference call");
    for handle in handles {
        let secret = handle.await.expect("task join");
        assert_eq!(*secret, *reference, "every caller must observe the same secret");
    }
}

// ============================================================================
// Convenience runner — run the whole suite against a single store
// ============================================================================

/// Run the full conformance suite against the given store.
///
/// Each check uses its own server identifiers and nonce values, so the
/// whole suite can share one store instance:
///
/// ```no_run
/// use std::sync::Arc;
/// use relier_store::{MemoryStore, conformance};
///
/// #[tokio::test]
/// async fn memory_store_conformance() {
///     conformance::run_all(Arc::new(MemoryStore::new())).await;
/// }
/// ```
///
/// For finer-grained failure reporting, call individual functions directly.
pub async fn run_all<S>(store: Arc<S>)
where
    S: ArtifactStore<Association = TestAssociation> + 'static,
{
    // Association
    assoc_lookup_missing_returns_none(store.as_ref()).await;
    assoc_store_then_lookup_roundtrip(store.as_ref()).await;
    assoc_store_overwrites_payload(store.as_ref()).await;
    assoc_best_prefers_longest_lived(store.as_ref()).await;
    assoc_remove_reports_presence(store.as_ref()).await;
    assoc_remove_unknown_returns_false(store.as_ref()).await;
    assoc_servers_are_isolated(store.as_ref()).await;
    assoc_invalid_handle_rejected(store.as_ref()).await;

    // Nonce
    nonce_consume_unknown_returns_false(store.as_ref()).await;
    nonce_register_then_consume_once(store.as_ref()).await;
    nonce_reregister_after_consume(store.as_ref()).await;

    // Secret
    secret_is_stable_across_calls(store.as_ref()).await;
    secret_concurrent_callers_agree(Arc::clone(&store)).await;
}
