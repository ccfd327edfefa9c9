//! Conformance test suite for `MemoryStore` and `CacheStore`.
//!
//! Each test function corresponds to a single conformance check against a
//! single store implementation, providing fine-grained failure reporting.
//! The `run_all` tests exercise the full suite as a one-liner to verify no
//! checks are accidentally omitted.

#![allow(clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use relier_cache::MemoryCache;
use relier_store::{CacheStore, MemoryStore, StoreConfig, conformance, testutil::TestAssociation};

fn memory_store() -> MemoryStore<TestAssociation> {
    MemoryStore::new()
}

fn cache_store() -> CacheStore<MemoryCache, TestAssociation> {
    CacheStore::new(MemoryCache::new(), StoreConfig::default())
}

// ============================================================================
// Association (16 tests)
// ============================================================================

#[tokio::test]
async fn memory_assoc_lookup_missing_returns_none() {
    conformance::assoc_lookup_missing_returns_none(&memory_store()).await;
}

#[tokio::test]
async fn cache_assoc_lookup_missing_returns_none() {
    conformance::assoc_lookup_missing_returns_none(&cache_store()).await;
}

#[tokio::test]
async fn memory_assoc_store_then_lookup_roundtrip() {
    conformance::assoc_store_then_lookup_roundtrip(&memory_store()).await;
}

#[tokio::test]
async fn cache_assoc_store_then_lookup_roundtrip() {
    conformance::assoc_store_then_lookup_roundtrip(&cache_store()).await;
}

#[tokio::test]
async fn memory_assoc_store_overwrites_payload() {
    conformance::assoc_store_overwrites_payload(&memory_store()).await;
}

#[tokio::test]
async fn cache_assoc_store_overwrites_payload() {
    conformance::assoc_store_overwrites_payload(&cache_store()).await;
}

#[tokio::test]
async fn memory_assoc_best_prefers_longest_lived() {
    conformance::assoc_best_prefers_longest_lived(&memory_store()).await;
}

#[tokio::test]
async fn cache_assoc_best_prefers_longest_lived() {
    conformance::assoc_best_prefers_longest_lived(&cache_store()).await;
}

#[tokio::test]
async fn memory_assoc_remove_reports_presence() {
    conformance::assoc_remove_reports_presence(&memory_store()).await;
}

#[tokio::test]
async fn cache_assoc_remove_reports_presence() {
    conformance::assoc_remove_reports_presence(&cache_store()).await;
}

#[tokio::test]
async fn memory_assoc_remove_unknown_returns_false() {
    conformance::assoc_remove_unknown_returns_false(&memory_store()).await;
}

#[tokio::test]
async fn cache_assoc_remove_unknown_returns_false() {
    conformance::assoc_remove_unknown_returns_false(&cache_store()).await;
}

#[tokio::test]
async fn memory_assoc_servers_are_isolated() {
    conformance::assoc_servers_are_isolated(&memory_store()).await;
}

#[tokio::test]
async fn cache_assoc_servers_are_isolated() {
    conformance::assoc_servers_are_isolated(&cache_store()).await;
}

#[tokio::test]
async fn memory_assoc_invalid_handle_rejected() {
    conformance::assoc_invalid_handle_rejected(&memory_store()).await;
}

#[tokio::test]
async fn cache_assoc_invalid_handle_rejected() {
    conformance::assoc_invalid_handle_rejected(&cache_store()).await;
}

// ============================================================================
// Nonce (6 tests)
// ============================================================================

#[tokio::test]
async fn memory_nonce_consume_unknown_returns_false() {
    conformance::nonce_consume_unknown_returns_false(&memory_store()).await;
}

#[tokio::test]
async fn cache_nonce_consume_unknown_returns_false() {
    conformance::nonce_consume_unknown_returns_false(&cache_store()).await;
}

#[tokio::test]
async fn memory_nonce_register_then_consume_once() {
    conformance::nonce_register_then_consume_once(&memory_store()).await;
}

#[tokio::test]
async fn cache_nonce_register_then_consume_once() {
    conformance::nonce_register_then_consume_once(&cache_store()).await;
}

#[tokio::test]
async fn memory_nonce_reregister_after_consume() {
    conformance::nonce_reregister_after_consume(&memory_store()).await;
}

#[tokio::test]
async fn cache_nonce_reregister_after_consume() {
    conformance::nonce_reregister_after_consume(&cache_store()).await;
}

// ============================================================================
// Secret (4 tests)
// ============================================================================

#[tokio::test]
async fn memory_secret_is_stable_across_calls() {
    conformance::secret_is_stable_across_calls(&memory_store()).await;
}

#[tokio::test]
async fn cache_secret_is_stable_across_calls() {
    conformance::secret_is_stable_across_calls(&cache_store()).await;
}

#[tokio::test]
async fn memory_secret_concurrent_callers_agree() {
    conformance::secret_concurrent_callers_agree(Arc::new(memory_store())).await;
}

#[tokio::test]
async fn cache_secret_concurrent_callers_agree() {
    conformance::secret_concurrent_callers_agree(Arc::new(cache_store())).await;
}

// ============================================================================
// Full suite convenience runners
// ============================================================================

/// Runs all conformance checks in sequence to verify completeness.
/// This catches the case where a new check is added to the module but not
/// wired into the individual test functions above.
#[tokio::test]
async fn memory_store_run_all() {
    conformance::run_all(Arc::new(memory_store())).await;
}

#[tokio::test]
async fn cache_store_run_all() {
    conformance::run_all(Arc::new(cache_store())).await;
}
