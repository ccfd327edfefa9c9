//! Client contract for a flat, TTL-capable distributed cache.
//!
//! This crate defines the [`CacheClient`] trait and related types used by
//! layers that persist transient state in a memcached-class cache. The
//! contract is deliberately the weakest such services share: opaque byte
//! values under short printable keys, five individually-atomic operations,
//! and no promises about data surviving eviction or restart.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Caller layers                      │
//! │   (indexes, nonce guards, provisioners, sessions)   │
//! ├─────────────────────────────────────────────────────┤
//! │                  relier-cache                       │
//! │                CacheClient trait                    │
//! │   (get, set, set_with_ttl, set_if_absent, delete)   │
//! ├───────────────┬─────────────────────────────────────┤
//! │  MemoryCache  │   server-backed clients (external)  │
//! │   (testing)   │                                     │
//! └───────────────┴─────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use relier_cache::{CacheClient, CacheKey, MemoryCache};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = MemoryCache::new();
//!     let key = CacheKey::new("user:123");
//!
//!     cache.set(&key, b"Alice".to_vec()).await?;
//!
//!     let value = cache.get(&key).await?;
//!     assert_eq!(value.map(|b| b.to_vec()), Some(b"Alice".to_vec()));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`CacheResult<T>`]. Absence is not an error: `get`
//! yields `Ok(None)` for a missing or expired key and `delete` ignores
//! missing keys. A lost [`set_if_absent`](CacheClient::set_if_absent) race
//! surfaces as [`CacheError::Conflict`].
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with the [`testutil::FaultyCache`]
//!   failure-injection wrapper. Enable this in `[dev-dependencies]` for
//!   integration tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod key;
pub mod memory;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

// Re-export primary types at crate root for convenience
pub use client::CacheClient;
pub use error::{BoxError, CacheError, CacheResult};
pub use key::{CacheKey, MAX_KEY_BYTES};
pub use memory::MemoryCache;
