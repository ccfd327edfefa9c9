//! Ephemeral security-artifact storage over a flat cache.
//!
//! This crate stores the short-lived artifacts a relying party tracks during
//! authentication: single-use nonces, per-server key-agreement associations,
//! and a lazily provisioned shared signing secret. The [`ArtifactStore`]
//! trait is the capability; [`CacheStore`] implements it over any
//! [`CacheClient`](relier_cache::CacheClient) using nothing but individually
//! atomic get/set/delete operations, and [`MemoryStore`] implements it in
//! process memory.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Protocol Layer                             │
//! │     (consumer verification, association negotiation)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  relier-store                               │
//! │                ArtifactStore trait                          │
//! │   (associations, nonces, signing secret)                    │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │ MemoryStore  │         CacheStore<C, A>                     │
//! │  (testing)   │   linked-list index over CacheClient         │
//! ├──────────────┴──────────────────────────────────────────────┤
//! │                  relier-cache                               │
//! │        CacheClient trait (memcached-class ops)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use relier_cache::MemoryCache;
//! use relier_store::{ArtifactStore, CacheStore, StoreConfig};
//! # use relier_store::AssociationData;
//! # #[derive(Debug, Clone, PartialEq)] struct Assoc { handle: String, expires_in: i64 }
//! # impl AssociationData for Assoc {
//! #     type DecodeError = std::string::FromUtf8Error;
//! #     fn handle(&self) -> &str { &self.handle }
//! #     fn expires_in(&self) -> i64 { self.expires_in }
//! #     fn to_bytes(&self) -> Vec<u8> {
//! #         format!("{} {}", self.handle, self.expires_in).into_bytes()
//! #     }
//! #     fn from_bytes(bytes: &[u8]) -> Result<Self, Self::DecodeError> {
//! #         let text = String::from_utf8(bytes.to_vec())?;
//! #         let (handle, rest) = text.split_once(' ').unwrap_or((text.as_str(), "0"));
//! #         Ok(Assoc { handle: handle.to_owned(), expires_in: rest.parse().unwrap_or(0) })
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::builder().key_prefix("openid_").build()?;
//!     let store = CacheStore::new(MemoryCache::new(), config);
//!
//!     // Associations are indexed per server and by handle.
//!     let assoc = Assoc { handle: "h1".into(), expires_in: 600 };
//!     store.store_association("https://idp.example", &assoc).await?;
//!     let best = store.get_association("https://idp.example", None).await?;
//!     assert_eq!(best, Some(assoc));
//!
//!     // Nonces are single-use.
//!     store.store_nonce("response-nonce").await?;
//!     assert!(store.use_nonce("response-nonce").await?);
//!     assert!(!store.use_nonce("response-nonce").await?);
//!
//!     // The signing secret is created on first use and then stable.
//!     let secret = store.signing_secret().await?;
//!     assert_eq!(secret, store.signing_secret().await?);
//!     Ok(())
//! }
//! ```
//!
//! # Available Stores
//!
//! | Store | Use Case | Shared across processes |
//! |-------|----------|-------------------------|
//! | [`MemoryStore`] | Testing, single-process deployments | No |
//! | [`CacheStore`] | Production, over a shared cache | Yes |
//!
//! # Implementing a Store
//!
//! To implement a new artifact store:
//!
//! 1. Implement the [`ArtifactStore`] trait
//! 2. Pick (or accept generically) an [`AssociationData`] payload codec
//! 3. Map internal failures to [`StoreError`]
//!
//! See the [`memory`] module source for a reference implementation, and the
//! `conformance` module (behind the `testutil` feature) for the contract
//! checks every implementation should pass.
//!
//! # Error Handling
//!
//! All operations return [`StoreResult<T>`]. Absence is never an error:
//! unknown handles and nonces come back as `Ok(None)` / `Ok(false)`. Failed
//! cache writes always surface as [`StoreError::Cache`].
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module (the `TestAssociation`
//!   fixture and store factories) and the `conformance` module (the shared
//!   contract suite). Enable it in `[dev-dependencies]` for integration
//!   tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod association;
pub mod cache_store;
pub mod config;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod conformance;
pub mod error;
pub mod keys;
pub mod memory;
mod record;
mod secret;
pub mod store;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;

// Re-export primary types at crate root for convenience
pub use association::AssociationData;
pub use cache_store::CacheStore;
pub use config::{DEFAULT_NONCE_TTL, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use keys::{KEY_SUFFIX_BYTES, KeyEncoder};
pub use memory::MemoryStore;
pub use secret::SECRET_LEN;
pub use store::ArtifactStore;
pub use zeroize::Zeroizing;
