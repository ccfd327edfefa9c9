//! Cache error types and result alias.
//!
//! Every [`CacheClient`](crate::CacheClient) implementation maps its internal
//! failures to these standardized error types, so callers can be written once
//! against the trait.
//!
//! # Error Types
//!
//! - [`CacheError::Conflict`] - `set_if_absent` found the key already live
//! - [`CacheError::InvalidKey`] - Key violates the length or byte-class contract
//! - [`CacheError::Connection`] - Network or connection-related failures
//! - [`CacheError::Internal`] - Implementation-specific internal errors
//!
//! Absence is never an error: `get` reports a missing key as `Ok(None)` and
//! `delete` treats it as a no-op.
//!
//! # Example
//!
//! ```
//! use relier_cache::{CacheError, CacheResult};
//!
//! fn reject(key: &str) -> CacheResult<()> {
//!     Err(CacheError::invalid_key(format!("unusable key: {key}")))
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur during cache operations.
///
/// Errors preserve their source chain via the `#[source]` attribute, enabling
/// debugging tools to display the full error context.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    /// A conditional insert lost: the key already holds a live value.
    ///
    /// Returned only by [`set_if_absent`](crate::CacheClient::set_if_absent).
    /// Callers racing for a well-known key should re-read after seeing this.
    #[error("Key already present: {key}")]
    Conflict {
        /// The key that was already present.
        key: String,
    },

    /// The key violates the cache's key contract.
    ///
    /// Keys must be non-empty, at most [`MAX_KEY_BYTES`](crate::MAX_KEY_BYTES)
    /// bytes, and free of control or whitespace bytes.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of the violated rule.
        message: String,
    },

    /// Connection or network error.
    ///
    /// The cache server could not be reached or dropped the connection
    /// mid-operation. The stored state of the affected key is unknown.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Internal cache implementation error.
    ///
    /// A catch-all for implementation-specific failures that don't fit other
    /// categories.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },
}

impl CacheError {
    /// Creates a new `Conflict` error for the given key.
    #[must_use]
    pub fn conflict(key: impl Into<String>) -> Self {
        Self::Conflict { key: key.into() }
    }

    /// Creates a new `InvalidKey` error with the given message.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey { message: message.into() }
    }

    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Whether this error is a lost conditional insert.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
