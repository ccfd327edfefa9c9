//! Store error types and result alias.
//!
//! The store's failure surface is deliberately small. Absence is never an
//! error: a missing association is `Ok(None)`, an unknown nonce is
//! `Ok(false)`, and an unparsable record is pruned and reported as absent.
//! What remains is:
//!
//! - [`StoreError::Cache`] - A cache operation the store depends on failed
//! - [`StoreError::InvalidHandle`] - An association handle violates the handle rules
//! - [`StoreError::SecretProvisioning`] - The signing-secret race retry budget ran out
//! - [`StoreError::Config`] - Invalid store configuration

use relier_cache::CacheError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A cache operation failed.
    ///
    /// Every failed read or write the store depends on surfaces here
    /// immediately; the store never retries and never downgrades a failed
    /// write to a no-op. The cache may have been left mid-update (for
    /// example a root pointer advanced to a record that was never written);
    /// the index design tolerates that as an orphan, not corruption.
    #[error("cache operation failed")]
    Cache(#[from] CacheError),

    /// An association handle violates the handle rules.
    ///
    /// Handles must be non-empty printable ASCII (0x21..=0x7E). The empty
    /// string is the list terminator and a newline would break record
    /// framing, so neither can name a record.
    #[error("invalid association handle: {handle:?}")]
    InvalidHandle {
        /// The offending handle.
        handle: String,
    },

    /// The signing-secret provisioning loop exhausted its retry budget.
    ///
    /// Each attempt both fails to read an existing secret and loses the
    /// publish race. With a handful of racing callers one of them wins on
    /// the first round, so running out of attempts means the cache is
    /// misbehaving (for example evicting the secret between operations).
    #[error("signing secret provisioning failed after {attempts} attempts")]
    SecretProvisioning {
        /// How many read-then-publish rounds were tried.
        attempts: u32,
    },

    /// Invalid store configuration.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the rejected setting.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `InvalidHandle` error.
    #[must_use]
    pub fn invalid_handle(handle: impl Into<String>) -> Self {
        Self::InvalidHandle { handle: handle.into() }
    }

    /// Creates a new `SecretProvisioning` error.
    #[must_use]
    pub fn secret_provisioning(attempts: u32) -> Self {
        Self::SecretProvisioning { attempts }
    }

    /// Creates a new `Config` error with the given message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_errors_convert() {
        fn fails() -> StoreResult<()> {
            Err(CacheError::connection("refused"))?;
            Ok(())
        }

        let err = fails().unwrap_err();
        assert!(matches!(err, StoreError::Cache(_)));

        // The cache failure stays reachable through the source chain.
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("refused"));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            StoreError::invalid_handle("bad handle").to_string(),
            "invalid association handle: \"bad handle\"",
        );
        assert_eq!(
            StoreError::secret_provisioning(3).to_string(),
            "signing secret provisioning failed after 3 attempts",
        );
        assert_eq!(
            StoreError::config("nonce_ttl must be positive").to_string(),
            "invalid configuration: nonce_ttl must be positive",
        );
    }
}
