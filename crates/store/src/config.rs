//! Configuration for the cache-backed artifact store.
//!
//! This module provides [`StoreConfig`], which controls how the store
//! namespaces its keys, where the signing secret comes from, and how long
//! nonces stay valid.

use std::time::Duration;

use relier_cache::MAX_KEY_BYTES;
use serde::{Deserialize, Serialize};

use crate::{
    error::{StoreError, StoreResult},
    keys::KEY_SUFFIX_BYTES,
};

/// Default nonce lifetime (6 hours).
pub const DEFAULT_NONCE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Longest usable key prefix: whatever the cache key limit leaves after the
/// store's own key suffix.
const MAX_PREFIX_BYTES: usize = MAX_KEY_BYTES - KEY_SUFFIX_BYTES;

/// Configuration for [`CacheStore`](crate::CacheStore).
///
/// # Key Prefix
///
/// Every key the store touches starts with `key_prefix`, keeping it clear
/// of other users of the same cache. The store appends at most
/// [`KEY_SUFFIX_BYTES`] to the prefix, so the prefix may be up to 229 bytes
/// of printable text.
///
/// # Secret Phrase
///
/// With no `secret_phrase`, the signing secret is random and lives only in
/// the cache; a flush invalidates every outstanding token. Configuring a
/// phrase pins the secret to a hash of the phrase so it survives flushes.
/// Choose it carefully and treat it like a password.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use relier_store::StoreConfig;
///
/// let config = StoreConfig::builder()
///     .key_prefix("openid_")
///     .secret_phrase("correct horse battery staple")
///     .nonce_ttl(Duration::from_secs(3600))
///     .build()?;
/// # Ok::<(), relier_store::StoreError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Prefix prepended to every generated cache key.
    #[serde(default)]
    pub(crate) key_prefix: String,

    /// Optional phrase the signing secret is derived from.
    #[serde(default)]
    pub(crate) secret_phrase: Option<String>,

    /// How long a registered nonce stays consumable.
    #[serde(with = "humantime_serde", default = "default_nonce_ttl")]
    pub(crate) nonce_ttl: Duration,
}

fn default_nonce_ttl() -> Duration {
    DEFAULT_NONCE_TTL
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { key_prefix: String::new(), secret_phrase: None, nonce_ttl: DEFAULT_NONCE_TTL }
    }
}

#[bon::bon]
impl StoreConfig {
    /// Creates a new configuration, validating all fields.
    ///
    /// # Optional Fields
    ///
    /// * `key_prefix` - Namespace prefix for all keys (default: empty).
    /// * `secret_phrase` - Phrase the signing secret is derived from
    ///   (default: none, secret is provisioned in the cache).
    /// * `nonce_ttl` - Nonce lifetime (default: 6 hours).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if:
    /// - The prefix is longer than the cache key limit allows or contains
    ///   control or whitespace bytes
    /// - A secret phrase is set but empty
    /// - The nonce TTL is zero
    #[builder]
    pub fn new(
        #[builder(into, default)] key_prefix: String,
        #[builder(into)] secret_phrase: Option<String>,
        #[builder(default = DEFAULT_NONCE_TTL)] nonce_ttl: Duration,
    ) -> StoreResult<Self> {
        if key_prefix.len() > MAX_PREFIX_BYTES {
            return Err(StoreError::config(format!(
                "key_prefix is {} bytes, limit is {MAX_PREFIX_BYTES}",
                key_prefix.len()
            )));
        }

        if key_prefix.bytes().any(|b| b <= 0x20 || b == 0x7f) {
            return Err(StoreError::config(
                "key_prefix must not contain control or whitespace bytes",
            ));
        }

        if secret_phrase.as_deref() == Some("") {
            return Err(StoreError::config("secret_phrase must not be empty when set"));
        }

        if nonce_ttl.is_zero() {
            return Err(StoreError::config("nonce_ttl must be positive"));
        }

        Ok(Self { key_prefix, secret_phrase, nonce_ttl })
    }

    /// Returns the configured key prefix.
    #[must_use]
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Returns the secret phrase if one is configured.
    #[must_use]
    pub fn secret_phrase(&self) -> Option<&str> {
        self.secret_phrase.as_deref()
    }

    /// Returns the nonce lifetime.
    #[must_use]
    pub fn nonce_ttl(&self) -> Duration {
        self.nonce_ttl
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = StoreConfig::builder().build().unwrap();

        assert_eq!(config.key_prefix(), "");
        assert_eq!(config.secret_phrase(), None);
        assert_eq!(config.nonce_ttl(), DEFAULT_NONCE_TTL);
    }

    #[test]
    fn test_builder_defaults_match_default_impl() {
        let built = StoreConfig::builder().build().unwrap();
        let default = StoreConfig::default();

        assert_eq!(built.key_prefix(), default.key_prefix());
        assert_eq!(built.secret_phrase(), default.secret_phrase());
        assert_eq!(built.nonce_ttl(), default.nonce_ttl());
    }

    #[test]
    fn test_all_fields() {
        let config = StoreConfig::builder()
            .key_prefix("openid_")
            .secret_phrase("hush")
            .nonce_ttl(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.key_prefix(), "openid_");
        assert_eq!(config.secret_phrase(), Some("hush"));
        assert_eq!(config.nonce_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_maybe_secret_phrase() {
        let config = StoreConfig::builder().maybe_secret_phrase(None::<String>).build().unwrap();
        assert_eq!(config.secret_phrase(), None);
    }

    #[test]
    fn test_longest_legal_prefix_accepted() {
        let config = StoreConfig::builder().key_prefix("p".repeat(MAX_PREFIX_BYTES)).build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_oversized_prefix_rejected() {
        let result = StoreConfig::builder().key_prefix("p".repeat(MAX_PREFIX_BYTES + 1)).build();

        let err = result.unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }), "{err}");
    }

    #[test]
    fn test_prefix_with_whitespace_rejected() {
        for prefix in ["has space", "tab\t", "newline\n", "del\u{7f}"] {
            let result = StoreConfig::builder().key_prefix(prefix).build();
            assert!(result.is_err(), "{prefix:?} should be rejected");
        }
    }

    #[test]
    fn test_empty_secret_phrase_rejected() {
        let result = StoreConfig::builder().secret_phrase("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_nonce_ttl_rejected() {
        let result = StoreConfig::builder().nonce_ttl(Duration::ZERO).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialization_with_defaults() {
        let json = r#"{ "key_prefix": "app_" }"#;
        let config: StoreConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.key_prefix(), "app_");
        assert_eq!(config.secret_phrase(), None);
        assert_eq!(config.nonce_ttl(), DEFAULT_NONCE_TTL);
    }

    #[test]
    fn test_deserialization_parses_humantime_ttl() {
        let json = r#"{ "nonce_ttl": "30m" }"#;
        let config: StoreConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.nonce_ttl(), Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_deserialization_rejects_unknown_fields() {
        let json = r#"{ "key_prefix": "app_", "surprise": true }"#;
        assert!(serde_json::from_str::<StoreConfig>(json).is_err());
    }
}
