//! Cache key type and validation.
//!
//! Cache servers in the memcached family restrict keys to short printable
//! byte strings. [`CacheKey`] pairs the key text with an optional shard hint
//! so that sharding-aware clients can route related keys to the same node
//! without parsing the key itself.

use std::fmt;

use crate::error::{CacheError, CacheResult};

/// Maximum key length in bytes, including any caller-applied namespace prefix.
///
/// Matches the strictest limit among common cache servers (memcached's 250).
pub const MAX_KEY_BYTES: usize = 250;

/// A cache key with an optional shard-routing hint.
///
/// The hint is advisory: implementations that don't shard ignore it, and
/// correctness never depends on it. Two keys with equal text are the same
/// key regardless of their hints, so the hint is excluded from equality and
/// hashing.
#[derive(Debug, Clone)]
pub struct CacheKey {
    text: String,
    shard_hint: Option<u64>,
}

impl CacheKey {
    /// Creates a key with no shard hint.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), shard_hint: None }
    }

    /// Creates a key carrying a shard-routing hint.
    ///
    /// Hints must be derived deterministically (no per-process hasher seeds),
    /// or different processes will route the same key to different shards.
    #[must_use]
    pub fn with_shard_hint(text: impl Into<String>, shard_hint: u64) -> Self {
        Self { text: text.into(), shard_hint: Some(shard_hint) }
    }

    /// The key text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The key text as bytes, as it goes on the wire.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// The shard-routing hint, if any.
    #[must_use]
    pub fn shard_hint(&self) -> Option<u64> {
        self.shard_hint
    }

    /// Checks this key against the cache key contract.
    ///
    /// Keys must be non-empty, at most [`MAX_KEY_BYTES`] bytes, and contain
    /// no control or whitespace bytes (anything at or below `0x20`, or the
    /// `0x7f` DEL byte). Bytes above `0x7f` are allowed, so UTF-8 prefixes
    /// pass as long as they are short enough.
    ///
    /// Implementations call this at the top of every operation; callers that
    /// build keys from untrusted input can call it up front.
    pub fn validate(&self) -> CacheResult<()> {
        if self.text.is_empty() {
            return Err(CacheError::invalid_key("key is empty"));
        }
        if self.text.len() > MAX_KEY_BYTES {
            return Err(CacheError::invalid_key(format!(
                "key is {} bytes, limit is {MAX_KEY_BYTES}",
                self.text.len()
            )));
        }
        if let Some(byte) = self.text.bytes().find(|b| *b <= 0x20 || *b == 0x7f) {
            return Err(CacheError::invalid_key(format!(
                "key contains control or whitespace byte 0x{byte:02x}"
            )));
        }
        Ok(())
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for CacheKey {}

impl std::hash::Hash for CacheKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for CacheKey {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for CacheKey {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
