//! Cache key layout.
//!
//! Every value the store writes lives under a key built here. Identifying
//! strings (server identifiers, handles, nonces) never appear in keys
//! directly; they are SHA-1 hashed and base64-rendered so that keys are
//! fixed length, printable, within the cache's 250-byte limit no matter how
//! long the inputs are, and not enumerable by anyone reading the cache's
//! keyspace.
//!
//! # Layout
//!
//! | Kind | Key | Shard hint |
//! |------|-----|------------|
//! | Association record | `prefix` `A` base64(SHA1(SHA1(server) || SHA1(handle))[..15]) | from server |
//! | Root pointer | `prefix` `S` base64(SHA1(server)[..15]) | from server |
//! | Nonce marker | `prefix` `N` base64(SHA1(nonce)[..15]) | none |
//! | Signing secret | `prefix` `K` | none |
//!
//! Keeping 15 digest bytes gives 120-bit collision resistance and encodes
//! to exactly 20 base64 characters, so every generated key adds at most
//! [`KEY_SUFFIX_BYTES`] past the prefix.
//!
//! Association and root keys carry a shard hint derived from the server
//! identifier alone, so a sharding-aware cache client places one server's
//! whole list on one node. The hint comes from the digest, not a process
//! hasher, so it is stable across processes.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use relier_cache::CacheKey;
use sha1::{Digest, Sha1};

const ASSOCIATION_TAG: char = 'A';
const ROOT_TAG: char = 'S';
const NONCE_TAG: char = 'N';
const SECRET_TAG: char = 'K';

/// Digest bytes kept per key.
const DIGEST_KEEP: usize = 15;

/// Maximum bytes a generated key adds past the configured prefix: one kind
/// tag plus 20 base64 characters (the secret key is the tag alone).
pub const KEY_SUFFIX_BYTES: usize = 21;

/// Builds the cache keys the store uses.
///
/// The prefix is taken as given; [`StoreConfig`](crate::StoreConfig)
/// validates it once, after which every generated key satisfies the cache
/// key contract by construction. An encoder built around an unvalidated
/// prefix still can't corrupt anything: a bad key is rejected by the cache
/// client at operation time.
#[derive(Debug, Clone)]
pub struct KeyEncoder {
    prefix: String,
}

impl KeyEncoder {
    /// Creates an encoder namespacing all keys under `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Key of the association record for `(server_id, handle)`.
    ///
    /// The digest covers both strings, so the key is only derivable knowing
    /// the pair.
    #[must_use]
    pub fn association(&self, server_id: &str, handle: &str) -> CacheKey {
        let mut hasher = Sha1::new();
        hasher.update(sha1_bytes(server_id));
        hasher.update(sha1_bytes(handle));
        let digest: [u8; 20] = hasher.finalize().into();

        CacheKey::with_shard_hint(self.keyed(ASSOCIATION_TAG, &digest), shard_hint(server_id))
    }

    /// Key of the root pointer for `server_id`.
    #[must_use]
    pub fn root(&self, server_id: &str) -> CacheKey {
        CacheKey::with_shard_hint(
            self.keyed(ROOT_TAG, &sha1_bytes(server_id)),
            shard_hint(server_id),
        )
    }

    /// Key of the presence marker for `nonce`.
    #[must_use]
    pub fn nonce(&self, nonce: &str) -> CacheKey {
        CacheKey::new(self.keyed(NONCE_TAG, &sha1_bytes(nonce)))
    }

    /// Key of the shared signing secret.
    #[must_use]
    pub fn signing_secret(&self) -> CacheKey {
        let mut text = String::with_capacity(self.prefix.len() + 1);
        text.push_str(&self.prefix);
        text.push(SECRET_TAG);
        CacheKey::new(text)
    }

    fn keyed(&self, tag: char, digest: &[u8; 20]) -> String {
        let mut text = String::with_capacity(self.prefix.len() + KEY_SUFFIX_BYTES);
        text.push_str(&self.prefix);
        text.push(tag);
        text.push_str(&STANDARD.encode(&digest[..DIGEST_KEEP]));
        text
    }
}

fn sha1_bytes(input: &str) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    hasher.finalize().into()
}

fn shard_hint(server_id: &str) -> u64 {
    let digest = sha1_bytes(server_id);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use relier_cache::MAX_KEY_BYTES;

    use super::*;

    const SERVER: &str = "https://example.org/openid";
    const HANDLE: &str = "{HMAC-SHA1}{lifetime}";

    #[test]
    fn test_hashed_keys_have_fixed_length() {
        let keys = KeyEncoder::new("app_");

        for key in [
            keys.association(SERVER, HANDLE),
            keys.association("s", "h"),
            keys.association(&"x".repeat(4096), &"y".repeat(4096)),
            keys.root(SERVER),
            keys.nonce(&"n".repeat(1000)),
        ] {
            assert_eq!(key.text().len(), "app_".len() + KEY_SUFFIX_BYTES, "key {key}");
        }
    }

    #[test]
    fn test_secret_key_is_bare_tag() {
        let keys = KeyEncoder::new("app_");
        assert_eq!(keys.signing_secret().text(), "app_K");
    }

    #[test]
    fn test_kinds_never_collide() {
        let keys = KeyEncoder::new("");

        // Same identifying string under every kind: the tag byte separates
        // them even if the digests matched.
        let association = keys.association(SERVER, SERVER);
        let root = keys.root(SERVER);
        let nonce = keys.nonce(SERVER);
        let secret = keys.signing_secret();

        let texts =
            [association.text(), root.text(), nonce.text(), secret.text()].map(str::to_owned);
        for (i, a) in texts.iter().enumerate() {
            for b in &texts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_keys_are_deterministic_across_encoders() {
        let one = KeyEncoder::new("app_");
        let two = KeyEncoder::new("app_");

        assert_eq!(one.association(SERVER, HANDLE), two.association(SERVER, HANDLE));
        assert_eq!(one.root(SERVER), two.root(SERVER));
        assert_eq!(one.nonce("abc"), two.nonce("abc"));
        assert_eq!(
            one.association(SERVER, HANDLE).shard_hint(),
            two.association(SERVER, HANDLE).shard_hint(),
        );
    }

    #[test]
    fn test_distinct_inputs_distinct_keys() {
        let keys = KeyEncoder::new("");

        assert_ne!(keys.association(SERVER, "h1"), keys.association(SERVER, "h2"));
        assert_ne!(
            keys.association(SERVER, HANDLE),
            keys.association("https://other.example", HANDLE),
        );
        assert_ne!(keys.root(SERVER), keys.root("https://other.example"));
        assert_ne!(keys.nonce("n1"), keys.nonce("n2"));
    }

    #[test]
    fn test_shard_hints_group_by_server() {
        let keys = KeyEncoder::new("");

        let record = keys.association(SERVER, HANDLE);
        let root = keys.root(SERVER);
        assert_eq!(record.shard_hint(), root.shard_hint());
        assert!(record.shard_hint().is_some());

        assert_ne!(
            keys.root(SERVER).shard_hint(),
            keys.root("https://other.example").shard_hint(),
        );

        assert_eq!(keys.nonce("n").shard_hint(), None);
        assert_eq!(keys.signing_secret().shard_hint(), None);
    }

    #[test]
    fn test_arbitrary_inputs_yield_contract_clean_keys() {
        let keys = KeyEncoder::new("app_");

        // Inputs a cache would reject raw: whitespace, newlines, unicode,
        // and lengths past the key limit.
        for key in [
            keys.association("https://example.org/path with spaces", "handle\nwith\nnewlines"),
            keys.root(&"長い日本語の識別子".repeat(40)),
            keys.nonce(&" ".repeat(MAX_KEY_BYTES * 2)),
        ] {
            key.validate().unwrap();
        }
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Generated keys satisfy the cache key contract for any input
            /// strings whatsoever.
            #[test]
            fn keys_always_validate(server in ".*", handle in ".*", nonce in ".*") {
                let keys = KeyEncoder::new("p_");
                keys.association(&server, &handle).validate().unwrap();
                keys.root(&server).validate().unwrap();
                keys.nonce(&nonce).validate().unwrap();
            }

            /// Distinct (server, handle) pairs map to distinct record keys.
            #[test]
            fn distinct_pairs_distinct_keys(
                server in "[a-z]{1,12}",
                first in "[!-~]{1,12}",
                second in "[!-~]{1,12}",
            ) {
                prop_assume!(first != second);
                let keys = KeyEncoder::new("");
                let one = keys.association(&server, &first);
                let two = keys.association(&server, &second);
                prop_assert_ne!(one, two);
            }
        }
    }
}
