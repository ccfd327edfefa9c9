//! Signing-secret sources.
//!
//! The store hands out one shared secret for signing authentication tokens.
//! Deployments that need the secret to survive cache flushes configure a
//! secret phrase, which is hashed down to the secret once at construction;
//! everyone else gets a random secret provisioned in the cache on first
//! use. Secret bytes are wrapped in [`Zeroizing`] so they are wiped when
//! dropped.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

/// Length in bytes of the shared signing secret.
pub const SECRET_LEN: usize = 20;

/// Where signing-secret bytes come from.
pub(crate) enum SecretSource {
    /// Derived once from a configured phrase; the cache is never consulted.
    Fixed(Zeroizing<Vec<u8>>),
    /// Provisioned lazily in the cache; the first caller to publish wins.
    Provisioned,
}

impl SecretSource {
    /// Resolves the source from an optional configured phrase.
    pub(crate) fn from_phrase(phrase: Option<&str>) -> Self {
        match phrase {
            Some(phrase) => {
                let mut hasher = Sha1::new();
                hasher.update(phrase.as_bytes());
                Self::Fixed(Zeroizing::new(hasher.finalize().to_vec()))
            }
            None => Self::Provisioned,
        }
    }

    /// The fixed secret, if this source has one.
    pub(crate) fn fixed(&self) -> Option<Zeroizing<Vec<u8>>> {
        match self {
            Self::Fixed(secret) => Some(secret.clone()),
            Self::Provisioned => None,
        }
    }
}

impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(_) => f.write_str("SecretSource::Fixed(..)"),
            Self::Provisioned => f.write_str("SecretSource::Provisioned"),
        }
    }
}

/// Generates fresh secret bytes from the OS RNG.
pub(crate) fn generate_secret() -> Zeroizing<Vec<u8>> {
    let mut secret = Zeroizing::new(vec![0u8; SECRET_LEN]);
    OsRng.fill_bytes(secret.as_mut_slice());
    secret
}
