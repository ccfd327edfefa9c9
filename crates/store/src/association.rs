//! The association payload seam.
//!
//! The store treats an association's cryptographic payload as an opaque byte
//! blob. What it needs from the caller's association type is exactly four
//! things: a handle to name records with, a relative expiry to order them
//! by, and a byte codec. [`AssociationData`] captures that seam; the store
//! never inspects the bytes it carries.

/// A key-agreement association as the store sees it.
///
/// Implement this for whatever concrete association type your protocol
/// layer defines. The store composes your bytes into its own record framing
/// and hands them back through [`from_bytes`](AssociationData::from_bytes)
/// on lookup.
///
/// # Codec laws
///
/// List repair re-encodes records it has just decoded, so the codec must be
/// stable both ways: `from_bytes(to_bytes(a))` yields an association equal
/// to `a`, and `to_bytes(from_bytes(b)?)` yields bytes the codec accepts
/// with the same meaning as `b`. Payload bytes may contain anything,
/// newlines included.
///
/// # Handles
///
/// [`handle`](AssociationData::handle) must be non-empty printable ASCII
/// (bytes 0x21..=0x7E) and stable for the lifetime of the value; the store
/// validates this on every write.
pub trait AssociationData: Sized + Send + Sync {
    /// Error produced when payload bytes don't decode.
    ///
    /// The store treats any decode failure as a corrupt cache entry: it
    /// prunes the entry and reports the association as absent, logging the
    /// error on the way.
    type DecodeError: std::error::Error + Send + Sync + 'static;

    /// The association's handle, unique per server identifier.
    fn handle(&self) -> &str;

    /// Seconds until this association expires.
    ///
    /// Used only to pick the best association during a scan; an expired
    /// association may report zero or a negative value and is still
    /// returned by point lookups.
    fn expires_in(&self) -> i64;

    /// Serializes the payload.
    fn to_bytes(&self) -> Vec<u8>;

    /// Deserializes a payload previously produced by
    /// [`to_bytes`](AssociationData::to_bytes).
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::DecodeError>;
}

/// Whether `handle` may name an association record.
///
/// The empty string is reserved as the list terminator, and anything
/// outside printable ASCII either breaks record framing (newline) or the
/// cache key contract (control bytes, whitespace).
#[must_use]
pub(crate) fn handle_is_valid(handle: &str) -> bool {
    !handle.is_empty() && handle.bytes().all(|b| (0x21..=0x7e).contains(&b))
}
