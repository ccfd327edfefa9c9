//! Association record wire codec.
//!
//! Each cached association record carries its list link and the caller's
//! payload in one value: the next handle, a single `\n`, then the payload
//! bytes verbatim. The link field can never contain a newline (handles are
//! printable ASCII), so parsing splits at the first newline and everything
//! after it belongs to the payload, newlines and all.

use thiserror::Error;

use crate::association::AssociationData;

/// One entry in a server's association list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssociationRecord<A> {
    /// Handle of the next record in the list; empty marks the tail.
    pub(crate) next: String,
    /// The caller's association.
    pub(crate) data: A,
}

/// Why cached record bytes failed to parse.
///
/// Any variant means the entry is corrupt: the store prunes it and treats
/// the association as absent.
#[derive(Debug, Error)]
pub(crate) enum RecordParseError<E: std::error::Error> {
    /// No newline separating the link field from the payload.
    #[error("malformed association record: missing separator")]
    MissingSeparator,

    /// The link field is not valid UTF-8.
    #[error("malformed association record: link is not valid UTF-8")]
    LinkEncoding,

    /// The payload bytes failed to decode.
    #[error("malformed association payload")]
    Payload(#[source] E),
}

impl<A: AssociationData> AssociationRecord<A> {
    pub(crate) fn encode(&self) -> Vec<u8> {
        Self::encode_parts(&self.next, &self.data)
    }

    /// Encodes without requiring an owned record; writes compose the link
    /// and a borrowed association directly.
    pub(crate) fn encode_parts(next: &str, data: &A) -> Vec<u8> {
        debug_assert!(!next.contains('\n'), "link field must stay newline-free");

        let payload = data.to_bytes();
        let mut bytes = Vec::with_capacity(next.len() + 1 + payload.len());
        bytes.extend_from_slice(next.as_bytes());
        bytes.push(b'\n');
        bytes.extend_from_slice(&payload);
        bytes
    }

    pub(crate) fn parse(bytes: &[u8]) -> Result<Self, RecordParseError<A::DecodeError>> {
        let separator = bytes
            .iter()
            .position(|b| *b == b'\n')
            .ok_or(RecordParseError::MissingSeparator)?;

        let next = std::str::from_utf8(&bytes[..separator])
            .map_err(|_| RecordParseError::LinkEncoding)?
            .to_owned();
        let data = A::from_bytes(&bytes[separator + 1..]).map_err(RecordParseError::Payload)?;

        Ok(Self { next, data })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// Payload that accepts any bytes, for exercising the framing alone.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Blob(Vec<u8>);

    impl AssociationData for Blob {
        type DecodeError = std::convert::Infallible;

        fn handle(&self) -> &str {
            "blob"
        }

        fn expires_in(&self) -> i64 {
            0
        }

        fn to_bytes(&self) -> Vec<u8> {
            self.0.clone()
        }

        fn from_bytes(bytes: &[u8]) -> Result<Self, Self::DecodeError> {
            Ok(Self(bytes.to_vec()))
        }
    }

    #[derive(Debug, Error)]
    #[error("payload rejected")]
    struct PayloadRejected;

    /// Payload whose decoder always fails.
    #[derive(Debug)]
    struct Rejecting;

    impl AssociationData for Rejecting {
        type DecodeError = PayloadRejected;

        fn handle(&self) -> &str {
            "rejecting"
        }

        fn expires_in(&self) -> i64 {
            0
        }

        fn to_bytes(&self) -> Vec<u8> {
            Vec::new()
        }

        fn from_bytes(_bytes: &[u8]) -> Result<Self, Self::DecodeError> {
            Err(PayloadRejected)
        }
    }

    #[test]
    fn test_encode_shape() {
        let rec = AssociationRecord { next: "h2".to_owned(), data: Blob(b"payload".to_vec()) };
        assert_eq!(rec.encode(), b"h2\npayload");
    }

    #[test]
    fn test_tail_record_has_empty_link() {
        let rec = AssociationRecord { next: String::new(), data: Blob(b"payload".to_vec()) };
        assert_eq!(rec.encode(), b"\npayload");

        let parsed = AssociationRecord::<Blob>::parse(b"\npayload").unwrap();
        assert_eq!(parsed.next, "");
        assert_eq!(parsed.data, Blob(b"payload".to_vec()));
    }

    #[test]
    fn test_parse_splits_at_first_newline_only() {
        let parsed = AssociationRecord::<Blob>::parse(b"h2\npay\nload").unwrap();
        assert_eq!(parsed.next, "h2");
        assert_eq!(parsed.data, Blob(b"pay\nload".to_vec()));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let err = AssociationRecord::<Blob>::parse(b"no separator here").unwrap_err();
        assert!(matches!(err, RecordParseError::MissingSeparator));
    }

    #[test]
    fn test_parse_rejects_non_utf8_link() {
        let err = AssociationRecord::<Blob>::parse(b"\xff\xfe\npayload").unwrap_err();
        assert!(matches!(err, RecordParseError::LinkEncoding));
    }

    #[test]
    fn test_parse_surfaces_payload_decode_failure() {
        let err = AssociationRecord::<Rejecting>::parse(b"h2\nwhatever").unwrap_err();
        assert!(matches!(err, RecordParseError::Payload(_)));
    }

    #[test]
    fn test_empty_payload_round_trips() {
        let rec = AssociationRecord { next: "h9".to_owned(), data: Blob(Vec::new()) };
        let parsed = AssociationRecord::<Blob>::parse(&rec.encode()).unwrap();
        assert_eq!(parsed, rec);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Encode then parse returns the original link and payload for
            /// any printable link and any payload bytes.
            #[test]
            fn round_trip(
                next in "[!-~]{0,16}",
                payload in proptest::collection::vec(any::<u8>(), 0..64),
            ) {
                let rec = AssociationRecord { next, data: Blob(payload) };
                let parsed = AssociationRecord::<Blob>::parse(&rec.encode()).unwrap();
                prop_assert_eq!(parsed, rec);
            }
        }
    }
}
