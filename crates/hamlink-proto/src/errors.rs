//! Protocol-level error taxonomy.
//!
//! Everything here is a structural or format violation: bad magic, a
//! discriminator the catalog doesn't know, a size that doesn't match the
//! bytes actually on the wire. None of it is a server-reported engine
//! status — those travel inside a successfully decoded reply.

use thiserror::Error;

/// Errors produced while framing or codec-decoding a message.
///
/// A `ProtocolError` means the bytes on the wire don't describe a valid
/// message; the session that produced it should be closed rather than
/// reused, since the stream position can no longer be trusted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Envelope shorter than the minimum header size.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum number of bytes required.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// Declared payload length exceeds the bytes actually present.
    #[error("frame truncated: header claims {expected} payload bytes, got {actual}")]
    FrameTruncated {
        /// Payload length claimed by the header.
        expected: usize,
        /// Payload bytes actually available.
        actual: usize,
    },

    /// Payload length exceeds the protocol's maximum.
    #[error("payload too large: {size} bytes exceeds maximum of {max}")]
    PayloadTooLarge {
        /// Size that was rejected.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// The 4-byte magic word did not match either codec's envelope.
    #[error("invalid magic: expected 0x{expected:08x}, got 0x{actual:08x}")]
    InvalidMagic {
        /// Magic the decoder expected.
        expected: u32,
        /// Magic actually read.
        actual: u32,
    },

    /// Fixed-encoding wrapper's `total_size` field disagreed with the
    /// decoded body length.
    #[error("size mismatch: wrapper claims {claimed}, body decoded to {decoded}")]
    SizeMismatch {
        /// `total_size` field from the wrapper.
        claimed: u32,
        /// Length actually consumed decoding the body.
        decoded: u32,
    },

    /// Discriminator id not present in the closed message catalog.
    #[error("unknown message discriminator: {0}")]
    UnknownDiscriminator(u32),

    /// A required field was absent from a decoded message.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Schema-encoding (CBOR) serialization failed.
    #[error("schema encode failed: {0}")]
    SchemaEncode(String),

    /// Schema-encoding (CBOR) deserialization failed.
    #[error("schema decode failed: {0}")]
    SchemaDecode(String),

    /// Fixed-encoding body ran out of bytes mid-field.
    #[error("fixed encoding buffer exhausted reading {field}")]
    FixedBufferExhausted {
        /// Name of the field being decoded when the buffer ran out.
        field: &'static str,
    },

    /// A string field was not valid UTF-8.
    #[error("invalid utf-8 in field {0}")]
    InvalidUtf8(&'static str),

    /// A decoded reply's opcode did not match the request that produced it.
    #[error("unexpected reply: expected {expected}, got {actual}")]
    UnexpectedReply {
        /// Opcode name the caller was matching against.
        expected: &'static str,
        /// Opcode name actually decoded.
        actual: &'static str,
    },
}

/// Convenience alias used throughout the codec.
pub type Result<T> = std::result::Result<T, ProtocolError>;
