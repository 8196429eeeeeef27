//! Wire protocol for the remote storage-engine access layer.
//!
//! Two codecs encode the same closed catalog of 28 request/reply pairs
//! ([`Message`]): a self-describing *schema encoding* (CBOR, wrapped in the
//! 8-byte [`SchemaEnvelope`]) and a hand-rolled, 4-byte-aligned *fixed
//! encoding* (wrapped in [`FixedEnvelope`]). Which one a session uses is
//! negotiated once at connect time; see `hamlink_client::Session`.
//!
//! This crate does no I/O. It only turns [`Message`] values into bytes and
//! back.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod fixed;
pub mod message;
pub mod opcode;

pub use errors::{ProtocolError, Result};
pub use fixed::{Cursor, FixedCodec, FixedEnvelope, SchemaEnvelope, align4};
pub use message::{Message, Param, WireKey, WireRecord, approx_match_bits, key_flag_bits};
pub use opcode::Opcode;

/// Encode a message with the schema (CBOR) encoding, including its 8-byte
/// framing envelope.
pub fn encode_schema(message: &Message) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    ciborium::into_writer(message, &mut body).map_err(|e| ProtocolError::SchemaEncode(e.to_string()))?;
    Ok(SchemaEnvelope::encode(body))
}

/// Decode a schema-encoded frame (envelope + CBOR body) back into a
/// [`Message`].
pub fn decode_schema(bytes: &[u8]) -> Result<Message> {
    let envelope = SchemaEnvelope::decode(bytes)?;
    ciborium::from_reader(envelope.body.as_slice()).map_err(|e| ProtocolError::SchemaDecode(e.to_string()))
}

/// Encode a message with the fixed encoding, including its envelope.
pub fn encode_fixed(message: &Message) -> Vec<u8> {
    let envelope = FixedEnvelope::new(message.opcode().to_u32(), message.encode_fixed());
    envelope.encode()
}

/// Decode a fixed-encoded frame (envelope + body) back into a [`Message`].
pub fn decode_fixed(bytes: &[u8]) -> Result<Message> {
    let envelope = FixedEnvelope::decode(bytes)?;
    let opcode = Opcode::from_u32(envelope.message_id)?;
    Message::decode_fixed(opcode, &envelope.body)
}

/// Which codec a session negotiated at connect time.
///
/// The wire format doesn't name a canonical encoding; this workspace
/// resolves that by requiring both ends to agree on one `Encoding` before
/// any other call is made (see `hamlink_client::Session::connect`), and
/// refusing frames in the other encoding thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Self-describing, variable-length schema encoding (CBOR).
    Schema,
    /// Fixed, 4-byte-aligned layout.
    Fixed,
}

impl Encoding {
    /// Encode a message using this encoding.
    pub fn encode(self, message: &Message) -> Result<Vec<u8>> {
        match self {
            Self::Schema => encode_schema(message),
            Self::Fixed => Ok(encode_fixed(message)),
        }
    }

    /// Decode a message using this encoding.
    pub fn decode(self, bytes: &[u8]) -> Result<Message> {
        match self {
            Self::Schema => decode_schema(bytes),
            Self::Fixed => decode_fixed(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ConnectReply, ConnectRequest};

    #[test]
    fn schema_envelope_round_trip() {
        let message = Message::ConnectRequest(ConnectRequest { path: "env.db".to_string() });
        let wire = encode_schema(&message).unwrap();
        assert_eq!(&wire[0..4], b"ham1");
        assert_eq!(decode_schema(&wire).unwrap(), message);
    }

    #[test]
    fn fixed_envelope_round_trip() {
        let message = Message::ConnectReply(ConnectReply { status: 0, env_handle: 7, env_flags: 0 });
        let wire = encode_fixed(&message);
        // Magic is little-endian, so the on-wire byte order is reversed from "ham2".
        assert_eq!(&wire[0..4], b"2mah");
        assert_eq!(decode_fixed(&wire).unwrap(), message);
    }

    #[test]
    fn encoding_choice_round_trips_both_ways() {
        let message = Message::DisconnectRequest(message::DisconnectRequest { env_handle: 1 });
        for encoding in [Encoding::Schema, Encoding::Fixed] {
            let wire = encoding.encode(&message).unwrap();
            assert_eq!(encoding.decode(&wire).unwrap(), message);
        }
    }
}
