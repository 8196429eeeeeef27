//! Fixed-layout ("serde") encoding primitives.
//!
//! Every logical field type serializes to its own fixed slot: booleans and
//! integers up to 32 bits occupy 4 bytes (to keep every field aligned to a
//! 4-byte boundary), 64-bit integers occupy 8 bytes, and byte blocks are a
//! 4-byte length followed by the bytes themselves padded out to the next
//! 4-byte boundary. Nested structures serialize field-by-field in the order
//! they're declared. All integers are little-endian.

use crate::errors::{ProtocolError, Result};

/// A read cursor over a fixed-encoded body.
///
/// Tracks only a position into a borrowed byte slice; every `read_*` method
/// advances it and fails with [`ProtocolError::FixedBufferExhausted`] rather
/// than panicking when the buffer runs out.
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Wrap a byte slice for fixed-encoding decode.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes remaining.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(ProtocolError::FixedBufferExhausted { field })?;
        let slice = self.bytes.get(self.pos..end).ok_or(ProtocolError::FixedBufferExhausted { field })?;
        self.pos = end;
        Ok(slice)
    }
}

/// Round a byte length up to the next multiple of 4.
#[must_use]
pub const fn align4(n: u32) -> u32 {
    (n + 3) & !3
}

/// A value that can be encoded in the fixed, 4-byte-aligned layout.
///
/// Implemented for the primitive field types, for [`Vec<u8>`] (a byte
/// block), and generically for `Option<T>` (a presence bit followed by the
/// payload when present) and `Vec<T>` (a `u32` count followed by that many
/// elements).
pub trait FixedCodec: Sized {
    /// Number of bytes this value occupies on the wire.
    fn fixed_size(&self) -> u32;

    /// Append this value's wire bytes to `buf`.
    fn write_fixed(&self, buf: &mut Vec<u8>);

    /// Consume this value's wire bytes from `cur`.
    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self>;
}

macro_rules! impl_fixed_int_slot4 {
    ($ty:ty) => {
        impl FixedCodec for $ty {
            fn fixed_size(&self) -> u32 {
                4
            }

            fn write_fixed(&self, buf: &mut Vec<u8>) {
                let widened = i32::from(*self);
                buf.extend_from_slice(&widened.to_le_bytes());
            }

            fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
                let bytes = cur.take(4, stringify!($ty))?;
                #[allow(clippy::unwrap_used)]
                let widened = i32::from_le_bytes(bytes.try_into().unwrap());
                Ok(widened as $ty)
            }
        }
    };
}

impl FixedCodec for bool {
    fn fixed_size(&self) -> u32 {
        4
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        u32::from(*self).write_fixed(buf);
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(u32::read_fixed(cur)? != 0)
    }
}

impl FixedCodec for u32 {
    fn fixed_size(&self) -> u32 {
        4
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        let bytes = cur.take(4, "u32")?;
        #[allow(clippy::unwrap_used)]
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }
}

impl FixedCodec for i32 {
    fn fixed_size(&self) -> u32 {
        4
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        let bytes = cur.take(4, "i32")?;
        #[allow(clippy::unwrap_used)]
        Ok(i32::from_le_bytes(bytes.try_into().unwrap()))
    }
}

impl_fixed_int_slot4!(u8);
impl_fixed_int_slot4!(u16);
impl_fixed_int_slot4!(i8);
impl_fixed_int_slot4!(i16);

impl FixedCodec for u64 {
    fn fixed_size(&self) -> u32 {
        8
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        let bytes = cur.take(8, "u64")?;
        #[allow(clippy::unwrap_used)]
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }
}

impl FixedCodec for i64 {
    fn fixed_size(&self) -> u32 {
        8
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        let bytes = cur.take(8, "i64")?;
        #[allow(clippy::unwrap_used)]
        Ok(i64::from_le_bytes(bytes.try_into().unwrap()))
    }
}

impl FixedCodec for Vec<u8> {
    fn fixed_size(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let len = self.len() as u32;
        4 + align4(len)
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        #[allow(clippy::cast_possible_truncation)]
        let len = self.len() as u32;
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(self);
        let pad = align4(len) - len;
        buf.extend(std::iter::repeat_n(0u8, pad as usize));
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        let len = u32::read_fixed(cur)?;
        let data = cur.take(len as usize, "bytes")?.to_vec();
        let pad = align4(len) - len;
        let _ = cur.take(pad as usize, "bytes-padding")?;
        Ok(data)
    }
}

impl FixedCodec for String {
    fn fixed_size(&self) -> u32 {
        self.clone().into_bytes().fixed_size()
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        self.clone().into_bytes().write_fixed(buf);
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        let bytes = Vec::<u8>::read_fixed(cur)?;
        String::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8("string"))
    }
}

impl<T: FixedCodec> FixedCodec for Option<T> {
    fn fixed_size(&self) -> u32 {
        4 + self.as_ref().map_or(0, FixedCodec::fixed_size)
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        self.is_some().write_fixed(buf);
        if let Some(value) = self {
            value.write_fixed(buf);
        }
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        let present = bool::read_fixed(cur)?;
        if present { Ok(Some(T::read_fixed(cur)?)) } else { Ok(None) }
    }
}

impl<T: FixedCodec> FixedCodec for Vec<T> {
    fn fixed_size(&self) -> u32 {
        4 + self.iter().map(FixedCodec::fixed_size).sum::<u32>()
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        #[allow(clippy::cast_possible_truncation)]
        let count = self.len() as u32;
        count.write_fixed(buf);
        for item in self {
            item.write_fixed(buf);
        }
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        let count = u32::read_fixed(cur)?;
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(T::read_fixed(cur)?);
        }
        Ok(items)
    }
}

/// The fixed-encoding envelope: `magic | total_size | message_id | body`.
pub struct FixedEnvelope {
    /// Discriminator identifying the body's message type.
    pub message_id: u32,
    /// Encoded body bytes (exactly one message variant).
    pub body: Vec<u8>,
}

impl FixedEnvelope {
    /// Magic word `('h','a','m','2')`.
    pub const MAGIC: u32 = 0x6861_6d32;

    /// Wrap an already fixed-encoded body.
    #[must_use]
    pub fn new(message_id: u32, body: Vec<u8>) -> Self {
        Self { message_id, body }
    }

    /// Serialize the full envelope (magic, total_size, message_id, body).
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        #[allow(clippy::cast_possible_truncation)]
        let total_size = (12 + self.body.len()) as u32;
        let mut out = Vec::with_capacity(total_size as usize);
        out.extend_from_slice(&Self::MAGIC.to_le_bytes());
        out.extend_from_slice(&total_size.to_le_bytes());
        out.extend_from_slice(&self.message_id.to_le_bytes());
        out.extend_from_slice(&self.body);
        out
    }

    /// Parse the envelope, checking magic and that `total_size` matches the
    /// bytes actually supplied.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 12 {
            return Err(ProtocolError::FrameTooShort { expected: 12, actual: bytes.len() });
        }
        #[allow(clippy::unwrap_used)]
        let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        if magic != Self::MAGIC {
            return Err(ProtocolError::InvalidMagic { expected: Self::MAGIC, actual: magic });
        }
        #[allow(clippy::unwrap_used)]
        let total_size = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        #[allow(clippy::unwrap_used)]
        let message_id = u32::from_le_bytes(bytes[8..12].try_into().unwrap());

        let body = &bytes[12..];
        #[allow(clippy::cast_possible_truncation)]
        let decoded_total = (12 + body.len()) as u32;
        if decoded_total != total_size {
            return Err(ProtocolError::SizeMismatch { claimed: total_size, decoded: decoded_total });
        }

        Ok(Self { message_id, body: body.to_vec() })
    }
}

/// The schema-encoding envelope: `magic | big-endian length | body`.
pub struct SchemaEnvelope {
    /// Schema-encoded (CBOR) body bytes.
    pub body: Vec<u8>,
}

impl SchemaEnvelope {
    /// Magic word `('h','a','m','1')`.
    pub const MAGIC: u32 = 0x6861_6d31;

    /// Serialize the 8-byte header followed by `body`.
    #[must_use]
    pub fn encode(body: Vec<u8>) -> Vec<u8> {
        #[allow(clippy::cast_possible_truncation)]
        let len = body.len() as u32;
        let mut out = Vec::with_capacity(8 + body.len());
        out.extend_from_slice(&Self::MAGIC.to_be_bytes());
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&body);
        out
    }

    /// Parse the header, checking magic and that the declared length
    /// matches the bytes actually supplied.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(ProtocolError::FrameTooShort { expected: 8, actual: bytes.len() });
        }
        #[allow(clippy::unwrap_used)]
        let magic = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
        if magic != Self::MAGIC {
            return Err(ProtocolError::InvalidMagic { expected: Self::MAGIC, actual: magic });
        }
        #[allow(clippy::unwrap_used)]
        let len = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
        let body = bytes.get(8..).unwrap_or(&[]);
        if body.len() != len as usize {
            return Err(ProtocolError::FrameTruncated { expected: len as usize, actual: body.len() });
        }
        Ok(Self { body: body.to_vec() })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn primitive_round_trip() {
        let mut buf = Vec::new();
        42u32.write_fixed(&mut buf);
        true.write_fixed(&mut buf);
        (-7i16).write_fixed(&mut buf);
        9_999_999_999u64.write_fixed(&mut buf);
        let mut cur = Cursor::new(&buf);
        assert_eq!(u32::read_fixed(&mut cur).unwrap(), 42);
        assert!(bool::read_fixed(&mut cur).unwrap());
        assert_eq!(i16::read_fixed(&mut cur).unwrap(), -7);
        assert_eq!(u64::read_fixed(&mut cur).unwrap(), 9_999_999_999);
    }

    #[test]
    fn byte_block_pads_to_four() {
        let v = vec![1u8, 2, 3];
        assert_eq!(v.fixed_size(), 4 + 4);
        let mut buf = Vec::new();
        v.write_fixed(&mut buf);
        assert_eq!(buf.len(), 8);
        let mut cur = Cursor::new(&buf);
        assert_eq!(Vec::<u8>::read_fixed(&mut cur).unwrap(), v);
    }

    #[test]
    fn option_round_trip() {
        let present: Option<u32> = Some(7);
        let absent: Option<u32> = None;
        let mut buf = Vec::new();
        present.write_fixed(&mut buf);
        absent.write_fixed(&mut buf);
        let mut cur = Cursor::new(&buf);
        assert_eq!(Option::<u32>::read_fixed(&mut cur).unwrap(), present);
        assert_eq!(Option::<u32>::read_fixed(&mut cur).unwrap(), absent);
    }

    #[test]
    fn envelope_rejects_bad_magic() {
        let bytes = [0u8; 12];
        assert!(matches!(FixedEnvelope::decode(&bytes), Err(ProtocolError::InvalidMagic { .. })));
        assert!(matches!(SchemaEnvelope::decode(&bytes), Err(ProtocolError::InvalidMagic { .. })));
    }

    proptest! {
        #[test]
        fn u32_prop_round_trip(value in any::<u32>()) {
            let mut buf = Vec::new();
            value.write_fixed(&mut buf);
            let mut cur = Cursor::new(&buf);
            prop_assert_eq!(u32::read_fixed(&mut cur).unwrap(), value);
        }

        #[test]
        fn bytes_prop_round_trip(value in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut buf = Vec::new();
            value.write_fixed(&mut buf);
            prop_assert_eq!(buf.len() as u32, value.fixed_size());
            let mut cur = Cursor::new(&buf);
            prop_assert_eq!(Vec::<u8>::read_fixed(&mut cur).unwrap(), value);
        }
    }
}
