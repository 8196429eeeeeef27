//! Caller-facing key/record value types.
//!
//! [`Key`] and [`Record`] are the ergonomic surface callers build and
//! receive; [`hamlink_proto::WireKey`]/[`WireRecord`] are what actually
//! travels on the wire. The two conversions in this module are the only
//! place that boundary is crossed.

use hamlink_core::{ApproxMatch, KeyFlags, RecordFlags};
use hamlink_proto::{WireKey, WireRecord};

/// A key, as supplied to or returned from an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Key {
    /// Key bytes. `None` requests a record-number (server-assigned) key on
    /// insert, or — on a request with `size == 0` and no flags — an
    /// unconstrained match.
    pub data: Option<Vec<u8>>,
    /// Request-side flags.
    pub flags: KeyFlags,
}

impl Key {
    /// A key carrying the given bytes.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: Some(data.into()), flags: KeyFlags::empty() }
    }

    /// A key with no data, for a record-number insert or an unconstrained
    /// cursor/find call.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn to_wire(&self) -> WireKey {
        let size = self.data.as_ref().map_or(0, |d| d.len() as u16);
        WireKey { data: self.data.clone(), size, flags: self.flags.bits(), intflags: 0 }
    }
}

/// A record, as supplied to or returned from an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Record bytes.
    pub data: Option<Vec<u8>>,
    /// Request-side flags.
    pub flags: RecordFlags,
    /// Offset of the partial write/read, meaningful iff `flags` has `PARTIAL`.
    pub partial_offset: u32,
    /// Length of the partial write/read, meaningful iff `flags` has `PARTIAL`.
    pub partial_size: u32,
}

impl Record {
    /// A record carrying the given bytes.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: Some(data.into()), flags: RecordFlags::empty(), partial_offset: 0, partial_size: 0 }
    }

    /// An empty record, for an out-parameter slot on find/move.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn to_wire(&self) -> WireRecord {
        let size = self.data.as_ref().map_or(0, |d| d.len() as u32);
        WireRecord {
            data: self.data.clone(),
            size,
            flags: self.flags.bits(),
            partial_offset: self.partial_offset,
            partial_size: self.partial_size,
        }
    }
}

impl From<WireKey> for Key {
    fn from(wire: WireKey) -> Self {
        Self { data: wire.data, flags: KeyFlags::from_bits_truncate(wire.flags) }
    }
}

impl From<WireRecord> for Record {
    fn from(wire: WireRecord) -> Self {
        Self {
            data: wire.data,
            flags: RecordFlags::from_bits_truncate(wire.flags),
            partial_offset: wire.partial_offset,
            partial_size: wire.partial_size,
        }
    }
}

/// Result of an approximate-match `find`/`move`: the key and record the
/// server matched, plus the relation it reported (spec invariant 5: exactly
/// one of LT/GT/EQ on a successful approximate match).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Found {
    /// The matched key, if the reply carried one.
    pub key: Key,
    /// The matched record, if the reply carried one.
    pub record: Record,
    /// The approximate-match relation the server reported.
    pub relation: ApproxMatch,
}

impl Found {
    pub(crate) fn from_wire(key: WireKey, record: WireRecord) -> Self {
        let relation = ApproxMatch::from_bits_truncate(key.intflags);
        Self { key: key.into(), record: record.into(), relation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_with_data_reports_its_size() {
        let key = Key::new(vec![1, 2, 3]);
        assert_eq!(key.to_wire().size, 3);
    }

    #[test]
    fn key_none_has_no_data_and_zero_size() {
        let key = Key::none();
        let wire = key.to_wire();
        assert_eq!(wire.data, None);
        assert_eq!(wire.size, 0);
    }

    #[test]
    fn found_splits_approx_match_bits_from_the_key() {
        let wire_key = WireKey {
            data: Some(vec![9]),
            size: 1,
            flags: 0,
            intflags: hamlink_proto::approx_match_bits::LT,
        };
        let found = Found::from_wire(wire_key, WireRecord::default());
        assert_eq!(found.relation, ApproxMatch::LT);
        assert_eq!(found.key.data, Some(vec![9]));
    }
}
