//! Flag bitsets, as typed `bitflags` sets rather than raw integers — while
//! preserving the public bit values the wire format carries (spec Design
//! Notes: "hint flags as a bitset type... preserving the public flag bit
//! values on the wire").

use bitflags::bitflags;

bitflags! {
    /// Request-side flags carried on a [`hamlink_proto::WireKey`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyFlags: u32 {
        /// Caller owns the key buffer; the client must resize it in place
        /// rather than replace it with an arena-owned buffer.
        const USER_ALLOC = hamlink_proto::key_flag_bits::USER_ALLOC;
        /// The database assigns key bytes on insert (an 8-byte auto key).
        const RECORD_NUMBER = hamlink_proto::key_flag_bits::RECORD_NUMBER;
    }
}

bitflags! {
    /// Request-side flags carried on a [`hamlink_proto::WireRecord`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RecordFlags: u32 {
        /// Caller owns the record buffer.
        const USER_ALLOC = 1 << 0;
        /// `partial_offset`/`partial_size` apply to this record.
        const PARTIAL = 1 << 1;
    }
}

bitflags! {
    /// Reply-side approximate-match relation bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ApproxMatch: u32 {
        /// Returned key is less than the requested key.
        const LT = hamlink_proto::approx_match_bits::LT;
        /// Returned key is greater than the requested key.
        const GT = hamlink_proto::approx_match_bits::GT;
        /// Returned key is equal to the requested key.
        const EQ = hamlink_proto::approx_match_bits::EQ;
    }
}

bitflags! {
    /// Database-level flags carried in `db_flags` on `env_create_db`/
    /// `env_open_db` replies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DbFlags: u32 {
        /// The database assigns key bytes on insert (an 8-byte auto key).
        /// Shares its bit value with [`KeyFlags::RECORD_NUMBER`]: the
        /// source engine reuses one constant for both the database-level
        /// and per-operation senses.
        const RECORD_NUMBER = hamlink_proto::key_flag_bits::RECORD_NUMBER;
    }
}

bitflags! {
    /// Transaction flags for [`TxnBeginRequest`](hamlink_proto::message::TxnBeginRequest).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TxnFlags: u32 {
        /// The transaction may not write.
        const READ_ONLY = 1 << 0;
        /// The transaction shares its parent database's arenas rather than
        /// owning its own (see [`crate::arena::ArenaPair`]).
        const TEMPORARY = 1 << 1;
    }
}

bitflags! {
    /// Find/insert/move direction and hint bits, forwarded across the wire
    /// in an operation's `flags` field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OperationFlags: u32 {
        /// Exact match only.
        const EXACT = 0;
        /// Less-than-or-equal match.
        const LEQ = 1 << 0;
        /// Greater-than-or-equal match.
        const GEQ = 1 << 1;
        /// Strictly less-than match.
        const LT = 1 << 2;
        /// Strictly greater-than match.
        const GT = 1 << 3;
        /// Cursor: move to the first key.
        const FIRST = 1 << 4;
        /// Cursor: move to the last key.
        const LAST = 1 << 5;
        /// Cursor: move to the next key.
        const NEXT = 1 << 6;
        /// Cursor: move to the previous key.
        const PREVIOUS = 1 << 7;
        /// Advisory: probe the statistics engine's cached leaf first.
        const HINT_APPEND = 1 << 8;
        /// Advisory: the next insert is expected to land at the left-most slot.
        const HINT_PREPEND = 1 << 9;
        /// Overwrite an existing key on insert instead of failing.
        const OVERWRITE = 1 << 10;
        /// Transaction begun read-only.
        const TXN_READ_ONLY = 1 << 11;
        /// Transaction begun temporary (shares parent arenas).
        const TXN_TEMPORARY = 1 << 12;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_flags_preserve_wire_bit_values() {
        assert_eq!(KeyFlags::USER_ALLOC.bits(), hamlink_proto::key_flag_bits::USER_ALLOC);
        assert_eq!(KeyFlags::RECORD_NUMBER.bits(), hamlink_proto::key_flag_bits::RECORD_NUMBER);
    }

    #[test]
    fn approx_match_bits_are_mutually_exclusive_by_convention() {
        let relation = ApproxMatch::LT;
        assert!(!relation.contains(ApproxMatch::GT));
        assert!(!relation.contains(ApproxMatch::EQ));
    }
}
