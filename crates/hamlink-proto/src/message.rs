//! The message catalog: one Rust type per logical request/reply, shared by
//! both encodings.
//!
//! Each message type derives `Serialize`/`Deserialize` for the schema
//! (CBOR) encoding and implements [`FixedCodec`] by hand for the fixed
//! encoding. The [`wire_message!`] macro emits both from one field list so
//! the two encodings can never drift out of sync on a message's shape.
//!
//! Every reply carries a `status: i32` field first (spec §4.6: "All
//! operations return a numeric status. A zero status means success;
//! non-zero is an error code"). Out-parameters are meaningful only when
//! `status == 0`; a non-zero status leaves the remaining fields at their
//! default value and the client must not interpret them.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::fixed::{Cursor, FixedCodec};
use crate::opcode::Opcode;

/// Key flags as carried in [`WireKey::flags`] (request side) — see
/// `hamlink_core::flags::KeyFlags` for the typed bitset callers build these
/// from.
pub mod key_flag_bits {
    /// Caller owns the key buffer; the client must not reallocate it.
    pub const USER_ALLOC: u32 = 1 << 0;
    /// Database assigns key bytes on insert.
    pub const RECORD_NUMBER: u32 = 1 << 1;
}

/// Approximate-match relation bits carried in [`WireKey::intflags`] on reply.
pub mod approx_match_bits {
    /// Returned key is less than the requested key.
    pub const LT: u32 = 1 << 0;
    /// Returned key is greater than the requested key.
    pub const GT: u32 = 1 << 1;
    /// Returned key is equal to the requested key.
    pub const EQ: u32 = 1 << 2;
}

/// A key as carried on the wire: optional data, its declared size, request
/// flags, and (reply-side only) the approximate-match relation bits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireKey {
    /// Key bytes, present iff `size > 0` was requested or the reply carries
    /// one (see spec `has_key` semantics).
    pub data: Option<Vec<u8>>,
    /// Declared key size.
    pub size: u16,
    /// Request-side flags (`USER_ALLOC`, `RECORD_NUMBER`).
    pub flags: u32,
    /// Reply-side approximate-match bits (`LT`/`GT`/`EQ`).
    pub intflags: u32,
}

/// A record as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireRecord {
    /// Record bytes, present iff the request/reply carries one.
    pub data: Option<Vec<u8>>,
    /// Declared record size.
    pub size: u32,
    /// Request-side flags (`USER_ALLOC`, `PARTIAL`).
    pub flags: u32,
    /// Offset of the partial write/read, valid iff `PARTIAL` is set.
    pub partial_offset: u32,
    /// Length of the partial write/read, valid iff `PARTIAL` is set.
    pub partial_size: u32,
}

/// One environment/database parameter, by numeric name.
///
/// `env_get_parameters`/`db_get_parameters` are sparse: only parameters the
/// caller asked for by name are guaranteed present in the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter id (see `hamlink_core::params::ParamName`).
    pub name: u16,
    /// Parameter value. Integer-valued for all recognized parameters except
    /// `filename`, which is carried separately as `string_value`.
    pub value: u64,
    /// String payload, populated only for string-valued parameters
    /// (`filename`, `dbname`'s display form).
    pub string_value: Option<String>,
}

impl FixedCodec for WireKey {
    fn fixed_size(&self) -> u32 {
        self.data.fixed_size() + self.size.fixed_size() + self.flags.fixed_size() + self.intflags.fixed_size()
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        self.data.write_fixed(buf);
        self.size.write_fixed(buf);
        self.flags.write_fixed(buf);
        self.intflags.write_fixed(buf);
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            data: FixedCodec::read_fixed(cur)?,
            size: FixedCodec::read_fixed(cur)?,
            flags: FixedCodec::read_fixed(cur)?,
            intflags: FixedCodec::read_fixed(cur)?,
        })
    }
}

impl FixedCodec for WireRecord {
    fn fixed_size(&self) -> u32 {
        self.data.fixed_size()
            + self.size.fixed_size()
            + self.flags.fixed_size()
            + self.partial_offset.fixed_size()
            + self.partial_size.fixed_size()
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        self.data.write_fixed(buf);
        self.size.write_fixed(buf);
        self.flags.write_fixed(buf);
        self.partial_offset.write_fixed(buf);
        self.partial_size.write_fixed(buf);
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            data: FixedCodec::read_fixed(cur)?,
            size: FixedCodec::read_fixed(cur)?,
            flags: FixedCodec::read_fixed(cur)?,
            partial_offset: FixedCodec::read_fixed(cur)?,
            partial_size: FixedCodec::read_fixed(cur)?,
        })
    }
}

impl FixedCodec for Param {
    fn fixed_size(&self) -> u32 {
        self.name.fixed_size() + self.value.fixed_size() + self.string_value.fixed_size()
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) {
        self.name.write_fixed(buf);
        self.value.write_fixed(buf);
        self.string_value.write_fixed(buf);
    }

    fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            name: FixedCodec::read_fixed(cur)?,
            value: FixedCodec::read_fixed(cur)?,
            string_value: FixedCodec::read_fixed(cur)?,
        })
    }
}

/// Define a message struct that derives the schema encoding and implements
/// [`FixedCodec`] (the fixed encoding) field-by-field, in declared order.
macro_rules! wire_message {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $ty,)*
        }

        impl FixedCodec for $name {
            fn fixed_size(&self) -> u32 {
                0 $(+ self.$field.fixed_size())*
            }

            fn write_fixed(&self, buf: &mut Vec<u8>) {
                $(self.$field.write_fixed(buf);)*
            }

            fn read_fixed(cur: &mut Cursor<'_>) -> Result<Self> {
                Ok(Self {
                    $($field: FixedCodec::read_fixed(cur)?,)*
                })
            }
        }
    };
}

wire_message!(
    /// `connect(path)` request.
    ConnectRequest { path: String }
);
wire_message!(
    /// `connect` reply: the new environment handle and its flags.
    ConnectReply { status: i32, env_handle: u64, env_flags: u32 }
);
wire_message!(DisconnectRequest { env_handle: u64 });
wire_message!(DisconnectReply { status: i32 });
wire_message!(EnvRenameRequest { env_handle: u64, old_dbname: u16, new_dbname: u16, flags: u32 });
wire_message!(EnvRenameReply { status: i32 });
wire_message!(EnvGetParametersRequest { env_handle: u64, names: Vec<u16> });
wire_message!(EnvGetParametersReply { status: i32, params: Vec<Param> });
wire_message!(EnvGetDatabaseNamesRequest { env_handle: u64 });
wire_message!(EnvGetDatabaseNamesReply { status: i32, names: Vec<u16> });
wire_message!(EnvFlushRequest { env_handle: u64, flags: u32 });
wire_message!(EnvFlushReply { status: i32 });
wire_message!(EnvCreateDbRequest { env_handle: u64, dbname: u16, flags: u32, params: Vec<Param> });
wire_message!(EnvCreateDbReply { status: i32, db_handle: u64, db_flags: u32 });
wire_message!(EnvOpenDbRequest { env_handle: u64, dbname: u16, flags: u32, params: Vec<Param> });
wire_message!(EnvOpenDbReply { status: i32, db_handle: u64, db_flags: u32 });
wire_message!(EnvEraseDbRequest { env_handle: u64, dbname: u16, flags: u32 });
wire_message!(EnvEraseDbReply { status: i32 });
wire_message!(DbCloseRequest { db_handle: u64, flags: u32 });
wire_message!(DbCloseReply { status: i32 });
wire_message!(DbGetParametersRequest { db_handle: u64, names: Vec<u16> });
wire_message!(DbGetParametersReply { status: i32, params: Vec<Param> });
wire_message!(
    /// `txn_begin` request. Supported flags: `TXN_READ_ONLY`, `TXN_TEMPORARY`.
    TxnBeginRequest { env_handle: u64, name: Option<String>, flags: u32 }
);
wire_message!(TxnBeginReply { status: i32, txn_handle: u64 });
wire_message!(TxnCommitRequest { txn_handle: u64, flags: u32 });
wire_message!(TxnCommitReply { status: i32 });
wire_message!(TxnAbortRequest { txn_handle: u64, flags: u32 });
wire_message!(TxnAbortReply { status: i32 });
wire_message!(DbCheckIntegrityRequest { db_handle: u64, txn_handle: u64, flags: u32 });
wire_message!(DbCheckIntegrityReply { status: i32 });
wire_message!(DbGetKeyCountRequest { db_handle: u64, txn_handle: u64, flags: u32 });
wire_message!(DbGetKeyCountReply { status: i32, count: u64 });
wire_message!(
    /// Record-number rule: if the database's `RECORD_NUMBER` flag is set,
    /// `key.data` MUST be omitted here and is assigned by the reply.
    DbInsertRequest { db_handle: u64, txn_handle: u64, key: WireKey, record: WireRecord, flags: u32 }
);
wire_message!(
    /// For record-number databases, `key.data` carries the assigned 8-byte
    /// key; otherwise absent.
    DbInsertReply { status: i32, key: WireKey }
);
wire_message!(DbEraseRequest { db_handle: u64, txn_handle: u64, key: WireKey, flags: u32 });
wire_message!(DbEraseReply { status: i32 });
wire_message!(
    /// Flags select exact / less-or-equal / greater-or-equal / less / greater.
    DbFindRequest { db_handle: u64, txn_handle: u64, key: WireKey, record: WireRecord, flags: u32 }
);
wire_message!(
    /// `key.intflags` carries the approximate-match relation on success.
    DbFindReply { status: i32, key: WireKey, record: WireRecord }
);
wire_message!(CursorCreateRequest { db_handle: u64, txn_handle: u64, flags: u32 });
wire_message!(CursorCreateReply { status: i32, cursor_handle: u64 });
wire_message!(CursorCloneRequest { cursor_handle: u64 });
wire_message!(CursorCloneReply { status: i32, cursor_handle: u64 });
wire_message!(CursorCloseRequest { cursor_handle: u64 });
wire_message!(CursorCloseReply { status: i32 });
wire_message!(
    /// Same record-number rule as [`DbInsertRequest`].
    CursorInsertRequest { cursor_handle: u64, key: WireKey, record: WireRecord, flags: u32 }
);
wire_message!(CursorInsertReply { status: i32, key: WireKey });
wire_message!(CursorEraseRequest { cursor_handle: u64, flags: u32 });
wire_message!(CursorEraseReply { status: i32 });
wire_message!(CursorFindRequest { cursor_handle: u64, key: WireKey, record: WireRecord, flags: u32 });
wire_message!(CursorFindReply { status: i32, key: WireKey, record: WireRecord });
wire_message!(CursorGetRecordCountRequest { cursor_handle: u64, flags: u32 });
wire_message!(CursorGetRecordCountReply { status: i32, count: u32 });
wire_message!(CursorOverwriteRequest { cursor_handle: u64, record: WireRecord, flags: u32 });
wire_message!(CursorOverwriteReply { status: i32 });
wire_message!(
    /// Flags select FIRST/LAST/NEXT/PREVIOUS/current.
    CursorMoveRequest { cursor_handle: u64, key: WireKey, record: WireRecord, flags: u32 }
);
wire_message!(CursorMoveReply { status: i32, key: WireKey, record: WireRecord });

/// The full message catalog as a single tagged enum.
///
/// Schema encoding relies on serde's external tagging of this enum
/// directly; fixed encoding dispatches on [`Opcode`] by hand in
/// [`Message::opcode`]/[`Message::encode_fixed`]/[`Message::decode_fixed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    ConnectRequest(ConnectRequest),
    ConnectReply(ConnectReply),
    DisconnectRequest(DisconnectRequest),
    DisconnectReply(DisconnectReply),
    EnvRenameRequest(EnvRenameRequest),
    EnvRenameReply(EnvRenameReply),
    EnvGetParametersRequest(EnvGetParametersRequest),
    EnvGetParametersReply(EnvGetParametersReply),
    EnvGetDatabaseNamesRequest(EnvGetDatabaseNamesRequest),
    EnvGetDatabaseNamesReply(EnvGetDatabaseNamesReply),
    EnvFlushRequest(EnvFlushRequest),
    EnvFlushReply(EnvFlushReply),
    EnvCreateDbRequest(EnvCreateDbRequest),
    EnvCreateDbReply(EnvCreateDbReply),
    EnvOpenDbRequest(EnvOpenDbRequest),
    EnvOpenDbReply(EnvOpenDbReply),
    EnvEraseDbRequest(EnvEraseDbRequest),
    EnvEraseDbReply(EnvEraseDbReply),
    DbCloseRequest(DbCloseRequest),
    DbCloseReply(DbCloseReply),
    DbGetParametersRequest(DbGetParametersRequest),
    DbGetParametersReply(DbGetParametersReply),
    TxnBeginRequest(TxnBeginRequest),
    TxnBeginReply(TxnBeginReply),
    TxnCommitRequest(TxnCommitRequest),
    TxnCommitReply(TxnCommitReply),
    TxnAbortRequest(TxnAbortRequest),
    TxnAbortReply(TxnAbortReply),
    DbCheckIntegrityRequest(DbCheckIntegrityRequest),
    DbCheckIntegrityReply(DbCheckIntegrityReply),
    DbGetKeyCountRequest(DbGetKeyCountRequest),
    DbGetKeyCountReply(DbGetKeyCountReply),
    DbInsertRequest(DbInsertRequest),
    DbInsertReply(DbInsertReply),
    DbEraseRequest(DbEraseRequest),
    DbEraseReply(DbEraseReply),
    DbFindRequest(DbFindRequest),
    DbFindReply(DbFindReply),
    CursorCreateRequest(CursorCreateRequest),
    CursorCreateReply(CursorCreateReply),
    CursorCloneRequest(CursorCloneRequest),
    CursorCloneReply(CursorCloneReply),
    CursorCloseRequest(CursorCloseRequest),
    CursorCloseReply(CursorCloseReply),
    CursorInsertRequest(CursorInsertRequest),
    CursorInsertReply(CursorInsertReply),
    CursorEraseRequest(CursorEraseRequest),
    CursorEraseReply(CursorEraseReply),
    CursorFindRequest(CursorFindRequest),
    CursorFindReply(CursorFindReply),
    CursorGetRecordCountRequest(CursorGetRecordCountRequest),
    CursorGetRecordCountReply(CursorGetRecordCountReply),
    CursorOverwriteRequest(CursorOverwriteRequest),
    CursorOverwriteReply(CursorOverwriteReply),
    CursorMoveRequest(CursorMoveRequest),
    CursorMoveReply(CursorMoveReply),
}

/// Dispatch a `Message` body across all 56 catalog members.
///
/// `$self` binds the scrutinee, `$body` names the inner value at each arm,
/// and `$action` is the expression to evaluate (typically producing an
/// `Opcode` or writing fixed bytes).
macro_rules! for_each_message {
    ($self:expr, |$body:ident| $action:expr) => {
        match $self {
            Message::ConnectRequest($body) => $action,
            Message::ConnectReply($body) => $action,
            Message::DisconnectRequest($body) => $action,
            Message::DisconnectReply($body) => $action,
            Message::EnvRenameRequest($body) => $action,
            Message::EnvRenameReply($body) => $action,
            Message::EnvGetParametersRequest($body) => $action,
            Message::EnvGetParametersReply($body) => $action,
            Message::EnvGetDatabaseNamesRequest($body) => $action,
            Message::EnvGetDatabaseNamesReply($body) => $action,
            Message::EnvFlushRequest($body) => $action,
            Message::EnvFlushReply($body) => $action,
            Message::EnvCreateDbRequest($body) => $action,
            Message::EnvCreateDbReply($body) => $action,
            Message::EnvOpenDbRequest($body) => $action,
            Message::EnvOpenDbReply($body) => $action,
            Message::EnvEraseDbRequest($body) => $action,
            Message::EnvEraseDbReply($body) => $action,
            Message::DbCloseRequest($body) => $action,
            Message::DbCloseReply($body) => $action,
            Message::DbGetParametersRequest($body) => $action,
            Message::DbGetParametersReply($body) => $action,
            Message::TxnBeginRequest($body) => $action,
            Message::TxnBeginReply($body) => $action,
            Message::TxnCommitRequest($body) => $action,
            Message::TxnCommitReply($body) => $action,
            Message::TxnAbortRequest($body) => $action,
            Message::TxnAbortReply($body) => $action,
            Message::DbCheckIntegrityRequest($body) => $action,
            Message::DbCheckIntegrityReply($body) => $action,
            Message::DbGetKeyCountRequest($body) => $action,
            Message::DbGetKeyCountReply($body) => $action,
            Message::DbInsertRequest($body) => $action,
            Message::DbInsertReply($body) => $action,
            Message::DbEraseRequest($body) => $action,
            Message::DbEraseReply($body) => $action,
            Message::DbFindRequest($body) => $action,
            Message::DbFindReply($body) => $action,
            Message::CursorCreateRequest($body) => $action,
            Message::CursorCreateReply($body) => $action,
            Message::CursorCloneRequest($body) => $action,
            Message::CursorCloneReply($body) => $action,
            Message::CursorCloseRequest($body) => $action,
            Message::CursorCloseReply($body) => $action,
            Message::CursorInsertRequest($body) => $action,
            Message::CursorInsertReply($body) => $action,
            Message::CursorEraseRequest($body) => $action,
            Message::CursorEraseReply($body) => $action,
            Message::CursorFindRequest($body) => $action,
            Message::CursorFindReply($body) => $action,
            Message::CursorGetRecordCountRequest($body) => $action,
            Message::CursorGetRecordCountReply($body) => $action,
            Message::CursorOverwriteRequest($body) => $action,
            Message::CursorOverwriteReply($body) => $action,
            Message::CursorMoveRequest($body) => $action,
            Message::CursorMoveReply($body) => $action,
        }
    };
}

impl Message {
    /// Encode the body with the fixed (4-byte-aligned) encoding.
    #[must_use]
    pub fn encode_fixed(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for_each_message!(self, |body| body.write_fixed(&mut buf));
        buf
    }

    /// Decode a body for a known opcode using the fixed encoding.
    pub fn decode_fixed(opcode: Opcode, bytes: &[u8]) -> Result<Self> {
        let mut cur = Cursor::new(bytes);
        decode_fixed_body(opcode, &mut cur)
    }

    /// The discriminator this message carries on the wire.
    ///
    /// Each arm needs a distinct constant, so this is a direct match rather
    /// than a [`for_each_message!`] dispatch.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Message::ConnectRequest(_) => Opcode::ConnectRequest,
            Message::ConnectReply(_) => Opcode::ConnectReply,
            Message::DisconnectRequest(_) => Opcode::DisconnectRequest,
            Message::DisconnectReply(_) => Opcode::DisconnectReply,
            Message::EnvRenameRequest(_) => Opcode::EnvRenameRequest,
            Message::EnvRenameReply(_) => Opcode::EnvRenameReply,
            Message::EnvGetParametersRequest(_) => Opcode::EnvGetParametersRequest,
            Message::EnvGetParametersReply(_) => Opcode::EnvGetParametersReply,
            Message::EnvGetDatabaseNamesRequest(_) => Opcode::EnvGetDatabaseNamesRequest,
            Message::EnvGetDatabaseNamesReply(_) => Opcode::EnvGetDatabaseNamesReply,
            Message::EnvFlushRequest(_) => Opcode::EnvFlushRequest,
            Message::EnvFlushReply(_) => Opcode::EnvFlushReply,
            Message::EnvCreateDbRequest(_) => Opcode::EnvCreateDbRequest,
            Message::EnvCreateDbReply(_) => Opcode::EnvCreateDbReply,
            Message::EnvOpenDbRequest(_) => Opcode::EnvOpenDbRequest,
            Message::EnvOpenDbReply(_) => Opcode::EnvOpenDbReply,
            Message::EnvEraseDbRequest(_) => Opcode::EnvEraseDbRequest,
            Message::EnvEraseDbReply(_) => Opcode::EnvEraseDbReply,
            Message::DbCloseRequest(_) => Opcode::DbCloseRequest,
            Message::DbCloseReply(_) => Opcode::DbCloseReply,
            Message::DbGetParametersRequest(_) => Opcode::DbGetParametersRequest,
            Message::DbGetParametersReply(_) => Opcode::DbGetParametersReply,
            Message::TxnBeginRequest(_) => Opcode::TxnBeginRequest,
            Message::TxnBeginReply(_) => Opcode::TxnBeginReply,
            Message::TxnCommitRequest(_) => Opcode::TxnCommitRequest,
            Message::TxnCommitReply(_) => Opcode::TxnCommitReply,
            Message::TxnAbortRequest(_) => Opcode::TxnAbortRequest,
            Message::TxnAbortReply(_) => Opcode::TxnAbortReply,
            Message::DbCheckIntegrityRequest(_) => Opcode::DbCheckIntegrityRequest,
            Message::DbCheckIntegrityReply(_) => Opcode::DbCheckIntegrityReply,
            Message::DbGetKeyCountRequest(_) => Opcode::DbGetKeyCountRequest,
            Message::DbGetKeyCountReply(_) => Opcode::DbGetKeyCountReply,
            Message::DbInsertRequest(_) => Opcode::DbInsertRequest,
            Message::DbInsertReply(_) => Opcode::DbInsertReply,
            Message::DbEraseRequest(_) => Opcode::DbEraseRequest,
            Message::DbEraseReply(_) => Opcode::DbEraseReply,
            Message::DbFindRequest(_) => Opcode::DbFindRequest,
            Message::DbFindReply(_) => Opcode::DbFindReply,
            Message::CursorCreateRequest(_) => Opcode::CursorCreateRequest,
            Message::CursorCreateReply(_) => Opcode::CursorCreateReply,
            Message::CursorCloneRequest(_) => Opcode::CursorCloneRequest,
            Message::CursorCloneReply(_) => Opcode::CursorCloneReply,
            Message::CursorCloseRequest(_) => Opcode::CursorCloseRequest,
            Message::CursorCloseReply(_) => Opcode::CursorCloseReply,
            Message::CursorInsertRequest(_) => Opcode::CursorInsertRequest,
            Message::CursorInsertReply(_) => Opcode::CursorInsertReply,
            Message::CursorEraseRequest(_) => Opcode::CursorEraseRequest,
            Message::CursorEraseReply(_) => Opcode::CursorEraseReply,
            Message::CursorFindRequest(_) => Opcode::CursorFindRequest,
            Message::CursorFindReply(_) => Opcode::CursorFindReply,
            Message::CursorGetRecordCountRequest(_) => Opcode::CursorGetRecordCountRequest,
            Message::CursorGetRecordCountReply(_) => Opcode::CursorGetRecordCountReply,
            Message::CursorOverwriteRequest(_) => Opcode::CursorOverwriteRequest,
            Message::CursorOverwriteReply(_) => Opcode::CursorOverwriteReply,
            Message::CursorMoveRequest(_) => Opcode::CursorMoveRequest,
            Message::CursorMoveReply(_) => Opcode::CursorMoveReply,
        }
    }

    /// The `status` field of a reply message, or `None` for a request.
    ///
    /// Every reply variant carries `status` as its first field (spec
    /// §4.6); this gives callers a single place to check it without
    /// matching on every variant.
    #[must_use]
    pub fn status(&self) -> Option<i32> {
        match self {
            Message::ConnectRequest(_)
            | Message::DisconnectRequest(_)
            | Message::EnvRenameRequest(_)
            | Message::EnvGetParametersRequest(_)
            | Message::EnvGetDatabaseNamesRequest(_)
            | Message::EnvFlushRequest(_)
            | Message::EnvCreateDbRequest(_)
            | Message::EnvOpenDbRequest(_)
            | Message::EnvEraseDbRequest(_)
            | Message::DbCloseRequest(_)
            | Message::DbGetParametersRequest(_)
            | Message::TxnBeginRequest(_)
            | Message::TxnCommitRequest(_)
            | Message::TxnAbortRequest(_)
            | Message::DbCheckIntegrityRequest(_)
            | Message::DbGetKeyCountRequest(_)
            | Message::DbInsertRequest(_)
            | Message::DbEraseRequest(_)
            | Message::DbFindRequest(_)
            | Message::CursorCreateRequest(_)
            | Message::CursorCloneRequest(_)
            | Message::CursorCloseRequest(_)
            | Message::CursorInsertRequest(_)
            | Message::CursorEraseRequest(_)
            | Message::CursorFindRequest(_)
            | Message::CursorGetRecordCountRequest(_)
            | Message::CursorOverwriteRequest(_)
            | Message::CursorMoveRequest(_) => None,
            Message::ConnectReply(m) => Some(m.status),
            Message::DisconnectReply(m) => Some(m.status),
            Message::EnvRenameReply(m) => Some(m.status),
            Message::EnvGetParametersReply(m) => Some(m.status),
            Message::EnvGetDatabaseNamesReply(m) => Some(m.status),
            Message::EnvFlushReply(m) => Some(m.status),
            Message::EnvCreateDbReply(m) => Some(m.status),
            Message::EnvOpenDbReply(m) => Some(m.status),
            Message::EnvEraseDbReply(m) => Some(m.status),
            Message::DbCloseReply(m) => Some(m.status),
            Message::DbGetParametersReply(m) => Some(m.status),
            Message::TxnBeginReply(m) => Some(m.status),
            Message::TxnCommitReply(m) => Some(m.status),
            Message::TxnAbortReply(m) => Some(m.status),
            Message::DbCheckIntegrityReply(m) => Some(m.status),
            Message::DbGetKeyCountReply(m) => Some(m.status),
            Message::DbInsertReply(m) => Some(m.status),
            Message::DbEraseReply(m) => Some(m.status),
            Message::DbFindReply(m) => Some(m.status),
            Message::CursorCreateReply(m) => Some(m.status),
            Message::CursorCloneReply(m) => Some(m.status),
            Message::CursorCloseReply(m) => Some(m.status),
            Message::CursorInsertReply(m) => Some(m.status),
            Message::CursorEraseReply(m) => Some(m.status),
            Message::CursorFindReply(m) => Some(m.status),
            Message::CursorGetRecordCountReply(m) => Some(m.status),
            Message::CursorOverwriteReply(m) => Some(m.status),
            Message::CursorMoveReply(m) => Some(m.status),
        }
    }
}

fn decode_fixed_body(opcode: Opcode, cur: &mut Cursor<'_>) -> Result<Message> {
    Ok(match opcode {
        Opcode::ConnectRequest => Message::ConnectRequest(FixedCodec::read_fixed(cur)?),
        Opcode::ConnectReply => Message::ConnectReply(FixedCodec::read_fixed(cur)?),
        Opcode::DisconnectRequest => Message::DisconnectRequest(FixedCodec::read_fixed(cur)?),
        Opcode::DisconnectReply => Message::DisconnectReply(FixedCodec::read_fixed(cur)?),
        Opcode::EnvRenameRequest => Message::EnvRenameRequest(FixedCodec::read_fixed(cur)?),
        Opcode::EnvRenameReply => Message::EnvRenameReply(FixedCodec::read_fixed(cur)?),
        Opcode::EnvGetParametersRequest => Message::EnvGetParametersRequest(FixedCodec::read_fixed(cur)?),
        Opcode::EnvGetParametersReply => Message::EnvGetParametersReply(FixedCodec::read_fixed(cur)?),
        Opcode::EnvGetDatabaseNamesRequest => {
            Message::EnvGetDatabaseNamesRequest(FixedCodec::read_fixed(cur)?)
        },
        Opcode::EnvGetDatabaseNamesReply => Message::EnvGetDatabaseNamesReply(FixedCodec::read_fixed(cur)?),
        Opcode::EnvFlushRequest => Message::EnvFlushRequest(FixedCodec::read_fixed(cur)?),
        Opcode::EnvFlushReply => Message::EnvFlushReply(FixedCodec::read_fixed(cur)?),
        Opcode::EnvCreateDbRequest => Message::EnvCreateDbRequest(FixedCodec::read_fixed(cur)?),
        Opcode::EnvCreateDbReply => Message::EnvCreateDbReply(FixedCodec::read_fixed(cur)?),
        Opcode::EnvOpenDbRequest => Message::EnvOpenDbRequest(FixedCodec::read_fixed(cur)?),
        Opcode::EnvOpenDbReply => Message::EnvOpenDbReply(FixedCodec::read_fixed(cur)?),
        Opcode::EnvEraseDbRequest => Message::EnvEraseDbRequest(FixedCodec::read_fixed(cur)?),
        Opcode::EnvEraseDbReply => Message::EnvEraseDbReply(FixedCodec::read_fixed(cur)?),
        Opcode::DbCloseRequest => Message::DbCloseRequest(FixedCodec::read_fixed(cur)?),
        Opcode::DbCloseReply => Message::DbCloseReply(FixedCodec::read_fixed(cur)?),
        Opcode::DbGetParametersRequest => Message::DbGetParametersRequest(FixedCodec::read_fixed(cur)?),
        Opcode::DbGetParametersReply => Message::DbGetParametersReply(FixedCodec::read_fixed(cur)?),
        Opcode::TxnBeginRequest => Message::TxnBeginRequest(FixedCodec::read_fixed(cur)?),
        Opcode::TxnBeginReply => Message::TxnBeginReply(FixedCodec::read_fixed(cur)?),
        Opcode::TxnCommitRequest => Message::TxnCommitRequest(FixedCodec::read_fixed(cur)?),
        Opcode::TxnCommitReply => Message::TxnCommitReply(FixedCodec::read_fixed(cur)?),
        Opcode::TxnAbortRequest => Message::TxnAbortRequest(FixedCodec::read_fixed(cur)?),
        Opcode::TxnAbortReply => Message::TxnAbortReply(FixedCodec::read_fixed(cur)?),
        Opcode::DbCheckIntegrityRequest => Message::DbCheckIntegrityRequest(FixedCodec::read_fixed(cur)?),
        Opcode::DbCheckIntegrityReply => Message::DbCheckIntegrityReply(FixedCodec::read_fixed(cur)?),
        Opcode::DbGetKeyCountRequest => Message::DbGetKeyCountRequest(FixedCodec::read_fixed(cur)?),
        Opcode::DbGetKeyCountReply => Message::DbGetKeyCountReply(FixedCodec::read_fixed(cur)?),
        Opcode::DbInsertRequest => Message::DbInsertRequest(FixedCodec::read_fixed(cur)?),
        Opcode::DbInsertReply => Message::DbInsertReply(FixedCodec::read_fixed(cur)?),
        Opcode::DbEraseRequest => Message::DbEraseRequest(FixedCodec::read_fixed(cur)?),
        Opcode::DbEraseReply => Message::DbEraseReply(FixedCodec::read_fixed(cur)?),
        Opcode::DbFindRequest => Message::DbFindRequest(FixedCodec::read_fixed(cur)?),
        Opcode::DbFindReply => Message::DbFindReply(FixedCodec::read_fixed(cur)?),
        Opcode::CursorCreateRequest => Message::CursorCreateRequest(FixedCodec::read_fixed(cur)?),
        Opcode::CursorCreateReply => Message::CursorCreateReply(FixedCodec::read_fixed(cur)?),
        Opcode::CursorCloneRequest => Message::CursorCloneRequest(FixedCodec::read_fixed(cur)?),
        Opcode::CursorCloneReply => Message::CursorCloneReply(FixedCodec::read_fixed(cur)?),
        Opcode::CursorCloseRequest => Message::CursorCloseRequest(FixedCodec::read_fixed(cur)?),
        Opcode::CursorCloseReply => Message::CursorCloseReply(FixedCodec::read_fixed(cur)?),
        Opcode::CursorInsertRequest => Message::CursorInsertRequest(FixedCodec::read_fixed(cur)?),
        Opcode::CursorInsertReply => Message::CursorInsertReply(FixedCodec::read_fixed(cur)?),
        Opcode::CursorEraseRequest => Message::CursorEraseRequest(FixedCodec::read_fixed(cur)?),
        Opcode::CursorEraseReply => Message::CursorEraseReply(FixedCodec::read_fixed(cur)?),
        Opcode::CursorFindRequest => Message::CursorFindRequest(FixedCodec::read_fixed(cur)?),
        Opcode::CursorFindReply => Message::CursorFindReply(FixedCodec::read_fixed(cur)?),
        Opcode::CursorGetRecordCountRequest => {
            Message::CursorGetRecordCountRequest(FixedCodec::read_fixed(cur)?)
        },
        Opcode::CursorGetRecordCountReply => {
            Message::CursorGetRecordCountReply(FixedCodec::read_fixed(cur)?)
        },
        Opcode::CursorOverwriteRequest => Message::CursorOverwriteRequest(FixedCodec::read_fixed(cur)?),
        // NOTE: the original implementation's fixed-encoding deserializer for
        // this reply mistakenly re-invoked the serializer on the inner
        // field, which never round-tripped correctly. This reads the reply
        // body the same way every other reply does.
        Opcode::CursorOverwriteReply => Message::CursorOverwriteReply(FixedCodec::read_fixed(cur)?),
        Opcode::CursorMoveRequest => Message::CursorMoveRequest(FixedCodec::read_fixed(cur)?),
        Opcode::CursorMoveReply => Message::CursorMoveReply(FixedCodec::read_fixed(cur)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::ConnectRequest(ConnectRequest { path: "local.db".to_string() }),
            Message::ConnectReply(ConnectReply { status: 0, env_handle: 1, env_flags: 0 }),
            Message::DbInsertRequest(DbInsertRequest {
                db_handle: 2,
                txn_handle: 0,
                key: WireKey { data: Some(vec![1, 2, 3]), size: 3, flags: 0, intflags: 0 },
                record: WireRecord {
                    data: Some(vec![9, 9]),
                    size: 2,
                    flags: 0,
                    partial_offset: 0,
                    partial_size: 0,
                },
                flags: 0,
            }),
            Message::EnvGetParametersReply(EnvGetParametersReply {
                status: 0,
                params: vec![
                    Param { name: 1, value: 4096, string_value: None },
                    Param { name: 2, value: 0, string_value: Some("local.db".to_string()) },
                ],
            }),
            Message::CursorMoveReply(CursorMoveReply {
                status: 0,
                key: WireKey { data: None, size: 0, flags: 0, intflags: approx_match_bits::EQ },
                record: WireRecord::default(),
            }),
            Message::DbFindReply(DbFindReply {
                status: -9,
                key: WireKey::default(),
                record: WireRecord::default(),
            }),
        ]
    }

    #[test]
    fn schema_round_trip() {
        for message in sample_messages() {
            let mut encoded = Vec::new();
            ciborium::into_writer(&message, &mut encoded).expect("schema encode");
            let decoded: Message = ciborium::from_reader(encoded.as_slice()).expect("schema decode");
            assert_eq!(message, decoded);
        }
    }

    #[test]
    fn fixed_round_trip_matches_size_function() {
        for message in sample_messages() {
            let opcode = message.opcode();
            let encoded = message.encode_fixed();
            let size_fn_result = for_each_message!(&message, |body| body.fixed_size());
            assert_eq!(encoded.len() as u32, size_fn_result);

            let decoded = Message::decode_fixed(opcode, &encoded).expect("fixed decode");
            assert_eq!(message, decoded);
        }
    }

    #[test]
    fn opcode_round_trips_through_wire_id() {
        for message in sample_messages() {
            let id = message.opcode().to_u32();
            assert_eq!(Opcode::from_u32(id).unwrap(), message.opcode());
        }
    }

    #[test]
    fn status_is_none_for_requests_and_some_for_replies() {
        assert_eq!(Message::ConnectRequest(ConnectRequest { path: String::new() }).status(), None);
        assert_eq!(Message::ConnectReply(ConnectReply { status: 0, env_handle: 1, env_flags: 0 }).status(), Some(0));
        assert_eq!(
            Message::DbFindReply(DbFindReply { status: -9, key: WireKey::default(), record: WireRecord::default() })
                .status(),
            Some(-9)
        );
    }
}
