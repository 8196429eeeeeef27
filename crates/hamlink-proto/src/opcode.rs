//! The closed message catalog.
//!
//! One discriminator id per request and per reply, in the same order the
//! original wire protocol enumerated them. Both codecs share this id space:
//! the schema encoding tags the outer enum variant by name, the fixed
//! encoding carries the numeric id in its `message_id` wrapper field.

use crate::errors::ProtocolError;

/// Discriminator id for one member of the message catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Opcode {
    ConnectRequest = 1,
    ConnectReply = 2,
    DisconnectRequest = 3,
    DisconnectReply = 4,
    EnvRenameRequest = 5,
    EnvRenameReply = 6,
    EnvGetParametersRequest = 7,
    EnvGetParametersReply = 8,
    EnvGetDatabaseNamesRequest = 9,
    EnvGetDatabaseNamesReply = 10,
    EnvFlushRequest = 11,
    EnvFlushReply = 12,
    EnvCreateDbRequest = 13,
    EnvCreateDbReply = 14,
    EnvOpenDbRequest = 15,
    EnvOpenDbReply = 16,
    EnvEraseDbRequest = 17,
    EnvEraseDbReply = 18,
    DbCloseRequest = 19,
    DbCloseReply = 20,
    DbGetParametersRequest = 21,
    DbGetParametersReply = 22,
    TxnBeginRequest = 23,
    TxnBeginReply = 24,
    TxnCommitRequest = 25,
    TxnCommitReply = 26,
    TxnAbortRequest = 27,
    TxnAbortReply = 28,
    DbCheckIntegrityRequest = 29,
    DbCheckIntegrityReply = 30,
    DbGetKeyCountRequest = 31,
    DbGetKeyCountReply = 32,
    DbInsertRequest = 33,
    DbInsertReply = 34,
    DbEraseRequest = 35,
    DbEraseReply = 36,
    DbFindRequest = 37,
    DbFindReply = 38,
    CursorCreateRequest = 39,
    CursorCreateReply = 40,
    CursorCloneRequest = 41,
    CursorCloneReply = 42,
    CursorCloseRequest = 43,
    CursorCloseReply = 44,
    CursorInsertRequest = 45,
    CursorInsertReply = 46,
    CursorEraseRequest = 47,
    CursorEraseReply = 48,
    CursorFindRequest = 49,
    CursorFindReply = 50,
    CursorGetRecordCountRequest = 51,
    CursorGetRecordCountReply = 52,
    CursorOverwriteRequest = 53,
    CursorOverwriteReply = 54,
    CursorMoveRequest = 55,
    CursorMoveReply = 56,
}

impl Opcode {
    /// Numeric discriminator as carried on the wire.
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Name of this catalog member, for diagnostics
    /// (e.g. [`crate::errors::ProtocolError::UnexpectedReply`]).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ConnectRequest => "ConnectRequest",
            Self::ConnectReply => "ConnectReply",
            Self::DisconnectRequest => "DisconnectRequest",
            Self::DisconnectReply => "DisconnectReply",
            Self::EnvRenameRequest => "EnvRenameRequest",
            Self::EnvRenameReply => "EnvRenameReply",
            Self::EnvGetParametersRequest => "EnvGetParametersRequest",
            Self::EnvGetParametersReply => "EnvGetParametersReply",
            Self::EnvGetDatabaseNamesRequest => "EnvGetDatabaseNamesRequest",
            Self::EnvGetDatabaseNamesReply => "EnvGetDatabaseNamesReply",
            Self::EnvFlushRequest => "EnvFlushRequest",
            Self::EnvFlushReply => "EnvFlushReply",
            Self::EnvCreateDbRequest => "EnvCreateDbRequest",
            Self::EnvCreateDbReply => "EnvCreateDbReply",
            Self::EnvOpenDbRequest => "EnvOpenDbRequest",
            Self::EnvOpenDbReply => "EnvOpenDbReply",
            Self::EnvEraseDbRequest => "EnvEraseDbRequest",
            Self::EnvEraseDbReply => "EnvEraseDbReply",
            Self::DbCloseRequest => "DbCloseRequest",
            Self::DbCloseReply => "DbCloseReply",
            Self::DbGetParametersRequest => "DbGetParametersRequest",
            Self::DbGetParametersReply => "DbGetParametersReply",
            Self::TxnBeginRequest => "TxnBeginRequest",
            Self::TxnBeginReply => "TxnBeginReply",
            Self::TxnCommitRequest => "TxnCommitRequest",
            Self::TxnCommitReply => "TxnCommitReply",
            Self::TxnAbortRequest => "TxnAbortRequest",
            Self::TxnAbortReply => "TxnAbortReply",
            Self::DbCheckIntegrityRequest => "DbCheckIntegrityRequest",
            Self::DbCheckIntegrityReply => "DbCheckIntegrityReply",
            Self::DbGetKeyCountRequest => "DbGetKeyCountRequest",
            Self::DbGetKeyCountReply => "DbGetKeyCountReply",
            Self::DbInsertRequest => "DbInsertRequest",
            Self::DbInsertReply => "DbInsertReply",
            Self::DbEraseRequest => "DbEraseRequest",
            Self::DbEraseReply => "DbEraseReply",
            Self::DbFindRequest => "DbFindRequest",
            Self::DbFindReply => "DbFindReply",
            Self::CursorCreateRequest => "CursorCreateRequest",
            Self::CursorCreateReply => "CursorCreateReply",
            Self::CursorCloneRequest => "CursorCloneRequest",
            Self::CursorCloneReply => "CursorCloneReply",
            Self::CursorCloseRequest => "CursorCloseRequest",
            Self::CursorCloseReply => "CursorCloseReply",
            Self::CursorInsertRequest => "CursorInsertRequest",
            Self::CursorInsertReply => "CursorInsertReply",
            Self::CursorEraseRequest => "CursorEraseRequest",
            Self::CursorEraseReply => "CursorEraseReply",
            Self::CursorFindRequest => "CursorFindRequest",
            Self::CursorFindReply => "CursorFindReply",
            Self::CursorGetRecordCountRequest => "CursorGetRecordCountRequest",
            Self::CursorGetRecordCountReply => "CursorGetRecordCountReply",
            Self::CursorOverwriteRequest => "CursorOverwriteRequest",
            Self::CursorOverwriteReply => "CursorOverwriteReply",
            Self::CursorMoveRequest => "CursorMoveRequest",
            Self::CursorMoveReply => "CursorMoveReply",
        }
    }

    /// The reply opcode matching this request opcode.
    ///
    /// # Panics
    /// Panics if called on a reply opcode.
    #[must_use]
    pub fn reply_opcode(self) -> Self {
        match self {
            Self::ConnectRequest => Self::ConnectReply,
            Self::DisconnectRequest => Self::DisconnectReply,
            Self::EnvRenameRequest => Self::EnvRenameReply,
            Self::EnvGetParametersRequest => Self::EnvGetParametersReply,
            Self::EnvGetDatabaseNamesRequest => Self::EnvGetDatabaseNamesReply,
            Self::EnvFlushRequest => Self::EnvFlushReply,
            Self::EnvCreateDbRequest => Self::EnvCreateDbReply,
            Self::EnvOpenDbRequest => Self::EnvOpenDbReply,
            Self::EnvEraseDbRequest => Self::EnvEraseDbReply,
            Self::DbCloseRequest => Self::DbCloseReply,
            Self::DbGetParametersRequest => Self::DbGetParametersReply,
            Self::TxnBeginRequest => Self::TxnBeginReply,
            Self::TxnCommitRequest => Self::TxnCommitReply,
            Self::TxnAbortRequest => Self::TxnAbortReply,
            Self::DbCheckIntegrityRequest => Self::DbCheckIntegrityReply,
            Self::DbGetKeyCountRequest => Self::DbGetKeyCountReply,
            Self::DbInsertRequest => Self::DbInsertReply,
            Self::DbEraseRequest => Self::DbEraseReply,
            Self::DbFindRequest => Self::DbFindReply,
            Self::CursorCreateRequest => Self::CursorCreateReply,
            Self::CursorCloneRequest => Self::CursorCloneReply,
            Self::CursorCloseRequest => Self::CursorCloseReply,
            Self::CursorInsertRequest => Self::CursorInsertReply,
            Self::CursorEraseRequest => Self::CursorEraseReply,
            Self::CursorFindRequest => Self::CursorFindReply,
            Self::CursorGetRecordCountRequest => Self::CursorGetRecordCountReply,
            Self::CursorOverwriteRequest => Self::CursorOverwriteReply,
            Self::CursorMoveRequest => Self::CursorMoveReply,
            reply => panic!("reply_opcode called on a reply opcode: {reply:?}"),
        }
    }

    /// Look up the catalog member for a wire discriminator.
    pub fn from_u32(value: u32) -> Result<Self, ProtocolError> {
        Ok(match value {
            1 => Self::ConnectRequest,
            2 => Self::ConnectReply,
            3 => Self::DisconnectRequest,
            4 => Self::DisconnectReply,
            5 => Self::EnvRenameRequest,
            6 => Self::EnvRenameReply,
            7 => Self::EnvGetParametersRequest,
            8 => Self::EnvGetParametersReply,
            9 => Self::EnvGetDatabaseNamesRequest,
            10 => Self::EnvGetDatabaseNamesReply,
            11 => Self::EnvFlushRequest,
            12 => Self::EnvFlushReply,
            13 => Self::EnvCreateDbRequest,
            14 => Self::EnvCreateDbReply,
            15 => Self::EnvOpenDbRequest,
            16 => Self::EnvOpenDbReply,
            17 => Self::EnvEraseDbRequest,
            18 => Self::EnvEraseDbReply,
            19 => Self::DbCloseRequest,
            20 => Self::DbCloseReply,
            21 => Self::DbGetParametersRequest,
            22 => Self::DbGetParametersReply,
            23 => Self::TxnBeginRequest,
            24 => Self::TxnBeginReply,
            25 => Self::TxnCommitRequest,
            26 => Self::TxnCommitReply,
            27 => Self::TxnAbortRequest,
            28 => Self::TxnAbortReply,
            29 => Self::DbCheckIntegrityRequest,
            30 => Self::DbCheckIntegrityReply,
            31 => Self::DbGetKeyCountRequest,
            32 => Self::DbGetKeyCountReply,
            33 => Self::DbInsertRequest,
            34 => Self::DbInsertReply,
            35 => Self::DbEraseRequest,
            36 => Self::DbEraseReply,
            37 => Self::DbFindRequest,
            38 => Self::DbFindReply,
            39 => Self::CursorCreateRequest,
            40 => Self::CursorCreateReply,
            41 => Self::CursorCloneRequest,
            42 => Self::CursorCloneReply,
            43 => Self::CursorCloseRequest,
            44 => Self::CursorCloseReply,
            45 => Self::CursorInsertRequest,
            46 => Self::CursorInsertReply,
            47 => Self::CursorEraseRequest,
            48 => Self::CursorEraseReply,
            49 => Self::CursorFindRequest,
            50 => Self::CursorFindReply,
            51 => Self::CursorGetRecordCountRequest,
            52 => Self::CursorGetRecordCountReply,
            53 => Self::CursorOverwriteRequest,
            54 => Self::CursorOverwriteReply,
            55 => Self::CursorMoveRequest,
            56 => Self::CursorMoveReply,
            other => return Err(ProtocolError::UnknownDiscriminator(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_known_id() {
        for id in 1..=56u32 {
            let opcode = Opcode::from_u32(id).expect("id is in range");
            assert_eq!(opcode.to_u32(), id);
        }
    }

    #[test]
    fn rejects_unknown_discriminator() {
        assert_eq!(Opcode::from_u32(0), Err(ProtocolError::UnknownDiscriminator(0)));
        assert_eq!(Opcode::from_u32(57), Err(ProtocolError::UnknownDiscriminator(57)));
    }

    #[test]
    fn name_is_distinct_per_opcode() {
        let mut names: Vec<&str> = (1..=56u32).map(|id| Opcode::from_u32(id).unwrap().name()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
