//! The per-environment session: transport, encoding, handle table, arenas,
//! and statistics, all behind one lock (spec §5: "each environment session
//! holds a mutex; all operations on that session serialize through it").

use std::collections::HashMap;
use std::time::Duration;

use hamlink_core::{ArenaPair, ArenaScope, BtreeStatistics, DbHandle, HamError, HandleTable, NetworkError, Result, StatusCode, TxnHandle};
use hamlink_proto::{Encoding, Message, ProtocolError};

use crate::transport::Transport;

/// Shared session state behind the environment lock.
///
/// Holds exactly one transport and one negotiated encoding for its whole
/// lifetime (spec Design Notes §9's "negotiate one at Connect time and
/// refuse the other"); [`crate::Client`], [`crate::Database`],
/// [`crate::Transaction`], and [`crate::Cursor`] are thin handles into this
/// shared state, cloned cheaply behind an `Arc`.
pub(crate) struct Session {
    transport: Box<dyn Transport>,
    encoding: Encoding,
    call_timeout: Duration,
    pub(crate) handles: HandleTable,
    db_arenas: HashMap<DbHandle, ArenaPair>,
    txn_arenas: HashMap<TxnHandle, ArenaPair>,
    db_record_number: HashMap<DbHandle, bool>,
    db_stats: HashMap<DbHandle, BtreeStatistics>,
}

impl Session {
    pub(crate) fn new(transport: Box<dyn Transport>, encoding: Encoding, call_timeout: Duration) -> Self {
        Self {
            transport,
            encoding,
            call_timeout,
            handles: HandleTable::new(),
            db_arenas: HashMap::new(),
            txn_arenas: HashMap::new(),
            db_record_number: HashMap::new(),
            db_stats: HashMap::new(),
        }
    }

    /// Encode `request`, round-trip it over the transport within the
    /// configured timeout, and decode the reply. Does not inspect the
    /// reply's status — callers check that themselves via
    /// [`Session::expect_status`] so they can still read out-parameters on
    /// a non-zero reply where the caller needs them (none currently do, but
    /// the split keeps the two concerns separate).
    pub(crate) async fn call(&self, request: Message) -> Result<Message> {
        let expected_reply = request.opcode().reply_opcode();
        let wire = self.encoding.encode(&request)?;

        let reply_bytes = tokio::time::timeout(self.call_timeout, self.transport.call(&wire))
            .await
            .map_err(|_| HamError::Network(NetworkError::Timeout))??;

        let reply = self.encoding.decode(&reply_bytes)?;
        let actual = reply.opcode();
        if actual != expected_reply {
            return Err(HamError::Protocol(ProtocolError::UnexpectedReply {
                expected: expected_reply.name(),
                actual: actual.name(),
            }));
        }
        Ok(reply)
    }

    /// Map a reply's `status` field to `Ok(())`/`Err(HamError::Engine)`.
    pub(crate) fn expect_status(status: i32) -> Result<()> {
        let code = StatusCode(status);
        if code.is_success() { Ok(()) } else { Err(HamError::Engine(code)) }
    }

    pub(crate) fn register_db(&mut self, db: DbHandle, record_number: bool) {
        self.db_arenas.insert(db, ArenaPair::default());
        self.db_record_number.insert(db, record_number);
        self.db_stats.insert(db, BtreeStatistics::new());
    }

    pub(crate) fn forget_db(&mut self, db: DbHandle) {
        self.db_arenas.remove(&db);
        self.db_record_number.remove(&db);
        self.db_stats.remove(&db);
    }

    pub(crate) fn is_record_number_db(&self, db: DbHandle) -> bool {
        self.db_record_number.get(&db).copied().unwrap_or(false)
    }

    pub(crate) fn register_txn_arena(&mut self, txn: TxnHandle) {
        self.txn_arenas.insert(txn, ArenaPair::default());
    }

    pub(crate) fn forget_txn(&mut self, txn: TxnHandle) {
        self.txn_arenas.remove(&txn);
    }

    /// The database's own arenas, or a durable transaction's own arenas if
    /// `txn` is non-zero and tracked (spec §3: "A transaction with the
    /// TEMPORARY flag shares its parent database's arenas; a durable
    /// transaction owns its own arenas"). A call staging a reply into the
    /// returned scope should do so before the `MutexGuard` borrowing this
    /// session is dropped; nothing outlives one call on one scope.
    pub(crate) fn arena_for(&mut self, db: DbHandle, txn: Option<TxnHandle>) -> ArenaScope<'_> {
        if let Some(txn) = txn {
            if self.txn_arenas.contains_key(&txn) {
                return ArenaScope::Transaction(self.txn_arenas.get_mut(&txn).expect("checked above"));
            }
        }
        ArenaScope::Database(self.db_arenas.entry(db).or_default())
    }

    pub(crate) fn stats_for(&mut self, db: DbHandle) -> &mut BtreeStatistics {
        self.db_stats.entry(db).or_insert_with(BtreeStatistics::new)
    }
}
