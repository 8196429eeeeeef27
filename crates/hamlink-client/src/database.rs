//! Database-scoped operations (spec §4.6's `db_*` contracts).

use std::sync::Arc;

use hamlink_core::{CursorHandle, DbHandle, FindHints, InsertHints, OperationFlags, ParamName, Result};
use hamlink_proto::{
    CursorCreateReply, CursorCreateRequest, DbCheckIntegrityReply, DbCheckIntegrityRequest,
    DbCloseReply, DbCloseRequest, DbEraseReply, DbEraseRequest, DbFindReply, DbFindRequest,
    DbGetKeyCountReply, DbGetKeyCountRequest, DbGetParametersReply, DbGetParametersRequest,
    DbInsertReply, DbInsertRequest, Message, Param,
};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::cursor::Cursor;
use crate::record::{Found, Key, Record};
use crate::session::Session;
use crate::transaction::Transaction;

fn txn_handle(txn: Option<&Transaction>) -> u64 {
    txn.map_or(0, Transaction::handle_value)
}

/// An open database, created by [`crate::Client::create_db`] or
/// [`crate::Client::open_db`].
///
/// Cheap to clone — shares the parent [`crate::Client`]'s session lock.
#[derive(Clone)]
pub struct Database {
    session: Arc<Mutex<Session>>,
    handle: DbHandle,
    record_number: bool,
}

impl Database {
    pub(crate) fn new(session: Arc<Mutex<Session>>, handle: DbHandle, record_number: bool) -> Self {
        Self { session, handle, record_number }
    }

    /// This database's handle.
    #[must_use]
    pub fn handle(&self) -> DbHandle {
        self.handle
    }

    /// Whether the engine assigns key bytes on insert (spec §3: "For
    /// record-number databases, the engine assigns the key bytes on
    /// insert").
    #[must_use]
    pub fn is_record_number(&self) -> bool {
        self.record_number
    }

    pub(crate) fn handle_value(&self) -> u64 {
        self.handle.get()
    }

    /// `db_close(db_handle, flags)`. Clears the local handle on success.
    #[instrument(skip(self))]
    pub async fn close(self, flags: u32) -> Result<()> {
        let mut session = self.session.lock().await;
        let request = Message::DbCloseRequest(DbCloseRequest { db_handle: self.handle.get(), flags });
        let reply = session.call(request).await?;
        let Message::DbCloseReply(DbCloseReply { status }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        session.handles.remove_db(self.handle);
        session.forget_db(self.handle);
        Ok(())
    }

    /// `db_get_parameters(db_handle, names[])`.
    pub async fn get_parameters(&self, names: &[ParamName]) -> Result<Vec<Param>> {
        let session = self.session.lock().await;
        let request = Message::DbGetParametersRequest(DbGetParametersRequest {
            db_handle: self.handle.get(),
            names: names.iter().map(|n| n.to_u16()).collect(),
        });
        let reply = session.call(request).await?;
        let Message::DbGetParametersReply(DbGetParametersReply { status, params }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        Ok(params)
    }

    /// `db_check_integrity(db_handle, txn_handle, flags)`.
    pub async fn check_integrity(&self, txn: Option<&Transaction>, flags: u32) -> Result<()> {
        let session = self.session.lock().await;
        let request = Message::DbCheckIntegrityRequest(DbCheckIntegrityRequest {
            db_handle: self.handle.get(),
            txn_handle: txn_handle(txn),
            flags,
        });
        let reply = session.call(request).await?;
        let Message::DbCheckIntegrityReply(DbCheckIntegrityReply { status }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)
    }

    /// `db_get_key_count(db_handle, txn_handle, flags)`.
    pub async fn get_key_count(&self, txn: Option<&Transaction>, flags: u32) -> Result<u64> {
        let session = self.session.lock().await;
        let request = Message::DbGetKeyCountRequest(DbGetKeyCountRequest {
            db_handle: self.handle.get(),
            txn_handle: txn_handle(txn),
            flags,
        });
        let reply = session.call(request).await?;
        let Message::DbGetKeyCountReply(DbGetKeyCountReply { status, count }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        Ok(count)
    }

    /// `db_insert(db_handle, txn_handle, key, record, flags)`.
    ///
    /// For a record-number database, `key` is ignored on the wire — the
    /// request carries no key bytes — and the assigned 8-byte key is
    /// returned (spec §3, §4.6, invariant 4). `HINT_APPEND`/`HINT_PREPEND`
    /// from this database's statistics are forwarded automatically; pass
    /// additional direction/overwrite bits in `flags`.
    #[instrument(skip(self, key, record))]
    pub async fn insert(
        &self,
        txn: Option<&Transaction>,
        key: &Key,
        record: &Record,
        flags: OperationFlags,
    ) -> Result<Vec<u8>> {
        let mut session = self.session.lock().await;
        let hints = session.stats_for(self.handle).get_insert_hints();
        let wire_key = if self.record_number {
            hamlink_proto::WireKey {
                data: None,
                size: 0,
                flags: hamlink_core::KeyFlags::RECORD_NUMBER.bits(),
                intflags: 0,
            }
        } else {
            key.to_wire()
        };
        let request = Message::DbInsertRequest(DbInsertRequest {
            db_handle: self.handle.get(),
            txn_handle: txn_handle(txn),
            key: wire_key,
            record: record.to_wire(),
            flags: (flags | hint_flags(hints)).bits(),
        });
        let reply = session.call(request).await?;
        let Message::DbInsertReply(DbInsertReply { status, key: reply_key }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        if let Err(err) = Session::expect_status(status) {
            session.stats_for(self.handle).insert_failed();
            return Err(err);
        }
        let bytes = reply_key.data.unwrap_or_default();
        let mut arena = session.arena_for(self.handle, txn.map(Transaction::handle));
        arena.pair().key.fill(&bytes);
        Ok(bytes)
    }

    /// `db_erase(db_handle, txn_handle, key, flags)`.
    pub async fn erase(&self, txn: Option<&Transaction>, key: &Key, flags: u32) -> Result<()> {
        let session = self.session.lock().await;
        let request = Message::DbEraseRequest(DbEraseRequest {
            db_handle: self.handle.get(),
            txn_handle: txn_handle(txn),
            key: key.to_wire(),
            flags,
        });
        let reply = session.call(request).await?;
        let Message::DbEraseReply(DbEraseReply { status }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)
    }

    /// `db_find(db_handle, txn_handle, key, record, flags)`. `flags`
    /// selects exact/LEQ/GEQ/LT/GT matching (`OperationFlags`); the
    /// reply's approximate-match relation is carried in the returned
    /// [`Found::relation`].
    #[instrument(skip(self, key, record))]
    pub async fn find(
        &self,
        txn: Option<&Transaction>,
        key: &Key,
        record: &Record,
        flags: OperationFlags,
    ) -> Result<Found> {
        let mut session = self.session.lock().await;
        let request = Message::DbFindRequest(DbFindRequest {
            db_handle: self.handle.get(),
            txn_handle: txn_handle(txn),
            key: key.to_wire(),
            record: record.to_wire(),
            flags: flags.bits(),
        });
        let reply = session.call(request).await?;
        let Message::DbFindReply(DbFindReply { status, key: reply_key, record: reply_record }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        if let Err(err) = Session::expect_status(status) {
            session.stats_for(self.handle).find_failed();
            return Err(err);
        }
        {
            let mut arena = session.arena_for(self.handle, txn.map(Transaction::handle));
            let pair = arena.pair();
            if let Some(data) = &reply_key.data {
                pair.key.fill(data);
            }
            if let Some(data) = &reply_record.data {
                pair.record.fill(data);
            }
        }
        Ok(Found::from_wire(reply_key, reply_record))
    }

    /// Hints for the next find, from this database's statistics (spec
    /// §4.7). Advisory only — correctness does not depend on using them.
    pub async fn find_hints(&self) -> FindHints {
        let mut session = self.session.lock().await;
        session.stats_for(self.handle).get_find_hints()
    }

    /// Record that a find against `leaf_page` succeeded, for this
    /// database's statistics. The wire protocol carries no leaf-page
    /// address in a find reply, so nothing calls this automatically; it
    /// exists for a caller (or a future server hint extension) that learns
    /// the address some other way.
    pub async fn record_find_success(&self, leaf_page: u64) {
        let mut session = self.session.lock().await;
        session.stats_for(self.handle).find_succeeded(leaf_page);
    }

    /// Record that an insert landed at `slot` of a leaf with `count` total
    /// keys, for this database's statistics. Same caveat as
    /// [`Database::record_find_success`]: the wire protocol doesn't carry
    /// this information back automatically.
    pub async fn record_insert_success(
        &self,
        leaf_page: u64,
        slot: u32,
        count: u32,
        is_rightmost_leaf: bool,
        is_leftmost_leaf: bool,
    ) {
        let mut session = self.session.lock().await;
        session.stats_for(self.handle).insert_succeeded(leaf_page, slot, count, is_rightmost_leaf, is_leftmost_leaf);
    }

    /// Hints for the next insert, from this database's statistics.
    pub async fn insert_hints(&self) -> InsertHints {
        let mut session = self.session.lock().await;
        session.stats_for(self.handle).get_insert_hints()
    }

    /// `cursor_create(db_handle, txn_handle, flags)` → a [`Cursor`].
    #[instrument(skip(self))]
    pub async fn create_cursor(&self, txn: Option<&Transaction>, flags: u32) -> Result<Cursor> {
        let mut session = self.session.lock().await;
        let request = Message::CursorCreateRequest(CursorCreateRequest {
            db_handle: self.handle.get(),
            txn_handle: txn_handle(txn),
            flags,
        });
        let reply = session.call(request).await?;
        let Message::CursorCreateReply(CursorCreateReply { status, cursor_handle }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        let cursor = CursorHandle::new(cursor_handle);
        session.handles.insert_cursor(cursor, self.handle);
        Ok(Cursor::new(self.session.clone(), cursor, self.handle, self.record_number))
    }
}

fn hint_flags(hints: InsertHints) -> OperationFlags {
    let mut flags = OperationFlags::empty();
    if hints.hint_append {
        flags |= OperationFlags::HINT_APPEND;
    }
    if hints.hint_prepend {
        flags |= OperationFlags::HINT_PREPEND;
    }
    flags
}
