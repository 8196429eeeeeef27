//! Cursor lifecycle and stateful traversal (spec §4.6's `cursor_*` contracts).

use std::sync::Arc;

use hamlink_core::{CursorHandle, DbHandle, OperationFlags, Result};
use hamlink_proto::{
    CursorCloneReply, CursorCloneRequest, CursorCloseReply, CursorCloseRequest, CursorEraseReply,
    CursorEraseRequest, CursorFindReply, CursorFindRequest, CursorGetRecordCountReply,
    CursorGetRecordCountRequest, CursorInsertReply, CursorInsertRequest, CursorMoveReply,
    CursorMoveRequest, CursorOverwriteReply, CursorOverwriteRequest, Message,
};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::record::{Found, Key, Record};
use crate::session::Session;

/// A cursor into a database's key order, created by
/// [`crate::Database::create_cursor`] or [`Cursor::clone_cursor`].
///
/// Cheap to clone at the Rust level, but [`Cursor::clone_cursor`] is the
/// operation that actually asks the server for an independent cursor handle
/// positioned identically to this one (spec §4.6 `cursor_clone`).
pub struct Cursor {
    session: Arc<Mutex<Session>>,
    handle: CursorHandle,
    db: DbHandle,
    record_number: bool,
}

impl Cursor {
    pub(crate) fn new(session: Arc<Mutex<Session>>, handle: CursorHandle, db: DbHandle, record_number: bool) -> Self {
        Self { session, handle, db, record_number }
    }

    /// This cursor's handle.
    #[must_use]
    pub fn handle(&self) -> CursorHandle {
        self.handle
    }

    /// `cursor_clone(cursor_handle)` → a new, independent [`Cursor`]
    /// positioned identically to this one.
    #[instrument(skip(self))]
    pub async fn clone_cursor(&self) -> Result<Self> {
        let mut session = self.session.lock().await;
        let request = Message::CursorCloneRequest(CursorCloneRequest { cursor_handle: self.handle.get() });
        let reply = session.call(request).await?;
        let Message::CursorCloneReply(CursorCloneReply { status, cursor_handle }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        let cloned = hamlink_core::CursorHandle::new(cursor_handle);
        session.handles.insert_cursor(cloned, self.db);
        Ok(Self::new(self.session.clone(), cloned, self.db, self.record_number))
    }

    /// `cursor_close(cursor_handle)`.
    #[instrument(skip(self))]
    pub async fn close(self) -> Result<()> {
        let mut session = self.session.lock().await;
        let request = Message::CursorCloseRequest(CursorCloseRequest { cursor_handle: self.handle.get() });
        let reply = session.call(request).await?;
        let Message::CursorCloseReply(CursorCloseReply { status }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        session.handles.remove_cursor(self.handle);
        Ok(())
    }

    /// `cursor_insert(cursor_handle, key, record, flags)`. Same
    /// record-number rule as [`crate::Database::insert`]: for a
    /// record-number database the request carries no key bytes and the
    /// reply's assigned 8-byte key is returned.
    #[instrument(skip(self, key, record))]
    pub async fn insert(&self, key: &Key, record: &Record, flags: OperationFlags) -> Result<Vec<u8>> {
        let mut session = self.session.lock().await;
        let hints = session.stats_for(self.db).get_insert_hints();
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
        let mut effective_flags = flags;
        if hints.hint_append {
            effective_flags |= OperationFlags::HINT_APPEND;
        }
        if hints.hint_prepend {
            effective_flags |= OperationFlags::HINT_PREPEND;
        }
        let request = Message::CursorInsertRequest(CursorInsertRequest {
            cursor_handle: self.handle.get(),
            key: wire_key,
            record: record.to_wire(),
            flags: effective_flags.bits(),
        });
        let reply = session.call(request).await?;
        let Message::CursorInsertReply(CursorInsertReply { status, key: reply_key }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        if let Err(err) = Session::expect_status(status) {
            session.stats_for(self.db).insert_failed();
            return Err(err);
        }
        let bytes = reply_key.data.unwrap_or_default();
        session.arena_for(self.db, None).pair().key.fill(&bytes);
        Ok(bytes)
    }

    /// `cursor_erase(cursor_handle, flags)`.
    #[instrument(skip(self))]
    pub async fn erase(&self, flags: u32) -> Result<()> {
        let session = self.session.lock().await;
        let request = Message::CursorEraseRequest(CursorEraseRequest { cursor_handle: self.handle.get(), flags });
        let reply = session.call(request).await?;
        let Message::CursorEraseReply(CursorEraseReply { status }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)
    }

    /// `cursor_find(cursor_handle, key, record, flags)`. Approximate-match
    /// bits are copied back into the returned [`Found::relation`]; the
    /// record is populated iff the reply carried one.
    #[instrument(skip(self, key, record))]
    pub async fn find(&self, key: &Key, record: &Record, flags: OperationFlags) -> Result<Found> {
        let mut session = self.session.lock().await;
        let request = Message::CursorFindRequest(CursorFindRequest {
            cursor_handle: self.handle.get(),
            key: key.to_wire(),
            record: record.to_wire(),
            flags: flags.bits(),
        });
        let reply = session.call(request).await?;
        let Message::CursorFindReply(CursorFindReply { status, key: reply_key, record: reply_record }) = reply
        else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        if let Err(err) = Session::expect_status(status) {
            session.stats_for(self.db).find_failed();
            return Err(err);
        }
        {
            let mut arena = session.arena_for(self.db, None);
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

    /// `cursor_overwrite(cursor_handle, record, flags)`: replace the record
    /// at the cursor's current position without moving it.
    #[instrument(skip(self, record))]
    pub async fn overwrite(&self, record: &Record, flags: u32) -> Result<()> {
        let session = self.session.lock().await;
        let request = Message::CursorOverwriteRequest(CursorOverwriteRequest {
            cursor_handle: self.handle.get(),
            record: record.to_wire(),
            flags,
        });
        let reply = session.call(request).await?;
        let Message::CursorOverwriteReply(CursorOverwriteReply { status }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)
    }

    /// `cursor_move(cursor_handle, key_out, record_out, flags)`. `flags`
    /// selects FIRST/LAST/NEXT/PREVIOUS/current (`OperationFlags`); pass
    /// [`Key::none`]/[`Record::none`] when the caller does not want that
    /// out-parameter populated.
    #[instrument(skip(self, key_out, record_out))]
    pub async fn move_to(&self, key_out: &Key, record_out: &Record, flags: OperationFlags) -> Result<Found> {
        let mut session = self.session.lock().await;
        let request = Message::CursorMoveRequest(CursorMoveRequest {
            cursor_handle: self.handle.get(),
            key: key_out.to_wire(),
            record: record_out.to_wire(),
            flags: flags.bits(),
        });
        let reply = session.call(request).await?;
        let Message::CursorMoveReply(CursorMoveReply { status, key, record }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        {
            let mut arena = session.arena_for(self.db, None);
            let pair = arena.pair();
            if let Some(data) = &key.data {
                pair.key.fill(data);
            }
            if let Some(data) = &record.data {
                pair.record.fill(data);
            }
        }
        Ok(Found::from_wire(key, record))
    }

    /// `cursor_get_record_size(cursor_handle)`. The reference harness's
    /// wire protocol has no such request; upstream reserves the behavior
    /// and leaves it to be added server-side, so this returns
    /// [`HamError::NotImplemented`] rather than guessing at a reply shape.
    pub async fn get_record_size(&self) -> Result<u64> {
        Err(hamlink_core::HamError::NotImplemented("cursor_get_record_size"))
    }

    /// `cursor_get_record_count(cursor_handle, flags)`.
    pub async fn record_count(&self, flags: u32) -> Result<u32> {
        let session = self.session.lock().await;
        let request =
            Message::CursorGetRecordCountRequest(CursorGetRecordCountRequest { cursor_handle: self.handle.get(), flags });
        let reply = session.call(request).await?;
        let Message::CursorGetRecordCountReply(CursorGetRecordCountReply { status, count }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        Ok(count)
    }
}
