//! Transaction lifecycle (spec §4.6's `txn_*` contracts).

use std::sync::Arc;

use hamlink_core::{EnvHandle, Result, TxnFlags, TxnHandle};
use hamlink_proto::{Message, TxnAbortReply, TxnAbortRequest, TxnCommitReply, TxnCommitRequest};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::session::Session;

/// An open transaction, created by a call through [`crate::Client`] (see
/// `Client::begin_txn` in the session's owning module).
///
/// A `TEMPORARY` transaction shares its parent database's arenas; a durable
/// transaction owns its own (spec §3, §4.5) — [`Transaction::is_temporary`]
/// tells callers which applies, though the arena selection itself happens
/// transparently inside [`crate::session::Session::arena_for`].
pub struct Transaction {
    session: Arc<Mutex<Session>>,
    handle: TxnHandle,
    env_handle: EnvHandle,
    temporary: bool,
}

impl Transaction {
    pub(crate) fn new(session: Arc<Mutex<Session>>, handle: TxnHandle, env_handle: EnvHandle, flags: TxnFlags) -> Self {
        Self { session, handle, env_handle, temporary: flags.contains(TxnFlags::TEMPORARY) }
    }

    /// This transaction's handle.
    #[must_use]
    pub fn handle(&self) -> TxnHandle {
        self.handle
    }

    pub(crate) fn handle_value(&self) -> u64 {
        self.handle.get()
    }

    /// Whether this transaction shares its parent database's arenas rather
    /// than owning its own.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// `txn_commit(txn_handle, flags)`.
    #[instrument(skip(self))]
    pub async fn commit(self, flags: u32) -> Result<()> {
        let mut session = self.session.lock().await;
        let request = Message::TxnCommitRequest(TxnCommitRequest { txn_handle: self.handle.get(), flags });
        let reply = session.call(request).await?;
        let Message::TxnCommitReply(TxnCommitReply { status }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        session.handles.remove_txn(self.handle);
        session.forget_txn(self.handle);
        Ok(())
    }

    /// `txn_abort(txn_handle, flags)`.
    #[instrument(skip(self))]
    pub async fn abort(self, flags: u32) -> Result<()> {
        let mut session = self.session.lock().await;
        let request = Message::TxnAbortRequest(TxnAbortRequest { txn_handle: self.handle.get(), flags });
        let reply = session.call(request).await?;
        let Message::TxnAbortReply(TxnAbortReply { status }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        session.handles.remove_txn(self.handle);
        session.forget_txn(self.handle);
        Ok(())
    }

    /// The environment this transaction belongs to.
    #[must_use]
    pub fn env_handle(&self) -> EnvHandle {
        self.env_handle
    }
}
