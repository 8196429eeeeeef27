//! Top-level client: environment lifecycle and environment-scoped
//! operations (spec §4.6's `env_*` contracts).

use std::sync::Arc;
use std::time::Duration;

use hamlink_core::{DbFlags, DbHandle, EnvHandle, ParamName, Result, TxnFlags, TxnHandle};
use hamlink_proto::{
    Encoding, EnvCreateDbReply, EnvCreateDbRequest, EnvEraseDbReply, EnvEraseDbRequest,
    EnvFlushReply, EnvFlushRequest, EnvGetDatabaseNamesReply, EnvGetDatabaseNamesRequest,
    EnvGetParametersReply, EnvGetParametersRequest, EnvOpenDbReply, EnvOpenDbRequest,
    EnvRenameReply, EnvRenameRequest, Message, Param, TxnBeginReply, TxnBeginRequest,
};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::database::Database;
use crate::session::Session;
use crate::transaction::Transaction;
use crate::transport::Transport;

/// An open environment: the entry point for database, transaction, and
/// cursor operations.
///
/// Cheap to clone — every clone shares the same underlying session and its
/// lock (spec §5: one mutex per environment session).
#[derive(Clone)]
pub struct Client {
    session: Arc<Mutex<Session>>,
    env_handle: EnvHandle,
}

impl Client {
    /// `connect(path)` (spec §4.6): open a new environment session over
    /// `transport`, using `config`'s encoding and call timeout for every
    /// subsequent call on this session.
    #[instrument(skip(transport, config))]
    pub async fn connect(path: &str, transport: Box<dyn Transport>, config: ClientConfig) -> Result<Self> {
        let session = Session::new(transport, config.encoding, config.call_timeout);
        let request = Message::ConnectRequest(hamlink_proto::ConnectRequest { path: path.to_string() });
        let reply = session.call(request).await?;
        let Message::ConnectReply(reply) = reply else { unreachable!("Session::call already checked the reply opcode matches the request") };
        Session::expect_status(reply.status)?;

        let env_handle = EnvHandle::new(reply.env_handle);
        tracing::debug!(env_handle = reply.env_handle, env_flags = reply.env_flags, "connected");
        Ok(Self { session: Arc::new(Mutex::new(session)), env_handle })
    }

    /// `connect` with the default [`ClientConfig`] (schema encoding, 10s
    /// call timeout).
    pub async fn connect_with_defaults(path: &str, transport: Box<dyn Transport>) -> Result<Self> {
        Self::connect(path, transport, ClientConfig::default()).await
    }

    /// The handle this session's `connect` call returned.
    #[must_use]
    pub fn env_handle(&self) -> EnvHandle {
        self.env_handle
    }

    /// `env_disconnect(env_handle)`.
    #[instrument(skip(self))]
    pub async fn disconnect(self) -> Result<()> {
        let mut session = self.session.lock().await;
        let request =
            Message::DisconnectRequest(hamlink_proto::DisconnectRequest { env_handle: self.env_handle.get() });
        let reply = session.call(request).await?;
        let Message::DisconnectReply(reply) = reply else { unreachable!("Session::call already checked the reply opcode matches the request") };
        Session::expect_status(reply.status)?;
        session.handles.remove_env(self.env_handle);
        Ok(())
    }

    /// `env_get_parameters(env_handle, names[])`. Only the parameters named
    /// are guaranteed present in the result.
    pub async fn get_parameters(&self, names: &[ParamName]) -> Result<Vec<Param>> {
        let session = self.session.lock().await;
        let request = Message::EnvGetParametersRequest(EnvGetParametersRequest {
            env_handle: self.env_handle.get(),
            names: names.iter().map(|n| n.to_u16()).collect(),
        });
        let reply = session.call(request).await?;
        let Message::EnvGetParametersReply(EnvGetParametersReply { status, params }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        Ok(params)
    }

    /// `env_get_database_names(env_handle)`.
    pub async fn get_database_names(&self) -> Result<Vec<u16>> {
        let session = self.session.lock().await;
        let request = Message::EnvGetDatabaseNamesRequest(EnvGetDatabaseNamesRequest {
            env_handle: self.env_handle.get(),
        });
        let reply = session.call(request).await?;
        let Message::EnvGetDatabaseNamesReply(EnvGetDatabaseNamesReply { status, names }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        Ok(names)
    }

    /// `env_rename_db(env_handle, old, new, flags)`.
    pub async fn rename_db(&self, old_dbname: u16, new_dbname: u16, flags: u32) -> Result<()> {
        let session = self.session.lock().await;
        let request = Message::EnvRenameRequest(EnvRenameRequest {
            env_handle: self.env_handle.get(),
            old_dbname,
            new_dbname,
            flags,
        });
        let reply = session.call(request).await?;
        let Message::EnvRenameReply(EnvRenameReply { status }) = reply else { unreachable!("Session::call already checked the reply opcode matches the request") };
        Session::expect_status(status)
    }

    /// `env_flush(env_handle, flags)`.
    pub async fn flush(&self, flags: u32) -> Result<()> {
        let session = self.session.lock().await;
        let request =
            Message::EnvFlushRequest(EnvFlushRequest { env_handle: self.env_handle.get(), flags });
        let reply = session.call(request).await?;
        let Message::EnvFlushReply(EnvFlushReply { status }) = reply else { unreachable!("Session::call already checked the reply opcode matches the request") };
        Session::expect_status(status)
    }

    /// `env_create_db(env_handle, dbname, flags, params[])` → a [`Database`]
    /// handle.
    #[instrument(skip(self, params))]
    pub async fn create_db(&self, dbname: u16, flags: u32, params: Vec<Param>) -> Result<Database> {
        let mut session = self.session.lock().await;
        let request = Message::EnvCreateDbRequest(EnvCreateDbRequest {
            env_handle: self.env_handle.get(),
            dbname,
            flags,
            params,
        });
        let reply = session.call(request).await?;
        let Message::EnvCreateDbReply(EnvCreateDbReply { status, db_handle, db_flags }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        self.adopt_db(&mut session, db_handle, db_flags)
    }

    /// `env_open_db(env_handle, dbname, flags, params[])` → a [`Database`]
    /// handle.
    #[instrument(skip(self, params))]
    pub async fn open_db(&self, dbname: u16, flags: u32, params: Vec<Param>) -> Result<Database> {
        let mut session = self.session.lock().await;
        let request = Message::EnvOpenDbRequest(EnvOpenDbRequest {
            env_handle: self.env_handle.get(),
            dbname,
            flags,
            params,
        });
        let reply = session.call(request).await?;
        let Message::EnvOpenDbReply(EnvOpenDbReply { status, db_handle, db_flags }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;
        self.adopt_db(&mut session, db_handle, db_flags)
    }

    fn adopt_db(&self, session: &mut Session, db_handle: u64, db_flags: u32) -> Result<Database> {
        let db = DbHandle::new(db_handle);
        let record_number = DbFlags::from_bits_truncate(db_flags).contains(DbFlags::RECORD_NUMBER);
        session.handles.insert_db(db, self.env_handle);
        session.register_db(db, record_number);
        Ok(Database::new(self.session.clone(), db, record_number))
    }

    /// `env_erase_db(env_handle, dbname, flags)`.
    pub async fn erase_db(&self, dbname: u16, flags: u32) -> Result<()> {
        let session = self.session.lock().await;
        let request = Message::EnvEraseDbRequest(EnvEraseDbRequest {
            env_handle: self.env_handle.get(),
            dbname,
            flags,
        });
        let reply = session.call(request).await?;
        let Message::EnvEraseDbReply(EnvEraseDbReply { status }) = reply else { unreachable!("Session::call already checked the reply opcode matches the request") };
        Session::expect_status(status)
    }

    /// `txn_begin(env_handle, name, flags)` → a [`Transaction`]. Supported
    /// flags: `TXN_READ_ONLY`, `TXN_TEMPORARY` (spec §4.6).
    #[instrument(skip(self, name))]
    pub async fn begin_txn(&self, name: Option<&str>, flags: TxnFlags) -> Result<Transaction> {
        let mut session = self.session.lock().await;
        let request = Message::TxnBeginRequest(TxnBeginRequest {
            env_handle: self.env_handle.get(),
            name: name.map(ToString::to_string),
            flags: flags.bits(),
        });
        let reply = session.call(request).await?;
        let Message::TxnBeginReply(TxnBeginReply { status, txn_handle }) = reply else {
            unreachable!("Session::call already checked the reply opcode matches the request")
        };
        Session::expect_status(status)?;

        let txn = TxnHandle::new(txn_handle);
        session.handles.insert_txn(txn, self.env_handle);
        if !flags.contains(TxnFlags::TEMPORARY) {
            session.register_txn_arena(txn);
        }
        Ok(Transaction::new(self.session.clone(), txn, self.env_handle, flags))
    }
}

/// How long a not-yet-connected call should wait; exposed for callers that
/// build their own [`Transport`] and want a matching default.
#[must_use]
pub fn default_call_timeout() -> Duration {
    ClientConfig::default().call_timeout
}

/// Convenience: a session using the default codec negotiated over the
/// given encoding.
#[must_use]
pub fn config_with_encoding(encoding: Encoding) -> ClientConfig {
    ClientConfig { encoding, ..ClientConfig::default() }
}
