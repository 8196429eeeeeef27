//! An in-process reference server: the same message catalog as the real
//! engine, dispatched against an in-memory ordered store instead of a disk
//! btree. Exists so `hamlink-client` can be exercised end-to-end without a
//! real storage engine on the other end of the wire.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Mutex;

use hamlink_core::{DbFlags, OperationFlags, StatusCode};
use hamlink_proto::{
    CursorCloneReply, CursorCloneRequest, CursorCloseReply, CursorCloseRequest,
    CursorCreateReply, CursorCreateRequest, CursorEraseReply, CursorEraseRequest,
    CursorFindReply, CursorFindRequest, CursorGetRecordCountReply, CursorGetRecordCountRequest,
    CursorInsertReply, CursorInsertRequest, CursorMoveReply, CursorMoveRequest,
    CursorOverwriteReply, CursorOverwriteRequest, DbCheckIntegrityReply, DbCheckIntegrityRequest,
    DbCloseReply, DbCloseRequest, DbEraseReply, DbEraseRequest, DbFindReply, DbFindRequest,
    DbGetKeyCountReply, DbGetKeyCountRequest, DbGetParametersReply, DbGetParametersRequest,
    DbInsertReply, DbInsertRequest, EnvCreateDbReply, EnvCreateDbRequest, EnvEraseDbReply,
    EnvEraseDbRequest, EnvFlushReply, EnvFlushRequest, EnvGetDatabaseNamesReply,
    EnvGetDatabaseNamesRequest, EnvGetParametersReply, EnvGetParametersRequest, EnvOpenDbReply,
    EnvOpenDbRequest, EnvRenameReply, EnvRenameRequest, Message, Param, TxnAbortReply,
    TxnAbortRequest, TxnBeginReply, TxnBeginRequest, TxnCommitReply, TxnCommitRequest, WireKey,
    WireRecord, approx_match_bits,
};

type Store = BTreeMap<Vec<u8>, Vec<u8>>;

struct DbState {
    env_handle: u64,
    dbname: u16,
    record_number: bool,
    store: Store,
    next_record_number: u64,
}

/// A transaction's pending writes, applied to its databases on commit and
/// discarded on abort. `None` marks a key erased within the transaction.
struct TxnState {
    env_handle: u64,
    overlay: std::collections::HashMap<u64, BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

/// A cursor's last-known key, used as the pivot for `FIRST`/`LAST`/`NEXT`/
/// `PREVIOUS` moves. Not necessarily still present in the store (e.g. after
/// an erase through the cursor).
struct CursorState {
    db_handle: u64,
    txn_handle: u64,
    position: Option<Vec<u8>>,
}

#[derive(Default)]
struct State {
    next_handle: u64,
    envs: std::collections::HashMap<u64, std::collections::HashMap<u16, u64>>,
    dbs: std::collections::HashMap<u64, DbState>,
    txns: std::collections::HashMap<u64, TxnState>,
    cursors: std::collections::HashMap<u64, CursorState>,
}

impl State {
    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// The database's committed store overlaid with `txn`'s pending writes,
    /// if any. Cloned rather than referenced: this is a reference harness,
    /// not a performance-sensitive engine.
    fn view(&self, db_handle: u64, txn_handle: u64) -> Store {
        let db = &self.dbs[&db_handle];
        let mut view = db.store.clone();
        if txn_handle != 0 {
            if let Some(txn) = self.txns.get(&txn_handle) {
                if let Some(overlay) = txn.overlay.get(&db_handle) {
                    for (key, value) in overlay {
                        match value {
                            Some(bytes) => {
                                view.insert(key.clone(), bytes.clone());
                            },
                            None => {
                                view.remove(key);
                            },
                        }
                    }
                }
            }
        }
        view
    }

    fn write(&mut self, db_handle: u64, txn_handle: u64, key: Vec<u8>, record: Vec<u8>) {
        if txn_handle == 0 {
            self.dbs.get_mut(&db_handle).expect("db exists").store.insert(key, record);
        } else {
            self.txns
                .get_mut(&txn_handle)
                .expect("txn exists")
                .overlay
                .entry(db_handle)
                .or_default()
                .insert(key, Some(record));
        }
    }

    fn erase(&mut self, db_handle: u64, txn_handle: u64, key: &[u8]) {
        if txn_handle == 0 {
            self.dbs.get_mut(&db_handle).expect("db exists").store.remove(key);
        } else {
            self.txns
                .get_mut(&txn_handle)
                .expect("txn exists")
                .overlay
                .entry(db_handle)
                .or_default()
                .insert(key.to_vec(), None);
        }
    }
}

/// Approximate-match relation between the matched key and the requested one.
fn relation_bits(matched: &[u8], requested: &[u8]) -> u32 {
    match matched.cmp(requested) {
        std::cmp::Ordering::Less => approx_match_bits::LT,
        std::cmp::Ordering::Greater => approx_match_bits::GT,
        std::cmp::Ordering::Equal => approx_match_bits::EQ,
    }
}

fn find_in(view: &Store, key: &[u8], flags: u32) -> Option<(Vec<u8>, Vec<u8>)> {
    let flags = OperationFlags::from_bits_truncate(flags);
    if flags.contains(OperationFlags::LEQ) {
        view.range((Bound::Unbounded, Bound::Included(key.to_vec()))).next_back()
    } else if flags.contains(OperationFlags::GEQ) {
        view.range((Bound::Included(key.to_vec()), Bound::Unbounded)).next()
    } else if flags.contains(OperationFlags::LT) {
        view.range((Bound::Unbounded, Bound::Excluded(key.to_vec()))).next_back()
    } else if flags.contains(OperationFlags::GT) {
        view.range((Bound::Excluded(key.to_vec()), Bound::Unbounded)).next()
    } else {
        view.get_key_value(key)
    }
    .map(|(k, v)| (k.clone(), v.clone()))
}

fn record_number_to_wire(n: u64) -> Vec<u8> {
    n.to_le_bytes().to_vec()
}

fn record_number_to_store_key(n: u64) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

/// Convert an 8-byte record-number key as the client sent it (little-endian,
/// spec §3's "engine assigns the key bytes on insert") into the big-endian
/// form the reference store orders by (see `record_number_to_store_key`).
/// Non-8-byte input is passed through unchanged rather than rejected here;
/// callers that care about a malformed key size surface that as
/// `KEY_NOT_FOUND`/`INVALID_PARAMETER` from the lookup that follows.
fn record_number_wire_to_store(data: &[u8]) -> Vec<u8> {
    match <[u8; 8]>::try_from(data) {
        Ok(bytes) => u64::from_le_bytes(bytes).to_be_bytes().to_vec(),
        Err(_) => data.to_vec(),
    }
}

/// The inverse of [`record_number_wire_to_store`]: store order (big-endian)
/// back to wire order (little-endian), for keys read back out of the store
/// and handed to the client (find/move replies).
fn record_number_store_to_wire(data: &[u8]) -> Vec<u8> {
    match <[u8; 8]>::try_from(data) {
        Ok(bytes) => u64::from_be_bytes(bytes).to_le_bytes().to_vec(),
        Err(_) => data.to_vec(),
    }
}

/// The reference server. One instance models one open-ended set of
/// environments, databases, transactions, and cursors; cheap to share behind
/// an `Arc` since all mutation goes through the internal mutex.
#[derive(Default)]
pub struct Server {
    state: Mutex<State>,
}

impl Server {
    /// A fresh server with no environments open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch one request and produce its reply. Never errors: a request
    /// this server doesn't understand well enough to serve comes back as an
    /// engine-level `INVALID_PARAMETER` status, not a panic or a
    /// protocol-level failure.
    #[allow(clippy::too_many_lines)]
    pub fn handle(&self, request: Message) -> Message {
        let mut state = self.state.lock().expect("server mutex poisoned");
        match request {
            Message::ConnectRequest(req) => {
                let env_handle = state.allocate();
                state.envs.insert(env_handle, std::collections::HashMap::new());
                tracing::debug!(env_handle, path = %req.path, "connect");
                Message::ConnectReply(hamlink_proto::ConnectReply { status: 0, env_handle, env_flags: 0 })
            },
            Message::DisconnectRequest(req) => {
                state.envs.remove(&req.env_handle);
                state.dbs.retain(|_, db| db.env_handle != req.env_handle);
                state.txns.retain(|_, txn| txn.env_handle != req.env_handle);
                Message::DisconnectReply(hamlink_proto::DisconnectReply { status: 0 })
            },
            Message::EnvGetParametersRequest(EnvGetParametersRequest { names, .. }) => {
                let params = names.into_iter().map(|name| Param { name, value: 0, string_value: None }).collect();
                Message::EnvGetParametersReply(EnvGetParametersReply { status: 0, params })
            },
            Message::EnvGetDatabaseNamesRequest(EnvGetDatabaseNamesRequest { env_handle }) => {
                let names = state.envs.get(&env_handle).map(|dbs| dbs.keys().copied().collect()).unwrap_or_default();
                Message::EnvGetDatabaseNamesReply(EnvGetDatabaseNamesReply { status: 0, names })
            },
            Message::EnvRenameRequest(EnvRenameRequest { env_handle, old_dbname, new_dbname, .. }) => {
                let status = rename_db(&mut state, env_handle, old_dbname, new_dbname);
                Message::EnvRenameReply(EnvRenameReply { status })
            },
            Message::EnvFlushRequest(_) => Message::EnvFlushReply(EnvFlushReply { status: 0 }),
            Message::EnvCreateDbRequest(req) => create_db(&mut state, req),
            Message::EnvOpenDbRequest(req) => open_db(&mut state, req),
            Message::EnvEraseDbRequest(EnvEraseDbRequest { env_handle, dbname, .. }) => {
                if let Some(dbs) = state.envs.get_mut(&env_handle) {
                    if let Some(db_handle) = dbs.remove(&dbname) {
                        state.dbs.remove(&db_handle);
                    }
                }
                Message::EnvEraseDbReply(EnvEraseDbReply { status: 0 })
            },
            Message::DbCloseRequest(DbCloseRequest { db_handle, .. }) => {
                state.dbs.remove(&db_handle);
                Message::DbCloseReply(DbCloseReply { status: 0 })
            },
            Message::DbGetParametersRequest(DbGetParametersRequest { db_handle, names }) => {
                let params = names
                    .into_iter()
                    .map(|name| Param {
                        name,
                        value: if name == hamlink_core::ParamName::DbName.to_u16() {
                            u64::from(state.dbs.get(&db_handle).map_or(0, |db| db.dbname))
                        } else {
                            0
                        },
                        string_value: None,
                    })
                    .collect();
                Message::DbGetParametersReply(DbGetParametersReply { status: 0, params })
            },
            Message::DbCheckIntegrityRequest(_) => {
                Message::DbCheckIntegrityReply(DbCheckIntegrityReply { status: 0 })
            },
            Message::DbGetKeyCountRequest(DbGetKeyCountRequest { db_handle, txn_handle, .. }) => {
                let count = state.view(db_handle, txn_handle).len() as u64;
                Message::DbGetKeyCountReply(DbGetKeyCountReply { status: 0, count })
            },
            Message::DbInsertRequest(req) => db_insert(&mut state, req),
            Message::DbEraseRequest(DbEraseRequest { db_handle, txn_handle, key, .. }) => {
                let status = db_erase(&mut state, db_handle, txn_handle, &key);
                Message::DbEraseReply(DbEraseReply { status })
            },
            Message::DbFindRequest(req) => db_find(&state, req),
            Message::TxnBeginRequest(req) => txn_begin(&mut state, req),
            Message::TxnCommitRequest(TxnCommitRequest { txn_handle, .. }) => {
                commit_txn(&mut state, txn_handle);
                Message::TxnCommitReply(TxnCommitReply { status: 0 })
            },
            Message::TxnAbortRequest(TxnAbortRequest { txn_handle, .. }) => {
                state.txns.remove(&txn_handle);
                Message::TxnAbortReply(TxnAbortReply { status: 0 })
            },
            Message::CursorCreateRequest(CursorCreateRequest { db_handle, txn_handle, .. }) => {
                let cursor_handle = state.allocate();
                state.cursors.insert(cursor_handle, CursorState { db_handle, txn_handle, position: None });
                Message::CursorCreateReply(CursorCreateReply { status: 0, cursor_handle })
            },
            Message::CursorCloneRequest(CursorCloneRequest { cursor_handle }) => {
                let cloned = state.cursors.get(&cursor_handle).map(|c| CursorState {
                    db_handle: c.db_handle,
                    txn_handle: c.txn_handle,
                    position: c.position.clone(),
                });
                match cloned {
                    Some(cursor) => {
                        let new_handle = state.allocate();
                        state.cursors.insert(new_handle, cursor);
                        Message::CursorCloneReply(CursorCloneReply { status: 0, cursor_handle: new_handle })
                    },
                    None => Message::CursorCloneReply(CursorCloneReply {
                        status: StatusCode::INVALID_PARAMETER.0,
                        cursor_handle: 0,
                    }),
                }
            },
            Message::CursorCloseRequest(CursorCloseRequest { cursor_handle }) => {
                state.cursors.remove(&cursor_handle);
                Message::CursorCloseReply(CursorCloseReply { status: 0 })
            },
            Message::CursorInsertRequest(req) => cursor_insert(&mut state, req),
            Message::CursorEraseRequest(CursorEraseRequest { cursor_handle, .. }) => {
                Message::CursorEraseReply(CursorEraseReply { status: cursor_erase(&mut state, cursor_handle) })
            },
            Message::CursorFindRequest(req) => cursor_find(&mut state, req),
            Message::CursorGetRecordCountRequest(CursorGetRecordCountRequest { cursor_handle, .. }) => {
                let status = cursor_record_count(&state, cursor_handle);
                Message::CursorGetRecordCountReply(CursorGetRecordCountReply {
                    status,
                    count: u32::from(status == 0),
                })
            },
            Message::CursorOverwriteRequest(req) => cursor_overwrite(&mut state, req),
            Message::CursorMoveRequest(req) => cursor_move(&mut state, req),
            reply @ (Message::ConnectReply(_)
            | Message::DisconnectReply(_)
            | Message::EnvRenameReply(_)
            | Message::EnvGetParametersReply(_)
            | Message::EnvGetDatabaseNamesReply(_)
            | Message::EnvFlushReply(_)
            | Message::EnvCreateDbReply(_)
            | Message::EnvOpenDbReply(_)
            | Message::EnvEraseDbReply(_)
            | Message::DbCloseReply(_)
            | Message::DbGetParametersReply(_)
            | Message::TxnBeginReply(_)
            | Message::TxnCommitReply(_)
            | Message::TxnAbortReply(_)
            | Message::DbCheckIntegrityReply(_)
            | Message::DbGetKeyCountReply(_)
            | Message::DbInsertReply(_)
            | Message::DbEraseReply(_)
            | Message::DbFindReply(_)
            | Message::CursorCreateReply(_)
            | Message::CursorCloneReply(_)
            | Message::CursorCloseReply(_)
            | Message::CursorInsertReply(_)
            | Message::CursorEraseReply(_)
            | Message::CursorFindReply(_)
            | Message::CursorGetRecordCountReply(_)
            | Message::CursorOverwriteReply(_)
            | Message::CursorMoveReply(_)) => {
                unreachable!("server received a reply message as a request: {reply:?}")
            },
        }
    }
}

fn rename_db(state: &mut State, env_handle: u64, old_dbname: u16, new_dbname: u16) -> i32 {
    let Some(dbs) = state.envs.get_mut(&env_handle) else { return StatusCode::INVALID_PARAMETER.0 };
    let Some(db_handle) = dbs.remove(&old_dbname) else { return StatusCode::INVALID_PARAMETER.0 };
    dbs.insert(new_dbname, db_handle);
    if let Some(db) = state.dbs.get_mut(&db_handle) {
        db.dbname = new_dbname;
    }
    0
}

fn create_db(state: &mut State, req: EnvCreateDbRequest) -> Message {
    let record_number = DbFlags::from_bits_truncate(req.flags).contains(DbFlags::RECORD_NUMBER);

    let db_handle = state.allocate();
    state.dbs.insert(
        db_handle,
        DbState {
            env_handle: req.env_handle,
            dbname: req.dbname,
            record_number,
            store: BTreeMap::new(),
            next_record_number: 1,
        },
    );
    state.envs.entry(req.env_handle).or_default().insert(req.dbname, db_handle);
    let db_flags = if record_number { DbFlags::RECORD_NUMBER.bits() } else { 0 };
    Message::EnvCreateDbReply(EnvCreateDbReply { status: 0, db_handle, db_flags })
}

fn open_db(state: &mut State, req: EnvOpenDbRequest) -> Message {
    let existing = state.envs.get(&req.env_handle).and_then(|dbs| dbs.get(&req.dbname).copied());
    match existing {
        Some(db_handle) => {
            let db_flags =
                if state.dbs[&db_handle].record_number { DbFlags::RECORD_NUMBER.bits() } else { 0 };
            Message::EnvOpenDbReply(EnvOpenDbReply { status: 0, db_handle, db_flags })
        },
        None => Message::EnvOpenDbReply(EnvOpenDbReply {
            status: StatusCode::KEY_NOT_FOUND.0,
            db_handle: 0,
            db_flags: 0,
        }),
    }
}

fn db_insert(state: &mut State, req: DbInsertRequest) -> Message {
    let overwrite = OperationFlags::from_bits_truncate(req.flags).contains(OperationFlags::OVERWRITE);
    match insert_common(state, req.db_handle, req.txn_handle, req.key, req.record, overwrite) {
        Ok((_, key)) => Message::DbInsertReply(DbInsertReply { status: 0, key }),
        Err(status) => Message::DbInsertReply(DbInsertReply { status, key: WireKey::default() }),
    }
}

/// Insert `key`/`record` into `db_handle` (under `txn_handle`, or directly if
/// `0`). Returns the store-order key actually written (so cursor operations
/// can position on it) alongside the wire-order key the reply carries back
/// to the caller — the two only differ for a record-number database (spec
/// §3, §9 "record-number key byte order on the wire vs. in the store").
fn insert_common(
    state: &mut State,
    db_handle: u64,
    txn_handle: u64,
    key: WireKey,
    record: WireRecord,
    overwrite: bool,
) -> Result<(Vec<u8>, WireKey), i32> {
    let Some(db) = state.dbs.get(&db_handle) else { return Err(StatusCode::INVALID_PARAMETER.0) };
    let record_number = db.record_number;

    let (store_key, wire_key) = if record_number {
        let db = state.dbs.get_mut(&db_handle).expect("checked above");
        let n = db.next_record_number;
        db.next_record_number += 1;
        let store_key = record_number_to_store_key(n);
        let wire = WireKey { data: Some(record_number_to_wire(n)), size: 8, flags: 0, intflags: 0 };
        (store_key, wire)
    } else {
        let Some(data) = key.data else { return Err(StatusCode::INVALID_PARAMETER.0) };
        (data, WireKey::default())
    };

    if !overwrite && state.view(db_handle, txn_handle).contains_key(&store_key) {
        return Err(StatusCode::DUPLICATE_KEY.0);
    }

    let record_bytes = record.data.unwrap_or_default();
    state.write(db_handle, txn_handle, store_key.clone(), record_bytes);
    Ok((store_key, wire_key))
}

fn db_erase(state: &mut State, db_handle: u64, txn_handle: u64, key: &WireKey) -> i32 {
    let Some(data) = &key.data else { return StatusCode::INVALID_PARAMETER.0 };
    let record_number = state.dbs.get(&db_handle).is_some_and(|db| db.record_number);
    let store_key = if record_number { record_number_wire_to_store(data) } else { data.clone() };
    if !state.view(db_handle, txn_handle).contains_key(&store_key) {
        return StatusCode::KEY_NOT_FOUND.0;
    }
    state.erase(db_handle, txn_handle, &store_key);
    0
}

fn db_find(state: &State, req: DbFindRequest) -> Message {
    let view = state.view(req.db_handle, req.txn_handle);
    let record_number = state.dbs.get(&req.db_handle).is_some_and(|db| db.record_number);
    let Some(requested) = &req.key.data else {
        return Message::DbFindReply(DbFindReply {
            status: StatusCode::INVALID_PARAMETER.0,
            key: WireKey::default(),
            record: WireRecord::default(),
        });
    };
    let store_requested = if record_number { record_number_wire_to_store(requested) } else { requested.clone() };
    match find_in(&view, &store_requested, req.flags) {
        Some((matched_key, matched_record)) => {
            let intflags = relation_bits(&matched_key, &store_requested);
            let wire_key = if record_number { record_number_store_to_wire(&matched_key) } else { matched_key };
            Message::DbFindReply(DbFindReply {
                status: 0,
                key: WireKey { data: Some(wire_key), size: 0, flags: 0, intflags },
                record: WireRecord { data: Some(matched_record), size: 0, flags: 0, partial_offset: 0, partial_size: 0 },
            })
        },
        None => Message::DbFindReply(DbFindReply {
            status: StatusCode::KEY_NOT_FOUND.0,
            key: WireKey::default(),
            record: WireRecord::default(),
        }),
    }
}

fn txn_begin(state: &mut State, req: TxnBeginRequest) -> Message {
    let txn_handle = state.allocate();
    state.txns.insert(
        txn_handle,
        TxnState { env_handle: req.env_handle, overlay: std::collections::HashMap::new() },
    );
    Message::TxnBeginReply(TxnBeginReply { status: 0, txn_handle })
}

fn commit_txn(state: &mut State, txn_handle: u64) {
    let Some(txn) = state.txns.remove(&txn_handle) else { return };
    for (db_handle, overlay) in txn.overlay {
        if let Some(db) = state.dbs.get_mut(&db_handle) {
            for (key, value) in overlay {
                match value {
                    Some(bytes) => {
                        db.store.insert(key, bytes);
                    },
                    None => {
                        db.store.remove(&key);
                    },
                }
            }
        }
    }
}

fn cursor_insert(state: &mut State, req: CursorInsertRequest) -> Message {
    let Some(cursor) = state.cursors.get(&req.cursor_handle) else {
        return Message::CursorInsertReply(CursorInsertReply {
            status: StatusCode::INVALID_PARAMETER.0,
            key: WireKey::default(),
        });
    };
    let (db_handle, txn_handle) = (cursor.db_handle, cursor.txn_handle);
    let overwrite = OperationFlags::from_bits_truncate(req.flags).contains(OperationFlags::OVERWRITE);
    match insert_common(state, db_handle, txn_handle, req.key, req.record, overwrite) {
        Ok((store_key, wire_key)) => {
            if let Some(cursor) = state.cursors.get_mut(&req.cursor_handle) {
                cursor.position = Some(store_key);
            }
            Message::CursorInsertReply(CursorInsertReply { status: 0, key: wire_key })
        },
        Err(status) => Message::CursorInsertReply(CursorInsertReply { status, key: WireKey::default() }),
    }
}

fn cursor_erase(state: &mut State, cursor_handle: u64) -> i32 {
    let Some(cursor) = state.cursors.get(&cursor_handle) else { return StatusCode::INVALID_PARAMETER.0 };
    let (db_handle, txn_handle) = (cursor.db_handle, cursor.txn_handle);
    let Some(position) = cursor.position.clone() else { return StatusCode::CURSOR_IS_NIL.0 };
    if !state.view(db_handle, txn_handle).contains_key(&position) {
        return StatusCode::KEY_NOT_FOUND.0;
    }
    state.erase(db_handle, txn_handle, &position);
    0
}

fn cursor_find(state: &mut State, req: CursorFindRequest) -> Message {
    let Some(cursor) = state.cursors.get(&req.cursor_handle) else {
        return Message::CursorFindReply(CursorFindReply {
            status: StatusCode::INVALID_PARAMETER.0,
            key: WireKey::default(),
            record: WireRecord::default(),
        });
    };
    let (db_handle, txn_handle) = (cursor.db_handle, cursor.txn_handle);
    let record_number = state.dbs.get(&db_handle).is_some_and(|db| db.record_number);
    let view = state.view(db_handle, txn_handle);
    let Some(requested) = &req.key.data else {
        return Message::CursorFindReply(CursorFindReply {
            status: StatusCode::INVALID_PARAMETER.0,
            key: WireKey::default(),
            record: WireRecord::default(),
        });
    };
    let store_requested = if record_number { record_number_wire_to_store(requested) } else { requested.clone() };
    match find_in(&view, &store_requested, req.flags) {
        Some((matched_key, matched_record)) => {
            let intflags = relation_bits(&matched_key, &store_requested);
            if let Some(cursor) = state.cursors.get_mut(&req.cursor_handle) {
                cursor.position = Some(matched_key.clone());
            }
            let wire_key = if record_number { record_number_store_to_wire(&matched_key) } else { matched_key };
            Message::CursorFindReply(CursorFindReply {
                status: 0,
                key: WireKey { data: Some(wire_key), size: 0, flags: 0, intflags },
                record: WireRecord { data: Some(matched_record), size: 0, flags: 0, partial_offset: 0, partial_size: 0 },
            })
        },
        None => Message::CursorFindReply(CursorFindReply {
            status: StatusCode::KEY_NOT_FOUND.0,
            key: WireKey::default(),
            record: WireRecord::default(),
        }),
    }
}

fn cursor_record_count(state: &State, cursor_handle: u64) -> i32 {
    let Some(cursor) = state.cursors.get(&cursor_handle) else { return StatusCode::INVALID_PARAMETER.0 };
    let Some(position) = &cursor.position else { return StatusCode::CURSOR_IS_NIL.0 };
    if state.view(cursor.db_handle, cursor.txn_handle).contains_key(position) { 0 } else { StatusCode::KEY_NOT_FOUND.0 }
}

fn cursor_overwrite(state: &mut State, req: CursorOverwriteRequest) -> Message {
    let Some(cursor) = state.cursors.get(&req.cursor_handle) else {
        return Message::CursorOverwriteReply(CursorOverwriteReply { status: StatusCode::INVALID_PARAMETER.0 });
    };
    let (db_handle, txn_handle) = (cursor.db_handle, cursor.txn_handle);
    let Some(position) = cursor.position.clone() else {
        return Message::CursorOverwriteReply(CursorOverwriteReply { status: StatusCode::CURSOR_IS_NIL.0 });
    };
    if !state.view(db_handle, txn_handle).contains_key(&position) {
        return Message::CursorOverwriteReply(CursorOverwriteReply { status: StatusCode::KEY_NOT_FOUND.0 });
    }
    state.write(db_handle, txn_handle, position, req.record.data.unwrap_or_default());
    Message::CursorOverwriteReply(CursorOverwriteReply { status: 0 })
}

fn cursor_move(state: &mut State, req: CursorMoveRequest) -> Message {
    let Some(cursor) = state.cursors.get(&req.cursor_handle) else {
        return Message::CursorMoveReply(CursorMoveReply {
            status: StatusCode::INVALID_PARAMETER.0,
            key: WireKey::default(),
            record: WireRecord::default(),
        });
    };
    let (db_handle, txn_handle, position) = (cursor.db_handle, cursor.txn_handle, cursor.position.clone());
    let record_number = state.dbs.get(&db_handle).is_some_and(|db| db.record_number);
    let view = state.view(db_handle, txn_handle);
    let flags = OperationFlags::from_bits_truncate(req.flags);

    let found = if flags.contains(OperationFlags::FIRST) {
        view.iter().next()
    } else if flags.contains(OperationFlags::LAST) {
        view.iter().next_back()
    } else if flags.contains(OperationFlags::NEXT) {
        match &position {
            Some(key) => view.range((Bound::Excluded(key.clone()), Bound::Unbounded)).next(),
            None => view.iter().next(),
        }
    } else if flags.contains(OperationFlags::PREVIOUS) {
        match &position {
            Some(key) => view.range((Bound::Unbounded, Bound::Excluded(key.clone()))).next_back(),
            None => view.iter().next_back(),
        }
    } else {
        position.as_ref().and_then(|key| view.get_key_value(key))
    }
    .map(|(k, v)| (k.clone(), v.clone()));

    match found {
        Some((key, record)) => {
            if let Some(cursor) = state.cursors.get_mut(&req.cursor_handle) {
                cursor.position = Some(key.clone());
            }
            let wire_key = if record_number { record_number_store_to_wire(&key) } else { key };
            Message::CursorMoveReply(CursorMoveReply {
                status: 0,
                key: WireKey { data: Some(wire_key), size: 0, flags: 0, intflags: 0 },
                record: WireRecord { data: Some(record), size: 0, flags: 0, partial_offset: 0, partial_size: 0 },
            })
        },
        None => Message::CursorMoveReply(CursorMoveReply {
            status: StatusCode::KEY_NOT_FOUND.0,
            key: WireKey::default(),
            record: WireRecord::default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamlink_proto::{ConnectRequest, key_flag_bits};

    fn connect(server: &Server) -> u64 {
        let Message::ConnectReply(reply) =
            server.handle(Message::ConnectRequest(ConnectRequest { path: "test.db".to_string() }))
        else {
            panic!("expected ConnectReply")
        };
        reply.env_handle
    }

    fn create_db(server: &Server, env_handle: u64, record_number: bool) -> u64 {
        let flags = if record_number { key_flag_bits::RECORD_NUMBER } else { 0 };
        let Message::EnvCreateDbReply(reply) = server.handle(Message::EnvCreateDbRequest(EnvCreateDbRequest {
            env_handle,
            dbname: 13,
            flags,
            params: Vec::new(),
        })) else {
            panic!("expected EnvCreateDbReply")
        };
        reply.db_handle
    }

    #[test]
    fn insert_then_find_round_trips_a_record() {
        let server = Server::new();
        let env = connect(&server);
        let db = create_db(&server, env, false);

        let Message::DbInsertReply(insert) = server.handle(Message::DbInsertRequest(DbInsertRequest {
            db_handle: db,
            txn_handle: 0,
            key: WireKey { data: Some(b"k".to_vec()), size: 1, flags: 0, intflags: 0 },
            record: WireRecord { data: Some(b"v".to_vec()), size: 1, flags: 0, partial_offset: 0, partial_size: 0 },
            flags: 0,
        })) else {
            panic!("expected DbInsertReply")
        };
        assert_eq!(insert.status, 0);

        let Message::DbFindReply(found) = server.handle(Message::DbFindRequest(DbFindRequest {
            db_handle: db,
            txn_handle: 0,
            key: WireKey { data: Some(b"k".to_vec()), size: 1, flags: 0, intflags: 0 },
            record: WireRecord::default(),
            flags: 0,
        })) else {
            panic!("expected DbFindReply")
        };
        assert_eq!(found.status, 0);
        assert_eq!(found.record.data, Some(b"v".to_vec()));
    }

    #[test]
    fn record_number_insert_assigns_little_endian_key() {
        let server = Server::new();
        let env = connect(&server);
        let db = create_db(&server, env, true);

        let Message::DbInsertReply(insert) = server.handle(Message::DbInsertRequest(DbInsertRequest {
            db_handle: db,
            txn_handle: 0,
            key: WireKey::default(),
            record: WireRecord { data: Some(b"x".to_vec()), size: 1, flags: 0, partial_offset: 0, partial_size: 0 },
            flags: 0,
        })) else {
            panic!("expected DbInsertReply")
        };
        assert_eq!(insert.status, 0);
        assert_eq!(insert.key.data, Some(1u64.to_le_bytes().to_vec()));
    }

    #[test]
    fn record_number_find_and_erase_use_the_key_insert_handed_back() {
        let server = Server::new();
        let env = connect(&server);
        let db = create_db(&server, env, true);

        let Message::DbInsertReply(insert) = server.handle(Message::DbInsertRequest(DbInsertRequest {
            db_handle: db,
            txn_handle: 0,
            key: WireKey::default(),
            record: WireRecord { data: Some(b"x".to_vec()), size: 1, flags: 0, partial_offset: 0, partial_size: 0 },
            flags: 0,
        })) else {
            panic!("expected DbInsertReply")
        };
        let assigned_key = insert.key.data.expect("record-number insert returns a key");

        let Message::DbFindReply(found) = server.handle(Message::DbFindRequest(DbFindRequest {
            db_handle: db,
            txn_handle: 0,
            key: WireKey { data: Some(assigned_key.clone()), size: 8, flags: 0, intflags: 0 },
            record: WireRecord::default(),
            flags: 0,
        })) else {
            panic!("expected DbFindReply")
        };
        assert_eq!(found.status, 0);
        assert_eq!(found.record.data, Some(b"x".to_vec()));
        assert_eq!(found.key.data, Some(assigned_key.clone()));

        let Message::DbEraseReply(erased) = server.handle(Message::DbEraseRequest(DbEraseRequest {
            db_handle: db,
            txn_handle: 0,
            key: WireKey { data: Some(assigned_key), size: 8, flags: 0, intflags: 0 },
            flags: 0,
        })) else {
            panic!("expected DbEraseReply")
        };
        assert_eq!(erased.status, 0);
    }

    #[test]
    fn txn_abort_discards_writes() {
        let server = Server::new();
        let env = connect(&server);
        let db = create_db(&server, env, false);

        let Message::TxnBeginReply(begin) =
            server.handle(Message::TxnBeginRequest(TxnBeginRequest { env_handle: env, name: None, flags: 0 }))
        else {
            panic!("expected TxnBeginReply")
        };

        server.handle(Message::DbInsertRequest(DbInsertRequest {
            db_handle: db,
            txn_handle: begin.txn_handle,
            key: WireKey { data: Some(b"a".to_vec()), size: 1, flags: 0, intflags: 0 },
            record: WireRecord { data: Some(b"1".to_vec()), size: 1, flags: 0, partial_offset: 0, partial_size: 0 },
            flags: 0,
        }));

        server.handle(Message::TxnAbortRequest(TxnAbortRequest { txn_handle: begin.txn_handle, flags: 0 }));

        let Message::DbFindReply(found) = server.handle(Message::DbFindRequest(DbFindRequest {
            db_handle: db,
            txn_handle: 0,
            key: WireKey { data: Some(b"a".to_vec()), size: 1, flags: 0, intflags: 0 },
            record: WireRecord::default(),
            flags: 0,
        })) else {
            panic!("expected DbFindReply")
        };
        assert_eq!(found.status, StatusCode::KEY_NOT_FOUND.0);
    }
}
