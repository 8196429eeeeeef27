//! Opaque 64-bit handle types and the client-side handle table.
//!
//! A handle is non-zero while live; zero means "absent" (spec §3). Child
//! handles (database, transaction, cursor) are tracked alongside the parent
//! they belong to so that closing a parent can invalidate its children
//! locally, without the client needing to round-trip to check.

use std::collections::HashMap;

macro_rules! handle_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw handle value returned by the server.
            ///
            /// # Panics
            /// Panics if `value == 0`; a zero handle means "absent" and
            /// must never be wrapped as live.
            #[must_use]
            pub fn new(value: u64) -> Self {
                assert_ne!(value, 0, "handle value must be non-zero");
                Self(value)
            }

            /// The raw wire value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

handle_newtype!(EnvHandle, "An environment handle, returned by `connect`.");
handle_newtype!(DbHandle, "A database handle, returned by `env_create_db`/`env_open_db`.");
handle_newtype!(TxnHandle, "A transaction handle, returned by `txn_begin`.");
handle_newtype!(CursorHandle, "A cursor handle, returned by `cursor_create`/`cursor_clone`.");

/// Any handle kind tracked by the handle table, for invalidation bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyHandle {
    Db(DbHandle),
    Txn(TxnHandle),
    Cursor(CursorHandle),
}

/// Tracks child handles under their parent environment, database, or
/// cursor, so a parent close can invalidate its children locally.
///
/// This is bookkeeping only: whether the server would also reject a stale
/// child handle is left to the server (spec §4.4). The client's contract is
/// simply that it must not itself issue a request against a handle it has
/// already invalidated.
#[derive(Debug, Default)]
pub struct HandleTable {
    db_parent: HashMap<DbHandle, EnvHandle>,
    txn_parent: HashMap<TxnHandle, EnvHandle>,
    cursor_parent: HashMap<CursorHandle, DbHandle>,
    live: std::collections::HashSet<AnyHandle>,
}

impl HandleTable {
    /// An empty handle table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly opened database under its environment.
    pub fn insert_db(&mut self, db: DbHandle, env: EnvHandle) {
        self.db_parent.insert(db, env);
        self.live.insert(AnyHandle::Db(db));
    }

    /// Record a newly begun transaction under its environment.
    pub fn insert_txn(&mut self, txn: TxnHandle, env: EnvHandle) {
        self.txn_parent.insert(txn, env);
        self.live.insert(AnyHandle::Txn(txn));
    }

    /// Record a newly created cursor under its database.
    pub fn insert_cursor(&mut self, cursor: CursorHandle, db: DbHandle) {
        self.cursor_parent.insert(cursor, db);
        self.live.insert(AnyHandle::Cursor(cursor));
    }

    /// Whether `handle` is currently tracked as live.
    #[must_use]
    pub fn is_live(&self, handle: AnyHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Close a database: drops it and any cursors whose parent it was.
    pub fn remove_db(&mut self, db: DbHandle) {
        self.db_parent.remove(&db);
        self.live.remove(&AnyHandle::Db(db));
        let stale: Vec<CursorHandle> =
            self.cursor_parent.iter().filter(|(_, parent)| **parent == db).map(|(c, _)| *c).collect();
        for cursor in stale {
            self.remove_cursor(cursor);
        }
    }

    /// Close a transaction.
    pub fn remove_txn(&mut self, txn: TxnHandle) {
        self.txn_parent.remove(&txn);
        self.live.remove(&AnyHandle::Txn(txn));
    }

    /// Close a cursor.
    pub fn remove_cursor(&mut self, cursor: CursorHandle) {
        self.cursor_parent.remove(&cursor);
        self.live.remove(&AnyHandle::Cursor(cursor));
    }

    /// Drop every handle belonging to `env` (called on disconnect).
    pub fn remove_env(&mut self, env: EnvHandle) {
        let dbs: Vec<DbHandle> = self.db_parent.iter().filter(|(_, p)| **p == env).map(|(d, _)| *d).collect();
        for db in dbs {
            self.remove_db(db);
        }
        let txns: Vec<TxnHandle> =
            self.txn_parent.iter().filter(|(_, p)| **p == env).map(|(t, _)| *t).collect();
        for txn in txns {
            self.remove_txn(txn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "non-zero")]
    fn zero_handle_panics() {
        let _ = DbHandle::new(0);
    }

    #[test]
    fn closing_db_invalidates_its_cursors() {
        let mut table = HandleTable::new();
        let env = EnvHandle::new(1);
        let db = DbHandle::new(2);
        let cursor = CursorHandle::new(3);

        table.insert_db(db, env);
        table.insert_cursor(cursor, db);
        assert!(table.is_live(AnyHandle::Cursor(cursor)));

        table.remove_db(db);
        assert!(!table.is_live(AnyHandle::Db(db)));
        assert!(!table.is_live(AnyHandle::Cursor(cursor)));
    }

    #[test]
    fn closing_env_invalidates_all_children() {
        let mut table = HandleTable::new();
        let env = EnvHandle::new(1);
        let db = DbHandle::new(2);
        let txn = TxnHandle::new(4);

        table.insert_db(db, env);
        table.insert_txn(txn, env);
        table.remove_env(env);

        assert!(!table.is_live(AnyHandle::Db(db)));
        assert!(!table.is_live(AnyHandle::Txn(txn)));
    }
}
