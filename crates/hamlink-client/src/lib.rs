//! Client session and operation surface for the hamlink remote storage
//! protocol (spec §4.4, §4.6).
//!
//! [`Client`] owns an environment session (handle table, arenas, statistics,
//! transport, and negotiated encoding, all behind one lock per spec §5).
//! [`Database`], [`Transaction`], and [`Cursor`] are cheap handles into that
//! shared session, mirroring spec §4.6's operation surface one-to-one:
//!
//! - `Client`: `env_connect`/`env_disconnect`/`env_get_parameters`/
//!   `env_get_database_names`/`env_rename_db`/`env_flush`/`env_create_db`/
//!   `env_open_db`/`env_erase_db`, plus `txn_begin`.
//! - `Database`: `db_close`/`db_get_parameters`/`db_check_integrity`/
//!   `db_get_key_count`/`db_insert`/`db_erase`/`db_find`, plus `cursor_create`.
//! - `Transaction`: `txn_commit`/`txn_abort`.
//! - `Cursor`: `cursor_clone`/`cursor_close`/`cursor_insert`/`cursor_erase`/
//!   `cursor_find`/`cursor_overwrite`/`cursor_move`/`cursor_get_record_count`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod config;
mod cursor;
mod database;
mod record;
mod session;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use cursor::Cursor;
pub use database::Database;
pub use hamlink_core::{HamError, Result};
pub use record::{Found, Key, Record};
pub use transaction::Transaction;
pub use transport::Transport;

mod transaction;
