//! Data model for the remote storage-engine access layer.
//!
//! Handle newtypes, flag bitsets, per-scope memory arenas, parameter names,
//! the `BtreeStatistics` hint core, and the unified error taxonomy. Nothing
//! in this crate performs I/O; `hamlink-client` wires these types to the
//! wire codec in `hamlink-proto` and a transport.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod arena;
pub mod error;
pub mod flags;
pub mod handle;
pub mod params;
pub mod stats;

pub use arena::{Arena, ArenaPair, ArenaScope};
pub use error::{HamError, NetworkError, Result, StatusCode};
pub use flags::{ApproxMatch, DbFlags, KeyFlags, OperationFlags, RecordFlags, TxnFlags};
pub use handle::{AnyHandle, CursorHandle, DbHandle, EnvHandle, HandleTable, TxnHandle};
pub use params::ParamName;
pub use stats::{BtreeStatistics, FindHints, InsertHints, OperationKind};
