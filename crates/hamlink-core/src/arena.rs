//! Per-database and per-transaction memory arenas.
//!
//! Two arenas per database (key, record), plus two per non-temporary
//! transaction (spec §4.5). Each is an expandable byte buffer that a call
//! resizes and fills with the bytes a reply carried back for that scope.
//!
//! The original design this is modeled on hands the caller a raw pointer
//! into the arena's buffer, valid until the next call on the same scope.
//! A session here is held behind an `async`-aware `Mutex`, so nothing can
//! borrow out of it past the end of the call that took the lock without
//! `unsafe` — which this workspace forbids. Callers therefore get an owned
//! copy of the same bytes; the arena still does the resizing a caller
//! relying on `get_parameters(RecordSize)` + a reused buffer would expect,
//! and still exists as the place invariant 6 is checked against in tests.

/// A single expandable byte buffer, keyed by (scope, kind) at the call
/// site. Not thread-safe on its own; callers hold the session lock (spec
/// §5).
#[derive(Debug, Default, Clone)]
pub struct Arena {
    buf: Vec<u8>,
}

impl Arena {
    /// An empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize to exactly `len` bytes. Existing contents are not preserved
    /// (spec: "preserves no contents").
    pub fn resize(&mut self, len: usize) {
        self.buf.clear();
        self.buf.resize(len, 0);
    }

    /// Resize to `bytes.len()` and copy `bytes` in.
    pub fn fill(&mut self, bytes: &[u8]) {
        self.resize(bytes.len());
        self.buf.copy_from_slice(bytes);
    }

    /// The arena's current contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Current length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the arena currently holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// The four arenas owned by a database, or the two owned by a durable
/// (non-`TEMPORARY`) transaction.
#[derive(Debug, Default, Clone)]
pub struct ArenaPair {
    /// Staging buffer for decoded key bytes.
    pub key: Arena,
    /// Staging buffer for decoded record bytes.
    pub record: Arena,
}

/// Which arena pair an operation should stage its reply bytes into.
///
/// A `TEMPORARY` transaction has no arenas of its own; it shares its parent
/// database's (spec §3, §4.5).
#[derive(Debug)]
pub enum ArenaScope<'a> {
    /// Use the database's own arenas.
    Database(&'a mut ArenaPair),
    /// Use a durable transaction's own arenas.
    Transaction(&'a mut ArenaPair),
}

impl ArenaScope<'_> {
    /// Borrow the underlying arena pair regardless of which scope it came
    /// from.
    pub fn pair(&mut self) -> &mut ArenaPair {
        match self {
            Self::Database(pair) | Self::Transaction(pair) => pair,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_does_not_preserve_contents() {
        let mut arena = Arena::new();
        arena.fill(b"hello");
        arena.resize(3);
        assert_eq!(arena.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn fill_replaces_contents_exactly() {
        let mut arena = Arena::new();
        arena.fill(b"abc");
        assert_eq!(arena.as_slice(), b"abc");
        arena.fill(b"xy");
        assert_eq!(arena.as_slice(), b"xy");
    }
}
