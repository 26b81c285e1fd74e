//! Index Module
//!
//! In-memory mapping from key to the position of its latest record.
//!
//! ## Responsibilities
//! - Point lookups without touching disk
//! - Reflect exactly the most recent non-deleted write per key
//! - Ordered snapshot iteration with seek (for fold / list_keys)
//!
//! ## Data Structure Choice
//! Using BTreeMap wrapped in RwLock:
//! - Ordered keys (byte-lexicographic) for iteration and seek
//! - Many concurrent readers, one writer
//! - Other structures plug in behind the `Indexer` trait

mod btree;

use crate::config::IndexKind;
use crate::data::LogRecordPos;

pub use btree::{BTree, BTreeIterator};

/// Key → position index, internally synchronized
pub trait Indexer: Send + Sync {
    /// Insert or replace; `false` if the index refused the entry
    fn put(&self, key: Vec<u8>, pos: LogRecordPos) -> bool;

    /// Position of the latest record for `key`
    fn get(&self, key: &[u8]) -> Option<LogRecordPos>;

    /// Remove `key`; `true` iff it was present
    fn delete(&self, key: &[u8]) -> bool;

    fn exists(&self, key: &[u8]) -> bool;

    /// Number of live keys
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time snapshot iterator, ascending or (if `reverse`) descending
    fn iterator(&self, reverse: bool) -> Box<dyn IndexIterator>;
}

/// Cursor over an index snapshot
///
/// ```text
/// unpositioned ──rewind/seek──▶ positioned ──next (past end)──▶ exhausted
///                                   ▲                              │
///                                   └──────────rewind/seek─────────┘
/// ```
///
/// `key()` and `value()` may only be called while `valid()` is true.
pub trait IndexIterator: Send {
    /// Go back to the first entry in iteration order
    fn rewind(&mut self);

    /// Ascending: first key ≥ `key`. Descending: first key ≤ `key`.
    fn seek(&mut self, key: &[u8]);

    fn next(&mut self);

    fn valid(&self) -> bool;

    fn key(&self) -> &[u8];

    fn value(&self) -> LogRecordPos;

    /// Release the snapshot; the iterator is invalid afterwards
    fn close(&mut self);
}

/// Create an empty index of the requested kind
pub fn new_indexer(kind: IndexKind) -> Box<dyn Indexer> {
    match kind {
        IndexKind::BTree => Box::new(BTree::new()),
    }
}
