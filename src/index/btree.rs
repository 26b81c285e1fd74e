//! BTree index
//!
//! BTreeMap-based index with RwLock for concurrency.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::data::LogRecordPos;

use super::{IndexIterator, Indexer};

/// Ordered index over `key → LogRecordPos`
#[derive(Default)]
pub struct BTree {
    tree: RwLock<BTreeMap<Vec<u8>, LogRecordPos>>,
}

impl BTree {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Indexer for BTree {
    fn put(&self, key: Vec<u8>, pos: LogRecordPos) -> bool {
        // Empty keys can never be addressed by the engine
        if key.is_empty() {
            return false;
        }
        self.tree.write().insert(key, pos);
        true
    }

    fn get(&self, key: &[u8]) -> Option<LogRecordPos> {
        self.tree.read().get(key).copied()
    }

    fn delete(&self, key: &[u8]) -> bool {
        self.tree.write().remove(key).is_some()
    }

    fn exists(&self, key: &[u8]) -> bool {
        self.tree.read().contains_key(key)
    }

    fn len(&self) -> usize {
        self.tree.read().len()
    }

    fn iterator(&self, reverse: bool) -> Box<dyn IndexIterator> {
        let tree = self.tree.read();
        let items: Vec<(Vec<u8>, LogRecordPos)> = if reverse {
            tree.iter().rev().map(|(k, v)| (k.clone(), *v)).collect()
        } else {
            tree.iter().map(|(k, v)| (k.clone(), *v)).collect()
        };
        Box::new(BTreeIterator::new(items, reverse))
    }
}

/// Snapshot iterator over a `BTree`
///
/// Holds its own sorted copy of the entries, so later index writes are not visible.
pub struct BTreeIterator {
    /// Entries in iteration order (descending when `reverse`)
    items: Vec<(Vec<u8>, LogRecordPos)>,
    /// Current position; `items.len()` means exhausted
    cursor: usize,
    reverse: bool,
}

impl BTreeIterator {
    fn new(items: Vec<(Vec<u8>, LogRecordPos)>, reverse: bool) -> Self {
        Self {
            items,
            cursor: 0,
            reverse,
        }
    }
}

impl IndexIterator for BTreeIterator {
    fn rewind(&mut self) {
        self.cursor = 0;
    }

    fn seek(&mut self, key: &[u8]) {
        // The snapshot is sorted in iteration order, so a partition point is the target
        self.cursor = if self.reverse {
            self.items.partition_point(|(k, _)| k.as_slice() > key)
        } else {
            self.items.partition_point(|(k, _)| k.as_slice() < key)
        };
    }

    fn next(&mut self) {
        if self.cursor < self.items.len() {
            self.cursor += 1;
        }
    }

    fn valid(&self) -> bool {
        self.cursor < self.items.len()
    }

    fn key(&self) -> &[u8] {
        debug_assert!(self.valid(), "key() on an invalid iterator");
        &self.items[self.cursor].0
    }

    fn value(&self) -> LogRecordPos {
        debug_assert!(self.valid(), "value() on an invalid iterator");
        self.items[self.cursor].1
    }

    fn close(&mut self) {
        self.items = Vec::new();
        self.cursor = 0;
    }
}
