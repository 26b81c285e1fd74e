//! Index iterator tests
//!
//! Tests verify:
//! - Ascending and descending order over the whole snapshot
//! - Seek semantics in both directions
//! - Rewind after exhaustion
//! - Snapshot isolation from later index writes
//! - Close

use caskdb::data::LogRecordPos;
use caskdb::index::{BTree, IndexIterator, Indexer};

// =============================================================================
// Helper Functions
// =============================================================================

fn pos(offset: u64) -> LogRecordPos {
    LogRecordPos { file_id: 1, offset }
}

fn index_with_keys(keys: &[&[u8]]) -> BTree {
    let index = BTree::new();
    for (i, key) in keys.iter().enumerate() {
        index.put(key.to_vec(), pos(i as u64));
    }
    index
}

fn collect_keys(iter: &mut dyn IndexIterator) -> Vec<Vec<u8>> {
    let mut keys = Vec::new();
    while iter.valid() {
        keys.push(iter.key().to_vec());
        iter.next();
    }
    keys
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_empty_index_iterator_is_invalid() {
    let index = BTree::new();

    let mut iter = index.iterator(false);
    iter.rewind();
    assert!(!iter.valid());

    let mut iter = index.iterator(true);
    iter.seek(b"anything");
    assert!(!iter.valid());
}

#[test]
fn test_ascending_order() {
    let index = index_with_keys(&[b"cherry", b"apple", b"banana", b"b", b"\x00", b"\xff"]);

    let mut iter = index.iterator(false);
    iter.rewind();
    let keys = collect_keys(iter.as_mut());

    assert_eq!(
        keys,
        vec![
            b"\x00".to_vec(),
            b"apple".to_vec(),
            b"b".to_vec(),
            b"banana".to_vec(),
            b"cherry".to_vec(),
            b"\xff".to_vec(),
        ]
    );
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_descending_order() {
    let index = index_with_keys(&[b"cherry", b"apple", b"banana"]);

    let mut iter = index.iterator(true);
    iter.rewind();
    let keys = collect_keys(iter.as_mut());

    assert_eq!(keys, vec![b"cherry".to_vec(), b"banana".to_vec(), b"apple".to_vec()]);
    assert!(keys.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn test_values_follow_keys() {
    let index = BTree::new();
    index.put(b"a".to_vec(), pos(10));
    index.put(b"b".to_vec(), pos(20));

    let mut iter = index.iterator(false);
    iter.rewind();
    assert_eq!(iter.value(), pos(10));
    iter.next();
    assert_eq!(iter.value(), pos(20));
}

// =============================================================================
// Seek Tests
// =============================================================================

#[test]
fn test_seek_ascending() {
    let index = index_with_keys(&[b"aa", b"cc", b"ee"]);
    let mut iter = index.iterator(false);

    iter.seek(b"cc");
    assert_eq!(iter.key(), b"cc");

    iter.seek(b"bb");
    assert_eq!(iter.key(), b"cc");

    iter.seek(b"");
    assert_eq!(iter.key(), b"aa");

    iter.seek(b"ef");
    assert!(!iter.valid());
}

#[test]
fn test_seek_descending() {
    let index = index_with_keys(&[b"aa", b"cc", b"ee"]);
    let mut iter = index.iterator(true);

    iter.seek(b"cc");
    assert_eq!(iter.key(), b"cc");

    iter.seek(b"dd");
    assert_eq!(iter.key(), b"cc");

    iter.seek(b"zz");
    assert_eq!(iter.key(), b"ee");

    iter.seek(b"a");
    assert!(!iter.valid());
}

#[test]
fn test_seek_then_iterate() {
    let index = index_with_keys(&[b"k1", b"k2", b"k3", b"k4"]);

    let mut iter = index.iterator(false);
    iter.seek(b"k2");
    assert_eq!(collect_keys(iter.as_mut()), vec![b"k2".to_vec(), b"k3".to_vec(), b"k4".to_vec()]);

    let mut iter = index.iterator(true);
    iter.seek(b"k2");
    assert_eq!(collect_keys(iter.as_mut()), vec![b"k2".to_vec(), b"k1".to_vec()]);
}

// =============================================================================
// State Machine Tests
// =============================================================================

#[test]
fn test_rewind_after_exhaustion() {
    let index = index_with_keys(&[b"a", b"b"]);
    let mut iter = index.iterator(false);

    iter.rewind();
    assert_eq!(collect_keys(iter.as_mut()).len(), 2);
    assert!(!iter.valid());

    // Next past the end stays exhausted
    iter.next();
    assert!(!iter.valid());

    iter.rewind();
    assert!(iter.valid());
    assert_eq!(iter.key(), b"a");
}

#[test]
fn test_snapshot_isolation() {
    let index = index_with_keys(&[b"a", b"b"]);
    let mut iter = index.iterator(false);

    index.put(b"c".to_vec(), pos(99));
    index.delete(b"a");

    iter.rewind();
    assert_eq!(collect_keys(iter.as_mut()), vec![b"a".to_vec(), b"b".to_vec()]);

    let mut fresh = index.iterator(false);
    fresh.rewind();
    assert_eq!(collect_keys(fresh.as_mut()), vec![b"b".to_vec(), b"c".to_vec()]);
}

#[test]
fn test_close_releases_snapshot() {
    let index = index_with_keys(&[b"a", b"b"]);
    let mut iter = index.iterator(false);

    iter.rewind();
    assert!(iter.valid());

    iter.close();
    assert!(!iter.valid());
    iter.rewind();
    assert!(!iter.valid());
}
