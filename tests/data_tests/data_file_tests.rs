//! Tests for DataFile
//!
//! These tests verify:
//! - File naming (9-digit zero-padded id + ".data")
//! - Write offset bookkeeping across appends
//! - Positioned reads of earlier records
//! - Reopening an existing file

use caskdb::data::{data_file_path, parse_file_id, DataFile, LogRecord, LogRecordType};
use caskdb::CaskError;
use tempfile::TempDir;

// =============================================================================
// Naming Tests
// =============================================================================

#[test]
fn test_data_file_path_format() {
    let temp_dir = TempDir::new().unwrap();

    let path = data_file_path(temp_dir.path(), 1);
    assert_eq!(path.file_name().unwrap(), "000000001.data");

    let path = data_file_path(temp_dir.path(), 123_456_789);
    assert_eq!(path.file_name().unwrap(), "123456789.data");
}

#[test]
fn test_parse_file_id() {
    assert_eq!(parse_file_id("000000001.data").unwrap(), Some(1));
    assert_eq!(parse_file_id("000000042.data").unwrap(), Some(42));
    assert_eq!(parse_file_id("123456789.data").unwrap(), Some(123_456_789));

    // Not a data file at all
    assert_eq!(parse_file_id("LOCK").unwrap(), None);
    assert_eq!(parse_file_id("000000001.hint").unwrap(), None);
}

#[test]
fn test_parse_malformed_file_id() {
    // Names data_file_path would never produce, even when the id parses
    for name in [
        "abc.data",
        ".data",
        "0001x.data",
        "99999999999.data",
        "1.data",
        "+1.data",
        "+00000001.data",
        "0000000001.data",
    ] {
        let result = parse_file_id(name);
        assert!(
            matches!(result, Err(CaskError::DataFileDamaged(_))),
            "{} should be rejected",
            name
        );
    }
}

// =============================================================================
// Open / Write / Read Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let temp_dir = TempDir::new().unwrap();

    let data_file = DataFile::open(temp_dir.path(), 1).unwrap();

    assert_eq!(data_file.file_id(), 1);
    assert_eq!(data_file.write_offset(), 0);
    assert!(temp_dir.path().join("000000001.data").exists());
}

#[test]
fn test_write_advances_offset() {
    let temp_dir = TempDir::new().unwrap();
    let data_file = DataFile::open(temp_dir.path(), 1).unwrap();

    let record = LogRecord::normal(&b"hello"[..], &b"world"[..]);
    assert_eq!(data_file.encoded_size(&record), 17);

    let written = data_file.write_record(&record).unwrap();
    assert_eq!(written, 17);
    assert_eq!(data_file.write_offset(), 17);

    data_file.write_record(&record).unwrap();
    assert_eq!(data_file.write_offset(), 34);
    assert_eq!(data_file.size().unwrap(), 34);
}

#[test]
fn test_read_records_at_offsets() {
    let temp_dir = TempDir::new().unwrap();
    let data_file = DataFile::open(temp_dir.path(), 1).unwrap();

    let first = LogRecord::normal(&b"hello"[..], &b"world"[..]);
    let second = LogRecord::tombstone(&b"hello"[..]);
    data_file.write_record(&first).unwrap();
    let second_offset = data_file.write_offset();
    data_file.write_record(&second).unwrap();

    let read = data_file.read_record(0).unwrap().unwrap();
    assert_eq!(read.record, first);
    assert_eq!(read.size, 17);

    let read = data_file.read_record(second_offset).unwrap().unwrap();
    assert_eq!(read.record.rec_type, LogRecordType::Deleted);
    assert_eq!(read.record.key.as_ref(), b"hello");

    assert!(data_file.read_record(data_file.write_offset()).unwrap().is_none());
}

#[test]
fn test_reopen_existing_file() {
    let temp_dir = TempDir::new().unwrap();

    {
        let data_file = DataFile::open(temp_dir.path(), 3).unwrap();
        data_file.write_record(&LogRecord::normal(&b"k1"[..], &b"v1"[..])).unwrap();
        data_file.write_record(&LogRecord::normal(&b"k2"[..], &b"v2"[..])).unwrap();
        data_file.close().unwrap();
    }

    let data_file = DataFile::open(temp_dir.path(), 3).unwrap();

    // Offset is restored by replay, not by open
    assert_eq!(data_file.write_offset(), 0);

    let first = data_file.read_record(0).unwrap().unwrap();
    let second = data_file.read_record(first.size as u64).unwrap().unwrap();
    assert_eq!(first.record.key.as_ref(), b"k1");
    assert_eq!(second.record.value.as_ref(), b"v2");

    // Appends land after the existing bytes
    data_file.set_write_offset(data_file.size().unwrap());
    let offset = data_file.write_offset();
    data_file.write_record(&LogRecord::normal(&b"k3"[..], &b"v3"[..])).unwrap();
    let third = data_file.read_record(offset).unwrap().unwrap();
    assert_eq!(third.record.key.as_ref(), b"k3");
}

#[test]
fn test_sync_and_close() {
    let temp_dir = TempDir::new().unwrap();
    let data_file = DataFile::open(temp_dir.path(), 1).unwrap();

    data_file.write_record(&LogRecord::normal(&b"k"[..], &b"v"[..])).unwrap();
    data_file.sync().unwrap();
    data_file.close().unwrap();
}
