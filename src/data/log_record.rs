//! Log record definitions
//!
//! Defines the records appended to data files and the positions that point at them.

use std::fmt;

use bytes::Bytes;

/// Kind of a log record, stored as a single byte on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogRecordType {
    /// Tombstone: the key was deleted
    Deleted = 0,

    /// A live key/value pair
    Normal = 1,
}

impl LogRecordType {
    /// Decode the on-disk type byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(LogRecordType::Deleted),
            1 => Some(LogRecordType::Normal),
            _ => None,
        }
    }
}

/// A single record appended to a data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub key: Bytes,
    pub value: Bytes,
    pub rec_type: LogRecordType,
}

impl LogRecord {
    /// Create a normal key/value record
    pub fn normal(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            rec_type: LogRecordType::Normal,
        }
    }

    /// Create a tombstone for `key` (empty value)
    pub fn tombstone(key: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: Bytes::new(),
            rec_type: LogRecordType::Deleted,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.rec_type == LogRecordType::Deleted
    }
}

/// Location of a record: which data file, and where in it
///
/// Produced once by a successful append and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogRecordPos {
    pub file_id: u32,
    pub offset: u64,
}

impl fmt::Display for LogRecordPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_id={}, offset={}", self.file_id, self.offset)
    }
}

/// A record decoded from a data file, with the number of bytes it occupied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadLogRecord {
    pub record: LogRecord,
    pub size: usize,
}
