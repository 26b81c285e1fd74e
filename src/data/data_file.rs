//! Data File
//!
//! One append-only log file: its id, its write offset, and the codec over its handle.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CaskError, Result};
use crate::fio::{self, IoManager};

use super::{LogRecord, LogRecordCodec, ReadLogRecord};

/// Suffix shared by every data file name
pub const DATA_FILE_SUFFIX: &str = ".data";

/// Digits in a data file name's id part
const FILE_ID_DIGITS: usize = 9;

/// A single data file
///
/// ## Concurrency:
/// - `write_offset`: Atomic, only advanced by the engine while it holds its write lock
/// - Reads are positioned, so any number of threads may read concurrently
pub struct DataFile {
    file_id: u32,

    /// Bytes appended so far (replay restores it for the active file)
    write_offset: AtomicU64,

    codec: LogRecordCodec,
}

impl DataFile {
    /// Open or create the data file with `file_id` inside `dir`
    pub fn open(dir: &Path, file_id: u32) -> Result<Self> {
        let path = data_file_path(dir, file_id);
        let io = fio::new_io_manager(&path)?;
        Ok(Self::with_io(file_id, io))
    }

    fn with_io(file_id: u32, io: Box<dyn IoManager>) -> Self {
        Self {
            file_id,
            write_offset: AtomicU64::new(0),
            codec: LogRecordCodec::new(io),
        }
    }

    pub fn file_id(&self) -> u32 {
        self.file_id
    }

    pub fn write_offset(&self) -> u64 {
        self.write_offset.load(Ordering::SeqCst)
    }

    /// Restore the write offset after replaying the file
    pub fn set_write_offset(&self, offset: u64) {
        self.write_offset.store(offset, Ordering::SeqCst);
    }

    /// Size `record` would occupy once written (pre-flight rotation check)
    pub fn encoded_size(&self, record: &LogRecord) -> usize {
        LogRecordCodec::encoded_size(record)
    }

    /// Append a record and advance the write offset
    ///
    /// A failed append leaves the file exactly `write_offset` bytes long, so
    /// the next record still lands at the position the engine hands out.
    pub fn write_record(&self, record: &LogRecord) -> Result<usize> {
        let offset = self.write_offset();

        match self.codec.encode_log_record(record) {
            Ok(written) => {
                self.write_offset.fetch_add(written as u64, Ordering::SeqCst);
                Ok(written)
            }
            // Encoding errors fail before any byte is written
            Err(e @ CaskError::Io(_)) => {
                self.rollback_partial_write(offset);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Drop whatever part of a failed append reached the file
    fn rollback_partial_write(&self, offset: u64) {
        if let Err(e) = self.codec.truncate(offset) {
            // Torn bytes stay on disk; keep positions aligned with the physical end
            tracing::error!(
                file_id = self.file_id,
                offset,
                error = %e,
                "failed to roll back partial write"
            );
            if let Ok(size) = self.codec.size() {
                self.set_write_offset(size);
            }
        }
    }

    /// Read the record at `offset`; `None` at end of file
    pub fn read_record(&self, offset: u64) -> Result<Option<ReadLogRecord>> {
        self.codec.decode_log_record(offset)
    }

    /// Flush to durable storage
    pub fn sync(&self) -> Result<()> {
        self.codec.sync()
    }

    /// Final sync before the handle is released
    ///
    /// The OS handle itself closes when the last reference is dropped.
    pub fn close(&self) -> Result<()> {
        self.codec.sync()
    }

    /// Size of the file on disk
    pub fn size(&self) -> Result<u64> {
        self.codec.size()
    }
}

/// Path of the data file with `file_id`: `{dir}/000000001.data`
pub fn data_file_path(dir: &Path, file_id: u32) -> PathBuf {
    dir.join(format!("{:09}{}", file_id, DATA_FILE_SUFFIX))
}

/// Parse the file id from a data file name
/// "000000042.data" → Ok(Some(42)), "LOCK" → Ok(None), "abc.data" / "42.data" → Err(DataFileDamaged)
///
/// Only the exact name `data_file_path` produces is accepted, otherwise the
/// engine would open a different file than the one it found.
pub fn parse_file_id(file_name: &str) -> Result<Option<u32>> {
    let Some(stem) = file_name.strip_suffix(DATA_FILE_SUFFIX) else {
        return Ok(None);
    };

    let damaged =
        || CaskError::DataFileDamaged(format!("invalid data file name '{}'", file_name));

    if stem.len() != FILE_ID_DIGITS || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return Err(damaged());
    }

    stem.parse::<u32>().map(Some).map_err(|_| damaged())
}
