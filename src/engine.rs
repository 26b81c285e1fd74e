//! Engine Module
//!
//! The core storage engine that coordinates data files and the index.
//!
//! ## Responsibilities
//! - Route writes to the active data file, rotating it at the size threshold
//! - Route reads to the data file named by the index position
//! - Write tombstones for deletes
//! - Rebuild the index on startup by replaying every data file

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::config::{Config, SyncPolicy};
use crate::data::{self, DataFile, LogRecord, LogRecordCodec, LogRecordPos, LogRecordType};
use crate::error::{CaskError, Result};
use crate::index::{self, Indexer};
use crate::util;

/// Id given to the first data file of an empty directory
const INITIAL_FILE_ID: u32 = 1;

/// The main storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put/delete): Serialized by the `files` write lock
///   - Held for append → (rotate) → index update, so each record gets a
///     well-defined position and index updates land in append order
///
/// - **Reads** (get/fold/list_keys): Concurrent
///   - Index lookups use the index's own RwLock
///   - The `files` read lock is held only to pick the data file; the
///     positioned read itself runs without it (immutable files never change,
///     the active file only grows)
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Active + immutable data files (the only engine-level mutable state)
    files: RwLock<FileSet>,

    /// Key → position (internal RwLock)
    index: Box<dyn Indexer>,
}

/// Data files known to the engine
#[derive(Default)]
struct FileSet {
    /// Writable file with the highest id; created lazily on first write
    active: Option<Arc<DataFile>>,

    /// Read-only files, keyed by id
    older: HashMap<u32, Arc<DataFile>>,

    /// Every known file id, ascending
    file_ids: Vec<u32>,

    /// Appends since the active file was last synced
    writes_since_sync: usize,
}

impl FileSet {
    /// Look up a file by id: active first, then the immutable set
    fn get(&self, file_id: u32) -> Option<&Arc<DataFile>> {
        match &self.active {
            Some(active) if active.file_id() == file_id => Some(active),
            _ => self.older.get(&file_id),
        }
    }

    /// Open a fresh data file and make it the active one
    fn open_active(&mut self, dir: &Path, file_id: u32) -> Result<Arc<DataFile>> {
        let data_file = Arc::new(DataFile::open(dir, file_id)?);
        self.active = Some(Arc::clone(&data_file));
        self.file_ids.push(file_id);
        Ok(data_file)
    }
}

/// Engine statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    /// Live keys in the index
    pub key_count: usize,

    /// Data files, active included
    pub data_file_count: usize,

    /// Bytes used by the data directory (stale records included)
    pub disk_size: u64,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate config, create the data directory
    /// 2. Open every `*.data` file; the highest id becomes active
    /// 3. Replay all files in id order to rebuild the index
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.dir_path)?;

        let files = Self::load_data_files(&config.dir_path)?;
        let index = index::new_indexer(config.index_kind);

        let engine = Self {
            config,
            files: RwLock::new(files),
            index,
        };
        engine.load_index_from_data_files()?;

        tracing::info!(
            dir = %engine.config.dir_path.display(),
            data_files = engine.files.read().file_ids.len(),
            keys = engine.index.len(),
            "engine opened"
        );

        Ok(engine)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.dir_path = path.to_path_buf();
        Self::open(config)
    }

    /// Get the value of a key
    ///
    /// Returns `KeyNotFound` if the key was never written or has been deleted.
    pub fn get(&self, key: &[u8]) -> Result<Bytes> {
        if !util::is_valid_key(key) {
            return Err(CaskError::KeyInvalid);
        }

        let pos = self.index.get(key).ok_or(CaskError::KeyNotFound)?;
        self.value_at(pos)
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Acquire the files write lock
    /// 2. Append a normal record (rotating if needed)
    /// 3. Point the index at the new record
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if !util::is_valid_key(key) {
            return Err(CaskError::KeyInvalid);
        }

        let record = LogRecord::normal(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value));

        let mut files = self.files.write();
        let pos = self.append_log_record(&mut files, &record)?;

        // The record is durable from here on; only the index can still fail
        if !self.index.put(key.to_vec(), pos) {
            return Err(CaskError::IndexUpdateFailed);
        }

        Ok(())
    }

    /// Delete a key
    ///
    /// Deleting an absent key is a no-op. Otherwise a tombstone is appended
    /// and the key leaves the index.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        if !util::is_valid_key(key) {
            return Err(CaskError::KeyInvalid);
        }

        let mut files = self.files.write();
        if !self.index.exists(key) {
            return Ok(());
        }

        let record = LogRecord::tombstone(Bytes::copy_from_slice(key));
        self.append_log_record(&mut files, &record)?;

        if !self.index.delete(key) {
            return Err(CaskError::IndexUpdateFailed);
        }

        Ok(())
    }

    /// Visit every live key/value pair in ascending key order
    ///
    /// Stops early when `visit` returns `false`. Works on a snapshot of the
    /// index taken at call time.
    pub fn fold<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        let mut iter = self.index.iterator(false);
        iter.rewind();

        while iter.valid() {
            let value = self.value_at(iter.value())?;
            if !visit(iter.key(), &value) {
                break;
            }
            iter.next();
        }

        iter.close();
        Ok(())
    }

    /// All live keys, ascending
    pub fn list_keys(&self) -> Vec<Bytes> {
        let mut iter = self.index.iterator(false);
        let mut keys = Vec::with_capacity(self.index.len());

        iter.rewind();
        while iter.valid() {
            keys.push(Bytes::copy_from_slice(iter.key()));
            iter.next();
        }

        iter.close();
        keys
    }

    /// Flush the active data file to durable storage
    pub fn sync(&self) -> Result<()> {
        let mut files = self.files.write();
        if let Some(active) = &files.active {
            active.sync()?;
        }
        files.writes_since_sync = 0;
        Ok(())
    }

    /// Close the engine gracefully
    ///
    /// Syncs and closes the active file, then closes every immutable file.
    /// All files are attempted; the first error is returned.
    pub fn close(self) -> Result<()> {
        self.close_files()?;
        tracing::info!(dir = %self.config.dir_path.display(), "engine closed");
        Ok(())
    }

    /// Current engine statistics
    pub fn stat(&self) -> Result<Stat> {
        let data_file_count = {
            let files = self.files.read();
            files.older.len() + usize::from(files.active.is_some())
        };

        Ok(Stat {
            key_count: self.index.len(),
            data_file_count,
            disk_size: util::dir_disk_size(&self.config.dir_path)?,
        })
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn dir_path(&self) -> &Path {
        &self.config.dir_path
    }

    /// Ids of all known data files, ascending
    pub fn file_ids(&self) -> Vec<u32> {
        self.files.read().file_ids.clone()
    }

    /// Id of the active data file (None until the first write on an empty directory)
    pub fn active_file_id(&self) -> Option<u32> {
        self.files.read().active.as_ref().map(|f| f.file_id())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Append a record to the active file (called with the files write lock held)
    ///
    /// 1. Lazily create the first active file
    /// 2. Rotate if the record would reach `max_file_size`
    /// 3. Append, then sync according to the policy
    fn append_log_record(&self, files: &mut FileSet, record: &LogRecord) -> Result<LogRecordPos> {
        let dir = &self.config.dir_path;

        let mut active = match files.active.clone() {
            Some(active) => active,
            None => files.open_active(dir, INITIAL_FILE_ID)?,
        };

        let size = LogRecordCodec::encoded_size(record) as u64;
        if active.write_offset() + size >= self.config.max_file_size {
            active.sync()?;
            files.writes_since_sync = 0;

            let next_id = active.file_id().checked_add(1).ok_or_else(|| {
                CaskError::DataFileDamaged("data file id space exhausted".to_string())
            })?;
            tracing::info!(
                from = active.file_id(),
                to = next_id,
                bytes = active.write_offset(),
                "rotating active data file"
            );

            files.older.insert(active.file_id(), active);
            active = files.open_active(dir, next_id)?;
        }

        let offset = active.write_offset();
        active.write_record(record)?;
        files.writes_since_sync += 1;

        let needs_sync = match self.config.sync_policy {
            SyncPolicy::Always => true,
            SyncPolicy::EveryNWrites { count } => files.writes_since_sync >= count.max(1),
            SyncPolicy::Manual => false,
        };
        if needs_sync {
            active.sync()?;
            files.writes_since_sync = 0;
        }

        let pos = LogRecordPos {
            file_id: active.file_id(),
            offset,
        };
        tracing::trace!(%pos, size, tombstone = record.is_tombstone(), "appended record");

        Ok(pos)
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Read the value stored at `pos`
    fn value_at(&self, pos: LogRecordPos) -> Result<Bytes> {
        // Only the file lookup needs the lock
        let data_file = {
            let files = self.files.read();
            files
                .get(pos.file_id)
                .cloned()
                .ok_or(CaskError::DataFileNotFound(pos.file_id))?
        };

        let read = data_file.read_record(pos.offset)?.ok_or_else(|| {
            CaskError::DataFileDamaged(format!("no record at {}", pos))
        })?;

        // A stale index entry may still point at a tombstone
        if read.record.is_tombstone() {
            return Err(CaskError::KeyNotFound);
        }

        Ok(read.record.value)
    }

    // =========================================================================
    // Startup / Shutdown
    // =========================================================================

    /// Discover and open the data files in `dir`
    fn load_data_files(dir: &Path) -> Result<FileSet> {
        let mut file_ids: Vec<u32> = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            if let Some(id) = data::parse_file_id(&file_name.to_string_lossy())? {
                file_ids.push(id);
            }
        }

        file_ids.sort_unstable();

        let mut files = FileSet::default();
        for (i, &file_id) in file_ids.iter().enumerate() {
            let data_file = Arc::new(DataFile::open(dir, file_id)?);
            if i == file_ids.len() - 1 {
                files.active = Some(data_file);
            } else {
                files.older.insert(file_id, data_file);
            }
        }
        files.file_ids = file_ids;

        Ok(files)
    }

    /// Replay every data file, oldest first, into the index
    fn load_index_from_data_files(&self) -> Result<()> {
        let files = self.files.read();
        let active_id = files.active.as_ref().map(|f| f.file_id());

        for &file_id in &files.file_ids {
            let data_file = files
                .get(file_id)
                .ok_or(CaskError::DataFileNotFound(file_id))?;

            let mut offset = 0u64;
            let mut records = 0usize;
            while let Some(read) = data_file.read_record(offset)? {
                let pos = LogRecordPos { file_id, offset };
                let key = read.record.key;

                match read.record.rec_type {
                    LogRecordType::Normal => {
                        if !self.index.put(key.to_vec(), pos) {
                            tracing::warn!(%pos, "index rejected replayed record");
                        }
                    }
                    LogRecordType::Deleted => {
                        self.index.delete(&key);
                    }
                }

                offset += read.size as u64;
                records += 1;
            }

            // Appends continue exactly where the log left off
            if Some(file_id) == active_id {
                data_file.set_write_offset(offset);
            }

            tracing::debug!(file_id, records, bytes = offset, "replayed data file");
        }

        Ok(())
    }

    /// Sync + close every data file, attempting all of them
    fn close_files(&self) -> Result<()> {
        let mut files = self.files.write();
        let mut first_error: Option<CaskError> = None;

        let active = files.active.take();
        let older = std::mem::take(&mut files.older);

        for data_file in active.into_iter().chain(older.into_values()) {
            if let Err(e) = data_file.close() {
                tracing::warn!(file_id = data_file.file_id(), error = %e, "failed to close data file");
                first_error.get_or_insert(e);
            }
        }

        files.file_ids.clear();
        files.writes_since_sync = 0;

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // No-op after `close`; otherwise a best-effort final sync
        if let Err(e) = self.close_files() {
            tracing::error!(error = %e, "failed to close engine on drop");
        }
    }
}
