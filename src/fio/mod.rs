//! File I/O Module
//!
//! Thin capability layer over the OS file handle used by data files.
//!
//! ## Responsibilities
//! - Positioned reads (`read` at an offset, never moves a cursor)
//! - Appending writes (always at the current end of file)
//! - Explicit durability via `sync`
//! - Reporting the current file size
//! - Truncation, to drop a partially written tail
//!
//! The handle is closed when the manager is dropped.

mod file_io;

use std::io;
use std::path::Path;

pub use file_io::FileIo;

/// Permission bits for newly created data files (unix only)
pub const DATA_FILE_PERM: u32 = 0o644;

/// Abstract I/O over a single named file
///
/// All methods take `&self` so one handle can serve concurrent readers
/// while the engine's write lock serializes appends.
pub trait IoManager: Send + Sync {
    /// Read into `buf` starting at `offset`
    ///
    /// Fills as much of `buf` as the file holds and returns the number of
    /// bytes read; a short count means end of file was reached.
    fn read(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Append `buf` at the end of the file, returning bytes written
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// Flush file contents to durable storage
    fn sync(&self) -> io::Result<()>;

    /// Current size of the file in bytes
    fn size(&self) -> io::Result<u64>;

    /// Cut the file down to `len` bytes; later appends land at the new end
    fn truncate(&self, len: u64) -> io::Result<()>;
}

/// Create the I/O manager for `path` (standard file I/O only)
pub fn new_io_manager(path: &Path) -> io::Result<Box<dyn IoManager>> {
    Ok(Box::new(FileIo::open(path)?))
}
