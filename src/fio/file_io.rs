//! Standard file I/O
//!
//! `IoManager` backed by `std::fs::File`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use super::IoManager;

/// File handle opened create + read + append
#[derive(Debug)]
pub struct FileIo {
    file: File,
}

impl FileIo {
    /// Open (or create) the file at `path`
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true).read(true).append(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(super::DATA_FILE_PERM);
        }

        let file = options.open(path)?;
        Ok(Self { file })
    }

    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(&self.file, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(&self.file, buf, offset)
    }
}

impl IoManager for FileIo {
    fn read(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        // A single positioned read may return fewer bytes than requested
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_at(&mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        (&self.file).write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn truncate(&self, len: u64) -> io::Result<()> {
        self.file.set_len(len)
    }
}
