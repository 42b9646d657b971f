//! Sequential writer for a `.part` file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Owns the temp file for one transfer. Either [`finalize`](Self::finalize)
/// renames it into place or [`discard`](Self::discard) removes it; dropping the
/// writer without either leaves the `.part` file behind for the next attempt
/// to truncate.
pub struct StorageWriter {
    file: File,
    temp_path: PathBuf,
    written: u64,
}

impl StorageWriter {
    /// Create (or truncate) the temp file at `temp_path`.
    pub fn create(temp_path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        Ok(Self {
            file,
            temp_path: temp_path.to_path_buf(),
            written: 0,
        })
    }

    /// Reserve `size` bytes up front so a full disk fails the transfer at the
    /// first chunk. On Linux tries `posix_fallocate`; elsewhere, or when the
    /// filesystem does not support it, nothing is reserved.
    pub fn preallocate(&mut self, size: u64) -> io::Result<()> {
        #[cfg(target_os = "linux")]
        {
            let Ok(len) = libc::off_t::try_from(size) else {
                tracing::debug!(size, "declared size exceeds off_t, writing without reservation");
                return Ok(());
            };
            let fd = self.file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, len) };
            match r {
                0 => {}
                libc::ENOSPC | libc::EFBIG => return Err(io::Error::from_raw_os_error(r)),
                _ => tracing::debug!(errno = r, "posix_fallocate unsupported, writing without reservation"),
            }
        }
        #[cfg(not(target_os = "linux"))]
        let _ = size;
        Ok(())
    }

    /// Append `data` at the current end of the written range.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Trim any preallocated tail, fsync, and atomically rename to `final_path`.
    /// Replaces an existing file at `final_path`.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        self.file.set_len(self.written)?;
        self.file.sync_all()?;
        let temp_path = self.temp_path;
        drop(self.file);
        std::fs::rename(&temp_path, final_path)
    }

    /// Close and remove the temp file. A missing file is not an error.
    pub fn discard(self) {
        let temp_path = self.temp_path;
        drop(self.file);
        remove_quietly(&temp_path);
    }
}

/// Remove `path`, logging anything other than "already gone".
pub(crate) fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove partial file"),
    }
}
