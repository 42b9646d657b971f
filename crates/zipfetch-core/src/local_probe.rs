//! Local state of a target path: absent, or present with a byte size.

use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalState {
    NotFound,
    Present(u64),
}

/// Stats `path`. Never fails: an unreadable entry or something that is not a
/// regular file is logged and reported as `NotFound`, which forces a fresh
/// download instead of aborting the batch.
pub fn probe(path: &Path) -> LocalState {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => LocalState::Present(meta.len()),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "target exists but is not a regular file");
            LocalState::NotFound
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => LocalState::NotFound,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot stat target; treating as absent");
            LocalState::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(probe(&dir.path().join("nope.zip")), LocalState::NotFound);
    }

    #[test]
    fn existing_file_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.zip");
        std::fs::write(&p, vec![0u8; 1234]).unwrap();
        assert_eq!(probe(&p), LocalState::Present(1234));
    }

    #[test]
    fn empty_file_is_present() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("empty.zip");
        std::fs::write(&p, b"").unwrap();
        assert_eq!(probe(&p), LocalState::Present(0));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("sub");
        std::fs::create_dir(&p).unwrap();
        assert_eq!(probe(&p), LocalState::NotFound);
    }
}
