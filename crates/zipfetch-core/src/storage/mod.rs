//! Disk side of a transfer.
//!
//! The body is streamed into `<final>.part`, which is renamed over the final
//! name only after the whole body arrived. A failed or cancelled attempt
//! removes the `.part` file, so the final name only ever holds a complete file
//! (a new one, or the one that was there before).

mod writer;

pub use writer::StorageWriter;
pub(crate) use writer::remove_quietly;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.zip` → `a.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Creates the destination directory (and parents). Called once before the batch.
pub fn ensure_destination_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}
