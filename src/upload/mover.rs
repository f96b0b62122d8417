//! Moving received files into the upload directory.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

/// Moves a received file to its final location.
pub trait FileMover {
    fn move_into_place(&self, src: &Path, dest: &Path) -> io::Result<()>;
}

/// Renames the file, falling back to copy and remove when the rename fails
/// (e.g. across filesystems).
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameMover;

impl FileMover for RenameMover {
    fn move_into_place(&self, src: &Path, dest: &Path) -> io::Result<()> {
        if !src.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a file", src.display()),
            ));
        }

        let Err(rename_err) = fs::rename(src, dest) else {
            return Ok(());
        };
        debug!("rename of {} failed ({rename_err}), copying", src.display());

        // On failure only `src` is left.
        if let Err(e) = fs::copy(src, dest).and_then(|_| fs::remove_file(src)) {
            remove_copy(dest);
            return Err(e);
        }
        Ok(())
    }
}

fn remove_copy(dest: &Path) {
    match fs::remove_file(dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove incomplete copy {}: {e}", dest.display()),
    }
}
