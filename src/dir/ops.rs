//! Bulk copy and delete operations on directory trees.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::path::folder_name;
use crate::{FileKitError, Result};

/// Copy the tree at `src` into `dest`.
///
/// With `include_root_folder`, the copy is nested under a new directory
/// named after the last component of `src`. Directories are created before
/// their contents. The first failing OS call aborts the copy and whatever
/// was already written stays in place.
pub fn copy_dir(src: &Path, dest: &Path, include_root_folder: bool) -> Result<PathBuf> {
    if !src.is_dir() {
        return Err(FileKitError::DirectoryNotFound(src.to_path_buf()));
    }

    let folder = include_root_folder.then(|| folder_name(&src.to_string_lossy()).to_string());
    let target = match &folder {
        Some(folder) => dest.join(folder),
        None => dest.to_path_buf(),
    };

    // The target may not exist yet; resolve it through `dest`.
    let canonical_src = fs::canonicalize(src)?;
    let canonical_target = fs::canonicalize(&target).ok().or_else(|| {
        let canonical_dest = fs::canonicalize(dest).ok()?;
        Some(match &folder {
            Some(folder) => canonical_dest.join(folder),
            None => canonical_dest,
        })
    });
    if let Some(canonical_target) = canonical_target {
        if canonical_target.starts_with(&canonical_src) {
            return Err(FileKitError::InvalidOptions(format!(
                "cannot copy {} into itself",
                src.display()
            )));
        }
    }

    debug!("copying {} to {}", src.display(), target.display());
    if include_root_folder {
        create_dir_if_missing(&target)?;
    }

    let mut stack = vec![(fs::read_dir(src)?, PathBuf::new())];
    while let Some((handle, sub_path)) = stack.last_mut() {
        let Some(entry) = handle.next() else {
            stack.pop();
            continue;
        };
        let entry = entry?;
        let relative = sub_path.join(entry.file_name());
        let source = entry.path();
        let destination = target.join(&relative);

        if source.is_dir() {
            create_dir_if_missing(&destination)?;
            if !entry.file_type()?.is_symlink() {
                stack.push((fs::read_dir(&source)?, relative));
            }
        } else {
            fs::copy(&source, &destination)?;
        }
    }

    Ok(target)
}

fn create_dir_if_missing(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// A path that could not be removed.
#[derive(Debug)]
pub struct DeleteFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Outcome of [`empty_dir`].
#[derive(Debug, Default)]
pub struct DeleteReport {
    removed: Vec<PathBuf>,
    failures: Vec<DeleteFailure>,
}

impl DeleteReport {
    /// Paths that were removed, in removal order.
    pub fn removed(&self) -> &[PathBuf] {
        &self.removed
    }

    /// Paths that could not be removed.
    pub fn failures(&self) -> &[DeleteFailure] {
        &self.failures
    }

    /// Whether every attempted removal succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: PathBuf, outcome: io::Result<()>) {
        match outcome {
            Ok(()) => self.removed.push(path),
            Err(error) => {
                warn!("failed to remove {}: {error}", path.display());
                self.failures.push(DeleteFailure { path, error });
            }
        }
    }
}

struct Frame {
    path: PathBuf,
    handle: fs::ReadDir,
    remove: bool,
}

/// Remove everything below `path`, and `path` itself when `remove_root`.
///
/// Files and symlinks are unlinked; directories are emptied and then
/// removed. Failures do not stop the walk and are collected in the report.
pub fn empty_dir(path: &Path, remove_root: bool) -> DeleteReport {
    let mut report = DeleteReport::default();

    let handle = match fs::read_dir(path) {
        Ok(handle) => handle,
        Err(e) => {
            report.record(path.to_path_buf(), Err(e));
            return report;
        }
    };
    let mut stack = vec![Frame {
        path: path.to_path_buf(),
        handle,
        remove: remove_root,
    }];

    while let Some(frame) = stack.last_mut() {
        let entry = match frame.handle.next() {
            Some(Ok(entry)) => entry,
            Some(Err(e)) => {
                let path = frame.path.clone();
                report.record(path, Err(e));
                continue;
            }
            None => {
                if let Some(done) = stack.pop() {
                    if done.remove {
                        report.record(done.path.clone(), fs::remove_dir(&done.path));
                    }
                }
                continue;
            }
        };

        let child = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            report.record(child.clone(), fs::remove_file(&child));
            continue;
        }

        match fs::read_dir(&child) {
            Ok(handle) => stack.push(Frame {
                path: child,
                handle,
                remove: true,
            }),
            Err(e) => report.record(child, Err(e)),
        }
    }

    debug!(
        "emptied {}: {} removed, {} failed",
        path.display(),
        report.removed.len(),
        report.failures.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_source(base: &Path) -> PathBuf {
        let src = base.join("tmp");
        fs::create_dir_all(src.join("sub").join("deep")).unwrap();
        fs::write(src.join("a.txt"), b"alpha").unwrap();
        fs::write(src.join("sub").join("b.txt"), b"beta").unwrap();
        fs::write(src.join("sub").join("deep").join("c.txt"), b"gamma").unwrap();
        src
    }

    #[test]
    fn test_copy_with_root_folder() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());
        let dest = temp_dir.path().join("copy");
        fs::create_dir(&dest).unwrap();

        let target = copy_dir(&src, &dest, true).unwrap();

        assert_eq!(target, dest.join("tmp"));
        assert_eq!(fs::read(target.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(
            fs::read(target.join("sub").join("deep").join("c.txt")).unwrap(),
            b"gamma"
        );
    }

    #[test]
    fn test_copy_without_root_folder() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());
        let dest = temp_dir.path().join("flat");
        fs::create_dir(&dest).unwrap();

        copy_dir(&src, &dest, false).unwrap();

        assert!(dest.join("a.txt").is_file());
        assert!(dest.join("sub").join("b.txt").is_file());
        assert!(!dest.join("tmp").exists());
    }

    #[test]
    fn test_copy_into_existing_tree() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());
        let dest = temp_dir.path().join("copy");
        fs::create_dir(&dest).unwrap();

        copy_dir(&src, &dest, true).unwrap();
        copy_dir(&src, &dest, true).unwrap();

        assert!(dest.join("tmp").join("sub").join("b.txt").is_file());
    }

    #[test]
    fn test_copy_missing_destination_fails() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());

        let result = copy_dir(&src, &temp_dir.path().join("nowhere"), true);
        assert!(matches!(result, Err(FileKitError::Io(_))));
    }

    #[test]
    fn test_copy_into_itself_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());

        let result = copy_dir(&src, &src.join("sub"), true);
        assert!(matches!(result, Err(FileKitError::InvalidOptions(_))));
    }

    #[test]
    fn test_copy_onto_itself_keeps_contents() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());

        // Target resolves to `src` itself.
        let result = copy_dir(&src, temp_dir.path(), true);
        assert!(matches!(result, Err(FileKitError::InvalidOptions(_))));

        let result = copy_dir(&src, &src, false);
        assert!(matches!(result, Err(FileKitError::InvalidOptions(_))));

        assert_eq!(fs::read_to_string(src.join("a.txt")).unwrap(), "alpha");
        assert_eq!(
            fs::read_to_string(src.join("sub").join("deep").join("c.txt")).unwrap(),
            "gamma"
        );
    }

    #[test]
    fn test_copy_next_to_source_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());
        let sibling = temp_dir.path().join("tmp2");
        fs::create_dir(&sibling).unwrap();

        let target = copy_dir(&src, &sibling, false).unwrap();

        assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "alpha");
    }

    #[test]
    fn test_empty_dir_keeps_root() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());

        let report = empty_dir(&src, false);

        assert!(report.is_complete());
        assert!(src.is_dir());
        assert_eq!(fs::read_dir(&src).unwrap().count(), 0);
        // a.txt, b.txt, c.txt, deep, sub
        assert_eq!(report.removed().len(), 5);
    }

    #[test]
    fn test_empty_dir_removes_root() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());

        let report = empty_dir(&src, true);

        assert!(report.is_complete());
        assert!(!src.exists());
        assert_eq!(report.removed().last().unwrap(), &src);
    }

    #[test]
    fn test_empty_missing_dir_reports_failure() {
        let temp_dir = TempDir::new().unwrap();

        let report = empty_dir(&temp_dir.path().join("missing"), true);

        assert!(!report.is_complete());
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].error.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_dir_unlinks_symlinked_directories() {
        let temp_dir = TempDir::new().unwrap();
        let src = setup_source(temp_dir.path());
        let outside = temp_dir.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep.txt"), b"keep").unwrap();
        std::os::unix::fs::symlink(&outside, src.join("link")).unwrap();

        let report = empty_dir(&src, true);

        assert!(report.is_complete());
        assert!(!src.exists());
        assert!(outside.join("keep.txt").is_file());
    }
}
