//! Directory listing, tree building and bulk operations.
//!
//! [`Dir`] scans a directory once when opened:
//! - a flat listing shaped by [`DirOptions`]
//! - the raw [`EntryRecord`] of every visited entry
//! - a nested [`TreeNode`] of the whole tree

mod ops;
mod path;
mod traverse;
mod tree;

use std::fs;
use std::path::{Path, PathBuf};

pub use ops::{copy_dir, empty_dir, DeleteFailure, DeleteReport};
pub use path::{folder_name, normalize};
pub use traverse::{traverse, DirOptions, EntryKind, EntryRecord, OutputMode, Traversal};
pub use tree::{build_tree, TreeEntry, TreeNode};

use crate::{FileKitError, Result};

/// A scanned directory.
#[derive(Debug, Clone)]
pub struct Dir {
    path: String,
    canonical: PathBuf,
    options: DirOptions,
    files: Vec<String>,
    objects: Vec<EntryRecord>,
    tree: TreeNode,
}

impl Dir {
    /// Scan the directory at `dir`.
    ///
    /// Fails with [`FileKitError::DirectoryNotFound`] if it does not exist.
    pub fn open(dir: impl AsRef<str>, options: DirOptions) -> Result<Self> {
        let raw = dir.as_ref();
        if !Path::new(raw).is_dir() {
            return Err(FileKitError::DirectoryNotFound(PathBuf::from(raw)));
        }

        let tree = build_tree(Path::new(raw))?;
        let path = normalize(raw);
        let canonical = fs::canonicalize(&path)?;
        let Traversal { objects, files } = traverse(Path::new(&path), &canonical, &options)?;

        Ok(Self {
            path,
            canonical,
            options,
            files,
            objects,
            tree,
        })
    }

    /// The normalized directory path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The canonical absolute path.
    pub fn canonical_path(&self) -> &Path {
        &self.canonical
    }

    /// Options the listing was built with.
    pub fn options(&self) -> &DirOptions {
        &self.options
    }

    /// The rendered listing.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Every visited entry, directories included.
    pub fn objects(&self) -> &[EntryRecord] {
        &self.objects
    }

    /// The nested tree, keyed at the top by the canonical path.
    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    /// Copy this directory into `dest`. See [`copy_dir`].
    pub fn copy_dir(&self, dest: impl AsRef<Path>, include_root_folder: bool) -> Result<PathBuf> {
        copy_dir(Path::new(&self.path), dest.as_ref(), include_root_folder)
    }

    /// Empty this directory, removing it too when `remove_root`.
    pub fn empty_dir(&self, remove_root: bool) -> DeleteReport {
        empty_dir(Path::new(&self.path), remove_root)
    }
}
