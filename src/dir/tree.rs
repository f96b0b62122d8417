//! Nested tree representation of a directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, warn};

use super::path::dir_key;
use crate::{FileKitError, Result};

/// One entry of a [`TreeNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    /// A subdirectory, keyed by its separator-prefixed name.
    Dir { key: String, node: TreeNode },
    /// A plain file name.
    File(String),
}

impl Serialize for TreeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TreeEntry::Dir { key, node } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(key, node)?;
                map.end()
            }
            TreeEntry::File(name) => serializer.serialize_str(name),
        }
    }
}

/// A directory level: subdirectories and files in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TreeNode {
    entries: Vec<TreeEntry>,
}

impl TreeNode {
    /// All entries in enumeration order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Number of entries at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this level has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subdirectory keys and their nodes.
    pub fn dirs(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.entries.iter().filter_map(|entry| match entry {
            TreeEntry::Dir { key, node } => Some((key.as_str(), node)),
            TreeEntry::File(_) => None,
        })
    }

    /// File names at this level.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            TreeEntry::File(name) => Some(name.as_str()),
            TreeEntry::Dir { .. } => None,
        })
    }

    /// Look up a subdirectory by key.
    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.dirs().find(|(k, _)| *k == key).map(|(_, node)| node)
    }
}

enum Slot {
    Dir(String, usize),
    File(String),
}

struct Pending {
    path: PathBuf,
    slots: Vec<Slot>,
}

/// Build the tree of `root`.
///
/// The returned node has a single entry keyed by the canonical path of
/// `root`. Symlinked directories are followed; a directory whose canonical
/// path was already visited is recorded as an empty node.
pub fn build_tree(root: &Path) -> Result<TreeNode> {
    if !root.is_dir() {
        return Err(FileKitError::DirectoryNotFound(root.to_path_buf()));
    }
    let canonical = fs::canonicalize(root)?;
    debug!("building tree of {}", canonical.display());

    let mut arena = vec![Pending {
        path: root.to_path_buf(),
        slots: Vec::new(),
    }];
    let mut visited = HashSet::from([canonical.clone()]);
    let mut stack = vec![0usize];

    while let Some(idx) = stack.pop() {
        let dir = arena[idx].path.clone();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            if !path.is_dir() {
                arena[idx].slots.push(Slot::File(name));
                continue;
            }

            let child = arena.len();
            arena[idx].slots.push(Slot::Dir(dir_key(&name), child));
            match fs::canonicalize(&path) {
                Ok(identity) if visited.insert(identity.clone()) => stack.push(child),
                Ok(identity) => warn!(
                    "{} resolves to already visited {}, not descending",
                    path.display(),
                    identity.display()
                ),
                Err(e) => warn!("cannot resolve {}: {e}", path.display()),
            }
            arena.push(Pending {
                path,
                slots: Vec::new(),
            });
        }
    }

    // Children always sit after their parent in the arena.
    let mut built: Vec<Option<TreeNode>> = vec![None; arena.len()];
    for (idx, pending) in arena.into_iter().enumerate().rev() {
        let entries: Vec<TreeEntry> = pending
            .slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Dir(key, child) => TreeEntry::Dir {
                    key,
                    node: built[child].take().unwrap_or_default(),
                },
                Slot::File(name) => TreeEntry::File(name),
            })
            .collect();
        built[idx] = Some(TreeNode { entries });
    }

    Ok(TreeNode {
        entries: vec![TreeEntry::Dir {
            key: canonical.to_string_lossy().into_owned(),
            node: built[0].take().unwrap_or_default(),
        }],
    })
}
