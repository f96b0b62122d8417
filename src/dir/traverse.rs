//! Flat directory traversal.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::Result;

/// How each visited entry is rendered in the output list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Bare entry name.
    #[default]
    Default,
    /// Absolute path.
    Absolute,
    /// Path relative to the traversal root.
    Relative,
}

/// Traversal options, fixed for the lifetime of a [`Dir`](super::Dir).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirOptions {
    mode: OutputMode,
    recursive: bool,
    files_only: bool,
}

impl DirOptions {
    /// Single-level traversal, bare names, directories included.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output mode.
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Walk all descendants instead of immediate children.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Leave directories out of the output list.
    pub fn with_files_only(mut self, files_only: bool) -> Self {
        self.files_only = files_only;
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn is_files_only(&self) -> bool {
        self.files_only
    }
}

/// Kind of a visited entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A visited filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// File or directory (symlinks are classified by their target).
    pub kind: EntryKind,
    /// Bare entry name.
    pub name: String,
    /// Path as visited, below the root path given to the traversal.
    pub path: PathBuf,
}

impl EntryRecord {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Result of a traversal.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    /// Every visited entry, directories included.
    pub objects: Vec<EntryRecord>,
    /// Rendered output, shaped by the options.
    pub files: Vec<String>,
}

/// Traverse `root`, whose canonical form is `canonical_root`.
pub fn traverse(root: &Path, canonical_root: &Path, options: &DirOptions) -> Result<Traversal> {
    debug!(
        "traversing {} (mode: {:?}, recursive: {}, files only: {})",
        root.display(),
        options.mode,
        options.recursive,
        options.files_only
    );

    if options.recursive {
        traverse_recursive(root, canonical_root, options)
    } else {
        traverse_single(root, canonical_root, options)
    }
}

fn classify(path: &Path) -> EntryKind {
    if path.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}

fn push_separator(s: &mut String) {
    if !s.ends_with(MAIN_SEPARATOR) {
        s.push(MAIN_SEPARATOR);
    }
}

fn traverse_single(root: &Path, canonical_root: &Path, options: &DirOptions) -> Result<Traversal> {
    let mut traversal = Traversal::default();
    let prefix = canonical_root.to_string_lossy();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let record = EntryRecord {
            kind: classify(&path),
            name,
            path,
        };

        if !(options.files_only && record.is_dir()) {
            let mut rendered = match options.mode {
                OutputMode::Default => record.name.clone(),
                OutputMode::Absolute => {
                    let mut absolute = prefix.to_string();
                    push_separator(&mut absolute);
                    absolute.push_str(&record.name);
                    absolute
                }
                OutputMode::Relative => record.name.clone(),
            };
            if options.mode != OutputMode::Default && record.is_dir() {
                push_separator(&mut rendered);
            }
            traversal.files.push(rendered);
        }

        traversal.objects.push(record);
    }

    Ok(traversal)
}

fn traverse_recursive(
    root: &Path,
    canonical_root: &Path,
    options: &DirOptions,
) -> Result<Traversal> {
    let mut traversal = Traversal::default();
    let mut visited = HashSet::from([canonical_root.to_path_buf()]);
    let mut stack = vec![fs::read_dir(root)?];

    while let Some(handle) = stack.last_mut() {
        let Some(entry) = handle.next() else {
            stack.pop();
            continue;
        };
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let descend = entry.file_type()?.is_dir();
        let record = EntryRecord {
            kind: classify(&path),
            name,
            path,
        };

        if !(options.files_only && record.is_dir()) {
            let rendered = match options.mode {
                OutputMode::Default => Some(record.name.clone()),
                OutputMode::Absolute => fs::canonicalize(&record.path)
                    .ok()
                    .map(|p| p.to_string_lossy().into_owned()),
                OutputMode::Relative => fs::canonicalize(&record.path).ok().and_then(|p| {
                    p.strip_prefix(canonical_root)
                        .ok()
                        .map(|rel| rel.to_string_lossy().into_owned())
                        .filter(|rel| !rel.is_empty())
                }),
            };
            match rendered {
                Some(rendered) => traversal.files.push(rendered),
                None => debug!("cannot resolve {}, leaving it out", record.path.display()),
            }
        }

        if descend {
            match fs::canonicalize(&record.path) {
                Ok(identity) if visited.insert(identity.clone()) => {
                    stack.push(fs::read_dir(&record.path)?)
                }
                Ok(identity) => warn!(
                    "{} resolves to already visited {}, not descending",
                    record.path.display(),
                    identity.display()
                ),
                Err(e) => warn!("cannot resolve {}: {e}", record.path.display()),
            }
        }

        traversal.objects.push(record);
    }

    Ok(traversal)
}
