//! Upload validation and intake.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::mover::{FileMover, RenameMover};
use super::types::{collect_types, PendingUpload, UploadError, UploadRequest, UploadState};
use super::{normalize_ext, DEFAULT_ALLOWED_TYPES, DEFAULT_DISALLOWED_TYPES};
use crate::{FileKitError, Result};

/// Validates uploads against a size ceiling and extension lists and moves
/// accepted files into the upload directory.
///
/// # Ordering
/// [`upload`](Self::upload) and [`receive`](Self::receive) move the file
/// into the upload directory first and check it afterwards, deleting it
/// again on rejection. [`validate`](Self::validate) checks the declared
/// metadata without touching the filesystem.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    upload_dir: PathBuf,
    max_size: u64,
    allowed_types: Vec<String>,
    disallowed_types: Vec<String>,
    overwrite: bool,
    uploaded_file: Option<String>,
    state: UploadState,
}

impl UploadValidator {
    /// Create a validator for `request`.
    ///
    /// The upload directory must exist and be writable.
    pub fn new(request: UploadRequest) -> Result<Self> {
        let UploadRequest {
            upload_dir,
            max_size,
            allowed_types,
            disallowed_types,
            overwrite,
        } = request;

        if !upload_dir.is_dir() {
            return Err(FileKitError::DirectoryNotFound(upload_dir));
        }
        // Removed again when dropped.
        if let Err(e) = NamedTempFile::new_in(&upload_dir) {
            debug!("write check in {} failed: {e}", upload_dir.display());
            return match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    Err(FileKitError::DirectoryNotWritable(upload_dir))
                }
                _ => Err(e.into()),
            };
        }

        Ok(Self {
            upload_dir,
            max_size,
            allowed_types: collect_types(allowed_types),
            disallowed_types: collect_types(disallowed_types),
            overwrite,
            uploaded_file: None,
            state: UploadState::Pending,
        })
    }

    /// Replace the ceiling and both lists with the defaults.
    pub fn use_defaults(&mut self, max_size: u64) {
        self.max_size = max_size;
        self.allowed_types = collect_types(DEFAULT_ALLOWED_TYPES);
        self.disallowed_types = collect_types(DEFAULT_DISALLOWED_TYPES);
    }

    pub fn set_max_size(&mut self, max_size: u64) {
        self.max_size = max_size;
    }

    pub fn set_overwrite(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
    }

    pub fn add_allowed_type(&mut self, ext: &str) {
        add_type(&mut self.allowed_types, ext);
    }

    pub fn remove_allowed_type(&mut self, ext: &str) {
        remove_type(&mut self.allowed_types, ext);
    }

    pub fn add_disallowed_type(&mut self, ext: &str) {
        add_type(&mut self.disallowed_types, ext);
    }

    pub fn remove_disallowed_type(&mut self, ext: &str) {
        remove_type(&mut self.disallowed_types, ext);
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    pub fn disallowed_types(&self) -> &[String] {
        &self.disallowed_types
    }

    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn is_success(&self) -> bool {
        matches!(self.state, UploadState::Accepted(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.state, UploadState::Rejected(_))
    }

    /// Rejection reason of the last attempt.
    pub fn error(&self) -> Option<&UploadError> {
        match &self.state {
            UploadState::Rejected(err) => Some(err),
            _ => None,
        }
    }

    /// Name chosen for the last stored (or attempted) file.
    pub fn uploaded_file(&self) -> Option<&str> {
        self.uploaded_file.as_deref()
    }

    pub fn uploaded_full_path(&self) -> Option<PathBuf> {
        self.uploaded_file
            .as_ref()
            .map(|name| self.upload_dir.join(name))
    }

    /// Whether `ext` passes the allow-list. An empty list allows everything.
    pub fn is_allowed(&self, ext: &str) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.contains(&normalize_ext(ext))
    }

    /// Whether `ext` is on the deny-list.
    pub fn is_not_allowed(&self, ext: &str) -> bool {
        self.disallowed_types.contains(&normalize_ext(ext))
    }

    fn accepts(&self, ext: &str) -> bool {
        self.is_allowed(ext) && !self.is_not_allowed(ext)
    }

    /// Return `file`, or `{stem}_{n}{.ext}` with the smallest `n` that does
    /// not collide with an entry of the upload directory.
    ///
    /// The extension is whatever follows the last dot, so `foo.` retries as
    /// `foo_1` and `.env` as `_1.env`.
    pub fn check_filename(&self, file: &str) -> String {
        let (stem, ext) = split_name(file);
        let ext = ext.map(|e| format!(".{e}")).unwrap_or_default();

        let mut candidate = file.to_string();
        let mut i = 1;
        while fs::symlink_metadata(self.upload_dir.join(&candidate)).is_ok() {
            candidate = format!("{stem}_{i}{ext}");
            i += 1;
        }
        candidate
    }

    /// Check the declared metadata of `pending` without moving anything.
    ///
    /// Transport error first, then declared size, then the extension of the
    /// original name.
    pub fn validate(&mut self, pending: &PendingUpload) -> std::result::Result<(), UploadError> {
        self.reset();

        if let Some(err) = pending.transport_error() {
            return Err(self.reject(UploadError::Transport(err)));
        }
        if self.max_size > 0 && pending.size > self.max_size {
            return Err(self.reject(UploadError::FileTooLarge {
                size: pending.size,
                max: self.max_size,
            }));
        }
        let name = Path::new(&pending.name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let (_, Some(ext)) = split_name(&name) {
            if !self.accepts(ext) {
                return Err(self.reject(UploadError::ExtensionNotAllowed(ext.to_string())));
            }
        }

        Ok(())
    }

    /// Take in a received file: transport check, then [`upload`](Self::upload).
    pub fn receive(&mut self, pending: &PendingUpload) -> std::result::Result<String, UploadError> {
        self.receive_with(&RenameMover, pending)
    }

    pub fn receive_with(
        &mut self,
        mover: &impl FileMover,
        pending: &PendingUpload,
    ) -> std::result::Result<String, UploadError> {
        self.reset();
        if let Some(err) = pending.transport_error() {
            return Err(self.reject(UploadError::Transport(err)));
        }
        self.upload_with(mover, &pending.tmp_path, &pending.name)
    }

    /// Move `src` into the upload directory as `dest` and check it.
    ///
    /// Unless overwriting, `dest` is first passed through
    /// [`check_filename`](Self::check_filename). Returns the stored name.
    pub fn upload(
        &mut self,
        src: impl AsRef<Path>,
        dest: &str,
    ) -> std::result::Result<String, UploadError> {
        self.upload_with(&RenameMover, src, dest)
    }

    pub fn upload_with(
        &mut self,
        mover: &impl FileMover,
        src: impl AsRef<Path>,
        dest: &str,
    ) -> std::result::Result<String, UploadError> {
        self.reset();

        let Some(name) = Path::new(dest).file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            return Err(self.reject(UploadError::MoveFailed(format!(
                "invalid destination name: {dest}"
            ))));
        };
        let name = if self.overwrite {
            name
        } else {
            self.check_filename(&name)
        };

        self.uploaded_file = Some(name.clone());
        let target = self.upload_dir.join(&name);
        let existed = fs::symlink_metadata(&target).is_ok();

        if let Err(e) = mover.move_into_place(src.as_ref(), &target) {
            if !existed && fs::symlink_metadata(&target).is_ok() {
                discard(&target);
            }
            return Err(self.reject(UploadError::MoveFailed(e.to_string())));
        }

        let size = match fs::metadata(&target) {
            Ok(metadata) => metadata.len(),
            Err(e) => return Err(self.reject(UploadError::MoveFailed(e.to_string()))),
        };

        if self.max_size > 0 && size > self.max_size {
            discard(&target);
            return Err(self.reject(UploadError::FileTooLarge {
                size,
                max: self.max_size,
            }));
        }

        if let (_, Some(ext)) = split_name(&name) {
            if !self.accepts(ext) {
                discard(&target);
                return Err(self.reject(UploadError::ExtensionNotAllowed(ext.to_string())));
            }
        }

        info!("stored upload {} ({size} bytes)", target.display());
        self.state = UploadState::Accepted(name.clone());
        Ok(name)
    }

    fn reset(&mut self) {
        self.state = UploadState::Pending;
        self.uploaded_file = None;
    }

    fn reject(&mut self, err: UploadError) -> UploadError {
        warn!("upload rejected: {err}");
        self.state = UploadState::Rejected(err.clone());
        err
    }
}

/// Split `file` at its last dot. An empty extension counts as none.
fn split_name(file: &str) -> (&str, Option<&str>) {
    match file.rsplit_once('.') {
        Some((stem, "")) => (stem, None),
        Some((stem, ext)) => (stem, Some(ext)),
        None => (file, None),
    }
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("failed to remove rejected upload {}: {e}", path.display());
    }
}

fn add_type(list: &mut Vec<String>, ext: &str) {
    let ext = normalize_ext(ext);
    if !ext.is_empty() && !list.contains(&ext) {
        list.push(ext);
    }
}

fn remove_type(list: &mut Vec<String>, ext: &str) {
    let ext = normalize_ext(ext);
    list.retain(|t| *t != ext);
}
