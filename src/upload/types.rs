//! Upload request, transport record and rejection types.

use std::path::PathBuf;

use thiserror::Error;

use super::{normalize_ext, DEFAULT_ALLOWED_TYPES, DEFAULT_DISALLOWED_TYPES};

/// Error reported by the transport that received the file.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("the uploaded file exceeds the server size limit")]
    IniSize,

    #[error("the uploaded file exceeds the form size limit")]
    FormSize,

    #[error("the uploaded file was only partially uploaded")]
    Partial,

    #[error("no file was uploaded")]
    NoFile,

    #[error("missing a temporary folder")]
    NoTmpDir,

    #[error("failed to write the file to disk")]
    CantWrite,

    #[error("a server extension stopped the file upload")]
    Extension,

    #[error("unknown upload error (code {0})")]
    Unknown(u32),
}

impl TransportError {
    /// Decode a transport error code. `0` means no error.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(Self::IniSize),
            2 => Some(Self::FormSize),
            3 => Some(Self::Partial),
            4 => Some(Self::NoFile),
            6 => Some(Self::NoTmpDir),
            7 => Some(Self::CantWrite),
            8 => Some(Self::Extension),
            other => Some(Self::Unknown(other)),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::IniSize => 1,
            Self::FormSize => 2,
            Self::Partial => 3,
            Self::NoFile => 4,
            Self::NoTmpDir => 6,
            Self::CantWrite => 7,
            Self::Extension => 8,
            Self::Unknown(code) => *code,
        }
    }
}

/// Reason an upload was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The transport reported an error.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// The file exceeds the size ceiling.
    #[error("the file uploaded is too big ({size} bytes, maximum {max})")]
    FileTooLarge { size: u64, max: u64 },

    /// The extension is not accepted.
    #[error("the file type {} is not an accepted file format", .0.to_uppercase())]
    ExtensionNotAllowed(String),

    /// The file could not be moved into the upload directory.
    #[error("failed to move the uploaded file: {0}")]
    MoveFailed(String),
}

/// Where an upload stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Pending,
    /// Stored under this file name.
    Accepted(String),
    Rejected(UploadError),
}

/// A file received by the transport, not yet in the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Original filename sent by the client.
    pub name: String,
    /// Declared MIME type. Not used for validation.
    pub mime_type: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Temporary location of the received file.
    pub tmp_path: PathBuf,
    /// Transport error code, `0` when the transfer succeeded.
    pub error_code: u32,
}

impl PendingUpload {
    /// Create a pending upload with no transport error.
    pub fn new(name: impl Into<String>, tmp_path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: String::new(),
            size,
            tmp_path: tmp_path.into(),
            error_code: 0,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_error_code(mut self, code: u32) -> Self {
        self.error_code = code;
        self
    }

    /// The decoded transport error, if any.
    pub fn transport_error(&self) -> Option<TransportError> {
        TransportError::from_code(self.error_code)
    }
}

/// Settings for an [`UploadValidator`](super::UploadValidator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Destination directory.
    pub upload_dir: PathBuf,
    /// Size ceiling in bytes, `0` for unlimited.
    pub max_size: u64,
    /// Accepted extensions; empty accepts everything.
    pub allowed_types: Vec<String>,
    /// Rejected extensions, checked regardless of the allow-list.
    pub disallowed_types: Vec<String>,
    /// Replace existing files instead of picking a new name.
    pub overwrite: bool,
}

impl UploadRequest {
    /// Unlimited size, no extension lists, no overwrite.
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_size: 0,
            allowed_types: Vec::new(),
            disallowed_types: Vec::new(),
            overwrite: false,
        }
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_types = collect_types(types);
        self
    }

    pub fn with_disallowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.disallowed_types = collect_types(types);
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Apply the default ceiling and extension lists.
    pub fn with_defaults(self, max_size: u64) -> Self {
        self.with_max_size(max_size)
            .with_allowed_types(DEFAULT_ALLOWED_TYPES)
            .with_disallowed_types(DEFAULT_DISALLOWED_TYPES)
    }
}

pub(crate) fn collect_types<I, S>(types: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for ext in types {
        let ext = normalize_ext(ext.as_ref());
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::DEFAULT_MAX_SIZE;

    #[test]
    fn test_transport_codes() {
        assert_eq!(TransportError::from_code(0), None);
        assert_eq!(TransportError::from_code(1), Some(TransportError::IniSize));
        assert_eq!(TransportError::from_code(4), Some(TransportError::NoFile));
        assert_eq!(TransportError::from_code(5), Some(TransportError::Unknown(5)));
        for code in [1, 2, 3, 4, 6, 7, 8, 42] {
            assert_eq!(TransportError::from_code(code).unwrap().code(), code);
        }
    }

    #[test]
    fn test_upload_error_display() {
        let err = UploadError::FileTooLarge {
            size: 10234,
            max: 10000,
        };
        assert_eq!(
            err.to_string(),
            "the file uploaded is too big (10234 bytes, maximum 10000)"
        );

        let err = UploadError::Transport(TransportError::Partial);
        assert_eq!(
            err.to_string(),
            "transport error: the uploaded file was only partially uploaded"
        );
    }

    #[test]
    fn test_request_lists_are_normalized() {
        let request = UploadRequest::new("uploads").with_allowed_types(["PSD", ".txt", "psd", ""]);
        assert_eq!(request.allowed_types, vec!["psd", "txt"]);
    }

    #[test]
    fn test_request_defaults() {
        let request = UploadRequest::new("uploads").with_defaults(DEFAULT_MAX_SIZE);
        assert_eq!(request.max_size, 10_000_000);
        assert_eq!(request.allowed_types.len(), 50);
        assert_eq!(request.disallowed_types.len(), 14);
        assert!(!request.overwrite);
    }

    #[test]
    fn test_pending_upload_builder() {
        let pending = PendingUpload::new("upload.txt", "/tmp/jskn892342", 10234)
            .with_mime_type("text/plain")
            .with_error_code(3);

        assert_eq!(pending.mime_type, "text/plain");
        assert_eq!(pending.transport_error(), Some(TransportError::Partial));
    }
}
