//! Upload intake for filekit.
//!
//! This module validates files received by some transport and moves them
//! into an upload directory:
//! - Size ceiling and extension allow/deny lists
//! - Collision-free destination names
//! - A queryable accepted/rejected state

mod mover;
mod types;
mod validator;

pub use mover::{FileMover, RenameMover};
pub use types::{PendingUpload, TransportError, UploadError, UploadRequest, UploadState};
pub use validator::UploadValidator;

/// Default size ceiling applied by `use_defaults` (10 MB).
pub const DEFAULT_MAX_SIZE: u64 = 10_000_000;

/// Extensions accepted by `use_defaults`.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "ai", "aif", "aiff", "avi", "bmp", "bz2", "csv", "doc", "docx", "eps", "fla", "flv", "gif",
    "gz", "jpe", "jpg", "jpeg", "log", "md", "mov", "mp2", "mp3", "mp4", "mpg", "mpeg", "otf",
    "pdf", "png", "ppt", "pptx", "psd", "rar", "svg", "swf", "tar", "tbz", "tbz2", "tgz", "tif",
    "tiff", "tsv", "ttf", "txt", "wav", "wma", "wmv", "xls", "xlsx", "xml", "zip",
];

/// Extensions rejected by `use_defaults`.
pub const DEFAULT_DISALLOWED_TYPES: &[&str] = &[
    "css", "htm", "html", "js", "json", "pgsql", "php", "php3", "php4", "php5", "sql", "sqlite",
    "yaml", "yml",
];

/// Lowercase an extension and drop a leading dot.
pub(crate) fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}
