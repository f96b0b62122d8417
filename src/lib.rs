//! filekit - directory traversal and upload intake
//!
//! [`Dir`] lists, maps, copies and empties directory trees.
//! [`UploadValidator`] checks received files against a size ceiling and
//! extension lists before keeping them in an upload directory.

pub mod config;
pub mod dir;
pub mod error;
pub mod logging;
pub mod upload;

pub use config::Config;
pub use dir::{
    copy_dir, empty_dir, DeleteReport, Dir, DirOptions, EntryKind, EntryRecord, OutputMode,
    TreeEntry, TreeNode,
};
pub use error::{FileKitError, Result};
pub use upload::{
    FileMover, PendingUpload, RenameMover, TransportError, UploadError, UploadRequest,
    UploadState, UploadValidator,
};
