//! Directory path normalization.

use std::path::MAIN_SEPARATOR;

/// Normalize a directory path to the host separator convention.
///
/// Separators of the other convention are converted, then one trailing
/// separator is stripped. A path consisting of a single separator is kept.
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, MAIN_SEPARATOR)
}

/// Normalize `raw` for a host whose separator is `sep`.
pub(crate) fn normalize_with(raw: &str, sep: char) -> String {
    let mut path = if raw.contains('/') && sep != '/' {
        raw.replace('/', &sep.to_string())
    } else if raw.contains('\\') && sep != '\\' {
        raw.replace('\\', &sep.to_string())
    } else {
        raw.to_string()
    };

    if path.len() > sep.len_utf8() && path.ends_with(sep) {
        path.pop();
    }

    path
}

/// The last component of a normalized path.
///
/// Returns the whole path when it contains no separator.
pub fn folder_name(path: &str) -> &str {
    folder_name_with(path, MAIN_SEPARATOR)
}

pub(crate) fn folder_name_with(path: &str, sep: char) -> &str {
    match path.rfind(sep) {
        Some(idx) => &path[idx + sep.len_utf8()..],
        None => path,
    }
}

/// Key under which a subdirectory is stored in a tree.
pub(crate) fn dir_key(name: &str) -> String {
    format!("{MAIN_SEPARATOR}{name}")
}
