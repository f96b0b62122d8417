//! Directory listing, tree and bulk operation tests.

mod common;

use std::fs;
use std::path::MAIN_SEPARATOR;

use common::{path_str, Fixture};
use filekit::{Dir, DirOptions, EntryKind, FileKitError, OutputMode};

#[test]
fn test_open_all_option_combinations() {
    let fixture = Fixture::new();
    let tmp = path_str(&fixture.tmp());

    for mode in [OutputMode::Default, OutputMode::Absolute, OutputMode::Relative] {
        for recursive in [false, true] {
            let options = DirOptions::new().with_mode(mode).with_recursive(recursive);
            let dir = Dir::open(&tmp, options).unwrap();
            assert_eq!(dir.path(), tmp);
            assert_eq!(dir.tree().len(), 1);
        }
    }
}

#[test]
fn test_single_level_counts() {
    let fixture = Fixture::new();
    let dir = Dir::open(path_str(&fixture.tmp()), DirOptions::new()).unwrap();

    assert_eq!(dir.files().len(), 3);
    assert_eq!(dir.objects().len(), 3);
    let dirs = dir
        .objects()
        .iter()
        .filter(|o| o.kind == EntryKind::Directory)
        .count();
    assert_eq!(dirs, 1);
}

#[test]
fn test_recursive_counts() {
    let fixture = Fixture::new();
    let options = DirOptions::new().with_recursive(true);
    let dir = Dir::open(path_str(&fixture.tmp()), options).unwrap();

    assert_eq!(dir.files().len(), 4);
    assert_eq!(dir.objects().len(), 4);
}

#[test]
fn test_recursive_relative_files_only() {
    let fixture = Fixture::new();
    let options = DirOptions::new()
        .with_recursive(true)
        .with_mode(OutputMode::Relative)
        .with_files_only(true);
    let dir = Dir::open(path_str(&fixture.tmp()), options).unwrap();

    let mut files = dir.files().to_vec();
    files.sort();
    let inner = format!("sub{MAIN_SEPARATOR}inner.md");
    assert_eq!(files, vec!["data.csv".to_string(), inner, "test.txt".to_string()]);
}

#[test]
fn test_absolute_listing_is_under_canonical_root() {
    let fixture = Fixture::new();
    let options = DirOptions::new().with_mode(OutputMode::Absolute);
    let dir = Dir::open(path_str(&fixture.tmp()), options).unwrap();

    let root = path_str(dir.canonical_path());
    assert!(dir.files().iter().all(|f| f.starts_with(&root)));
    assert!(dir
        .files()
        .iter()
        .any(|f| f.ends_with(&format!("sub{MAIN_SEPARATOR}"))));
}

#[test]
fn test_tree_shape() {
    let fixture = Fixture::new();
    let dir = Dir::open(path_str(&fixture.tmp()), DirOptions::new()).unwrap();

    let (key, root) = dir.tree().dirs().next().unwrap();
    assert_eq!(key, path_str(&fs::canonicalize(fixture.tmp()).unwrap()));

    let mut files: Vec<_> = root.files().collect();
    files.sort();
    assert_eq!(files, vec!["data.csv", "test.txt"]);

    let sub_key = format!("{MAIN_SEPARATOR}sub");
    let sub = root.get(&sub_key).unwrap();
    assert_eq!(sub.files().collect::<Vec<_>>(), vec!["inner.md"]);
    assert!(root.dirs().all(|(k, _)| k.starts_with(MAIN_SEPARATOR)));
}

#[test]
fn test_open_nonexistent_directory() {
    let fixture = Fixture::new();
    let bad = fixture.workspace.path().join("bad");

    let result = Dir::open(path_str(&bad), DirOptions::new());

    assert!(matches!(result, Err(FileKitError::DirectoryNotFound(_))));
    assert!(!bad.exists());
}

#[test]
fn test_copy_and_empty_round_trip() {
    let fixture = Fixture::new();
    let copy = fixture.make_dir("copy");

    let dir = Dir::open(path_str(&fixture.tmp()), DirOptions::new()).unwrap();
    dir.copy_dir(&copy, true).unwrap();
    assert!(copy.join("tmp").exists());
    assert!(copy.join("tmp").join("sub").join("inner.md").is_file());

    let copied = Dir::open(path_str(&copy), DirOptions::new()).unwrap();
    let report = copied.empty_dir(true);

    assert!(report.is_complete());
    assert!(!copy.exists());
    assert!(fixture.tmp().join("test.txt").is_file());
}

#[test]
fn test_empty_dir_keeps_root_when_asked() {
    let fixture = Fixture::new();
    let dir = Dir::open(path_str(&fixture.tmp()), DirOptions::new()).unwrap();

    let report = dir.empty_dir(false);

    assert!(report.is_complete());
    assert!(fixture.tmp().is_dir());
    assert_eq!(fs::read_dir(fixture.tmp()).unwrap().count(), 0);
}
