//! Selecting the files of a directory for batch analysis.

use crate::error::{Result, SnifferError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".bzr",
    "__pycache__",
    "node_modules",
    "venv",
    ".env",
    "env",
    ".venv",
    "virtualenv",
    ".virtualenv",
];

/// Build a glob set; invalid patterns are an error.
pub fn build_globset<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern.as_ref()).map_err(|e| {
            SnifferError::config(format!("invalid file pattern '{}': {e}", pattern.as_ref()))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SnifferError::config(format!("invalid file patterns: {e}")))
}

fn is_excluded_dir(entry: &DirEntry, excluded: &HashSet<&str>) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || excluded.contains(name.as_ref())
}

/// Files under `dir`, sorted by path.
///
/// Dot-directories and directories named in `excluded_dirs` are skipped.
/// When `patterns` is non-empty a file is kept if any pattern matches its
/// file name or its path relative to `dir`. Unreadable entries are logged
/// and skipped.
pub fn collect_files<S: AsRef<str>>(
    dir: &Path,
    recursive: bool,
    patterns: &[S],
    excluded_dirs: &[S],
) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SnifferError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let globs = build_globset(patterns)?;
    let excluded: HashSet<&str> = excluded_dirs.iter().map(AsRef::as_ref).collect();
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry, &excluded));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("Skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !globs.is_empty() {
            let relative = path.strip_prefix(dir).unwrap_or(path);
            if !globs.is_match(entry.file_name()) && !globs.is_match(relative) {
                continue;
            }
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    tracing::debug!("Collected {} files from {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, b"x").expect("write");
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).expect("under root").to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_excluded_and_hidden_dirs_skipped() {
        let tmp = TempDir::new().expect("tempdir");
        touch(tmp.path(), "lib/libz.so");
        touch(tmp.path(), "app.bin");
        touch(tmp.path(), "node_modules/pkg/index.js");
        touch(tmp.path(), ".cache/blob");
        touch(tmp.path(), "deep/nested/libpng.so");

        let excluded: Vec<String> = DEFAULT_EXCLUDED_DIRS.iter().map(|d| (*d).to_string()).collect();
        let files = collect_files(tmp.path(), true, &[] as &[String], &excluded).expect("collects");

        assert_eq!(
            names(tmp.path(), &files),
            vec!["app.bin", "deep/nested/libpng.so", "lib/libz.so"]
        );
    }

    #[test]
    fn test_non_recursive_and_patterns() {
        let tmp = TempDir::new().expect("tempdir");
        touch(tmp.path(), "a.so");
        touch(tmp.path(), "b.txt");
        touch(tmp.path(), "sub/c.so");

        let top = collect_files(tmp.path(), false, &[] as &[&str], &[]).expect("collects");
        assert_eq!(names(tmp.path(), &top), vec!["a.so", "b.txt"]);

        let so = collect_files(tmp.path(), true, &["*.so"], &[]).expect("collects");
        assert_eq!(names(tmp.path(), &so), vec!["a.so", "sub/c.so"]);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let tmp = TempDir::new().expect("tempdir");
        let err = collect_files(tmp.path(), true, &["a[b"], &[]).expect_err("bad glob");
        assert!(matches!(err, SnifferError::Config(_)));
    }

    #[test]
    fn test_missing_dir_is_error() {
        assert!(collect_files(Path::new("/no/such/dir"), true, &[] as &[&str], &[]).is_err());
    }
}
