//! File inventory reader.
//!
//! # Design
//! - Metadata follows symbolic links, the way `stat` does.
//! - Entries that cannot be read or are not regular files are skipped with a
//!   log line and counted; they never fail the listing.
//! - Directory listings are non-recursive and sorted by file name.

use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use globset::{Glob, GlobMatcher};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};
use crate::model::FileRecord;

/// Records gathered by one inventory call plus the number of skipped entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryListing {
    /// Regular files, in input or name order.
    pub files: Vec<FileRecord>,
    /// Entries left out because they could not be read or were not files.
    pub skipped: usize,
}

/// Describe each path that is a regular file, preserving input order.
pub fn stat_files<P: AsRef<Path>>(paths: &[P]) -> InventoryListing {
    let mut listing = InventoryListing::default();
    for path in paths {
        let path = path.as_ref();
        match file_record(path) {
            Ok(Some(record)) => listing.files.push(record),
            Ok(None) => {
                warn!(path = %path.display(), "skipping non-file selection");
                listing.skipped += 1;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to stat selection");
                listing.skipped += 1;
            }
        }
    }
    listing
}

/// Describe the regular files directly inside `folder`.
///
/// A folder that cannot be read yields an empty listing.
pub fn list_directory(folder: &Path) -> InventoryListing {
    collect_directory(folder, None)
}

/// Like [`list_directory`], keeping only file names that match `pattern`.
///
/// # Errors
///
/// Returns [`FsOpsError::Glob`] when `pattern` does not compile.
pub fn list_directory_matching(folder: &Path, pattern: Option<&str>) -> FsOpsResult<InventoryListing> {
    let matcher = pattern.map(compile_glob).transpose()?;
    Ok(collect_directory(folder, matcher.as_ref()))
}

fn compile_glob(pattern: &str) -> FsOpsResult<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|source| FsOpsError::Glob {
            operation: "inventory.glob",
            pattern: pattern.to_string(),
            source,
        })
}

fn collect_directory(folder: &Path, matcher: Option<&GlobMatcher>) -> InventoryListing {
    let mut listing = InventoryListing::default();
    match fs::metadata(folder) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => {
            warn!(folder = %folder.display(), "folder is not a directory");
            return listing;
        }
        Err(err) => {
            warn!(folder = %folder.display(), error = %err, "failed to read folder");
            return listing;
        }
    }

    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                warn!(folder = %folder.display(), error = %err, "failed to read folder");
                return InventoryListing::default();
            }
            Err(err) => {
                warn!(folder = %folder.display(), error = %err, "skipping unreadable entry");
                listing.skipped += 1;
                continue;
            }
        };

        if let Some(matcher) = matcher
            && !matcher.is_match(entry.file_name())
        {
            continue;
        }

        let path = entry.path();
        match file_record(path) {
            Ok(Some(record)) => listing.files.push(record),
            Ok(None) => {
                debug!(path = %path.display(), "skipping non-file entry");
                listing.skipped += 1;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to stat entry");
                listing.skipped += 1;
            }
        }
    }
    listing
}

/// Describe `path` when it resolves to a regular file.
///
/// # Errors
///
/// Returns the IO error when metadata cannot be read.
pub fn file_record(path: &Path) -> io::Result<Option<FileRecord>> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Ok(None);
    }
    record_from_metadata(path, &metadata).map(Some)
}

fn record_from_metadata(path: &Path, metadata: &Metadata) -> io::Result<FileRecord> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let modified: DateTime<Utc> = metadata.modified()?.into();
    Ok(FileRecord {
        path: path.to_path_buf(),
        ext: extension_of(&name).to_string(),
        name,
        size: metadata.len(),
        modified,
    })
}

/// Extension of a file name, including the dot; empty for dotfiles and names
/// without one.
#[must_use]
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => "",
        Some(index) => &name[index..],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renamiq_test_support::fixtures::{scratch_dir, seed_file, seed_files};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn extensions_follow_last_dot_convention() {
        assert_eq!(extension_of("a.txt"), ".txt");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of("a."), ".");
    }

    #[test]
    fn stat_files_preserves_order_and_skips_failures() -> TestResult {
        let dir = scratch_dir("inventory-stat")?;
        let paths = seed_files(dir.path(), &[("b.txt", b"bb"), ("a.md", b"a")])?;
        let sub = dir.path().join("sub");
        fs::create_dir(&sub)?;

        let listing = stat_files(&[
            paths[0].clone(),
            dir.path().join("missing.txt"),
            sub,
            paths[1].clone(),
        ]);

        let names: Vec<_> = listing.files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "a.md"]);
        assert_eq!(listing.skipped, 2);
        assert_eq!(listing.files[0].size, 2);
        assert_eq!(listing.files[0].ext, ".txt");
        assert_eq!(listing.files[1].ext, ".md");
        assert_eq!(listing.files[0].path, paths[0]);
        Ok(())
    }

    #[test]
    fn list_directory_returns_sorted_regular_files() -> TestResult {
        let dir = scratch_dir("inventory-list")?;
        seed_files(dir.path(), &[("c.txt", b"c"), ("a.txt", b"a"), (".env", b"x")])?;
        let nested = dir.path().join("nested");
        fs::create_dir(&nested)?;
        seed_file(&nested, "deep.txt", b"deep")?;

        let listing = list_directory(dir.path());

        let names: Vec<_> = listing.files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec![".env", "a.txt", "c.txt"]);
        assert_eq!(listing.skipped, 1);
        assert_eq!(listing.files[0].ext, "");
        Ok(())
    }

    #[test]
    fn unreadable_folder_yields_empty_listing() -> TestResult {
        let dir = scratch_dir("inventory-missing")?;
        let file = seed_file(dir.path(), "plain.txt", b"p")?;

        assert_eq!(list_directory(&dir.path().join("absent")), InventoryListing::default());
        assert_eq!(list_directory(&file), InventoryListing::default());
        Ok(())
    }

    #[test]
    fn glob_filters_by_file_name() -> TestResult {
        let dir = scratch_dir("inventory-glob")?;
        seed_files(dir.path(), &[("a.jpg", b"a"), ("b.png", b"b"), ("c.jpg", b"c")])?;

        let listing = list_directory_matching(dir.path(), Some("*.jpg"))?;
        let names: Vec<_> = listing.files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);

        let everything = list_directory_matching(dir.path(), None)?;
        assert_eq!(everything.files.len(), 3);
        Ok(())
    }

    #[test]
    fn bad_glob_is_an_input_error() -> TestResult {
        let dir = scratch_dir("inventory-bad-glob")?;
        let result = list_directory_matching(dir.path(), Some("[unclosed"));
        assert!(matches!(result, Err(FsOpsError::Glob { .. })));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_followed() -> TestResult {
        let dir = scratch_dir("inventory-symlink")?;
        let target = seed_file(dir.path(), "real.txt", b"real")?;
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(&target, &link)?;
        let dangling = dir.path().join("dangling.txt");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &dangling)?;

        let listing = stat_files(&[link.clone(), dangling]);
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].path, link);
        assert_eq!(listing.files[0].size, 4);
        assert_eq!(listing.skipped, 1);
        Ok(())
    }
}
