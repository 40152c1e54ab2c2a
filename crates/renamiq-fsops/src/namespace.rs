//! Filesystem views the rename engine runs against.
//!
//! # Design
//! - `LiveNamespace` talks to the real filesystem.
//! - `PreviewNamespace` layers pending renames over the live view without
//!   touching disk, so dry runs see chains and intra-batch collisions.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Minimal view of a directory tree needed to plan and perform renames.
pub trait Namespace {
    /// True when `path` resolves (following links) to a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// True when any entry exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// True when both paths name the same underlying entry.
    fn is_same_entry(&self, left: &Path, right: &Path) -> bool;

    /// True when the parent directory lists an entry spelled byte-for-byte
    /// like the file name of `path`.
    fn has_exact_name(&self, path: &Path) -> bool;

    /// Move `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error when the move fails.
    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveNamespace;

impl Namespace for LiveNamespace {
    fn is_file(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|metadata| metadata.is_file())
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_same_entry(&self, left: &Path, right: &Path) -> bool {
        same_entry(left, right)
    }

    fn has_exact_name(&self, path: &Path) -> bool {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return false;
        };
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        fs::read_dir(parent).is_ok_and(|entries| {
            entries
                .filter_map(Result::ok)
                .any(|entry| entry.file_name() == name)
        })
    }

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

#[cfg(unix)]
fn same_entry(left: &Path, right: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::symlink_metadata(left), fs::symlink_metadata(right)) {
        (Ok(left), Ok(right)) => left.dev() == right.dev() && left.ino() == right.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_entry(left: &Path, right: &Path) -> bool {
    match (fs::canonicalize(left), fs::canonicalize(right)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

/// Live view overlaid with renames that have only been simulated.
#[derive(Debug, Clone, Default)]
pub struct PreviewNamespace {
    live: LiveNamespace,
    vacated: HashSet<PathBuf>,
    created: HashSet<PathBuf>,
}

impl PreviewNamespace {
    /// Empty overlay over the live filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn overlay(&self, path: &Path) -> Option<bool> {
        if self.created.contains(path) {
            Some(true)
        } else if self.vacated.contains(path) {
            Some(false)
        } else {
            None
        }
    }

    fn is_simulated(&self, path: &Path) -> bool {
        self.created.contains(path) || self.vacated.contains(path)
    }
}

impl Namespace for PreviewNamespace {
    fn is_file(&self, path: &Path) -> bool {
        self.overlay(path).unwrap_or_else(|| self.live.is_file(path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.overlay(path).unwrap_or_else(|| self.live.exists(path))
    }

    fn is_same_entry(&self, left: &Path, right: &Path) -> bool {
        if self.is_simulated(left) || self.is_simulated(right) {
            return false;
        }
        self.live.is_same_entry(left, right)
    }

    fn has_exact_name(&self, path: &Path) -> bool {
        self.overlay(path)
            .unwrap_or_else(|| self.live.has_exact_name(path))
    }

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        self.created.remove(from);
        self.vacated.insert(from.to_path_buf());
        self.vacated.remove(to);
        self.created.insert(to.to_path_buf());
        Ok(())
    }
}
