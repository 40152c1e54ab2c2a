//! Scratch directory fixtures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Create a temporary directory that is removed when dropped.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn scratch_dir(prefix: &str) -> io::Result<TempDir> {
    tempfile::Builder::new()
        .prefix(&format!("renamiq-{prefix}-"))
        .tempdir()
}

/// Write `contents` to `dir/name`, returning the full path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn seed_file(dir: &Path, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// Seed several files at once, returning their paths in input order.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn seed_files(dir: &Path, entries: &[(&str, &[u8])]) -> io::Result<Vec<PathBuf>> {
    entries
        .iter()
        .map(|(name, contents)| seed_file(dir, name, contents))
        .collect()
}

/// Sorted names of the immediate entries of `dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn entry_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

/// Path as an owned UTF-8 string, the shape used by rename requests.
#[must_use]
pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
