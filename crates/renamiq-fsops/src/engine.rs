//! Rename transaction engine.
//!
//! # Design
//! - Items run strictly in input order against a [`Namespace`]; a failure on one
//!   item is recorded and the batch moves on.
//! - Checks run in a fixed order and the first failure wins: source
//!   existence, target collision, empty name, forbidden characters, no-op.
//! - Targets are built by appending the proposed name to the source's parent
//!   as text, never with `Path::join`, so a name can never leave the source
//!   directory.
//! - Undo replays entries as raw renames. Existing undo targets are logged,
//!   and refused only under [`UndoPolicy::Guarded`].

use std::ffi::OsString;
use std::io;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf, is_separator};

use tracing::{debug, info, warn};

use crate::error::RenameFailure;
use crate::model::{ItemDisposition, RenameOperation, RenameResult, UndoEntry};
use crate::namespace::{LiveNamespace, Namespace, PreviewNamespace};
use crate::validate::validate_name;

/// What undo does when something already exists at the restore target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UndoPolicy {
    /// Issue the rename anyway and let the filesystem decide.
    #[default]
    Replace,
    /// Refuse and report a filesystem error for that entry.
    Guarded,
}

impl UndoPolicy {
    /// Policy matching the `undo.guard_existing_targets` setting.
    #[must_use]
    pub const fn from_guard(guard_existing_targets: bool) -> Self {
        if guard_existing_targets {
            Self::Guarded
        } else {
            Self::Replace
        }
    }
}

/// One processed item as seen by a batch observer.
#[derive(Debug, Clone, Copy)]
pub struct ItemReport<'a> {
    /// Position of the item in the input.
    pub index: usize,
    /// Result recorded for the item.
    pub result: &'a RenameResult,
    /// How the item resolved.
    pub disposition: ItemDisposition,
}

/// Results and undo script produced by a forward batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRun {
    /// One result per input operation, in input order.
    pub results: Vec<RenameResult>,
    /// Inverse mappings for the renames that actually happened.
    pub undo: Vec<UndoEntry>,
}

/// Applies rename batches against a namespace.
#[derive(Debug, Clone, Default)]
pub struct RenameEngine<N = LiveNamespace> {
    namespace: N,
}

impl RenameEngine<LiveNamespace> {
    /// Engine operating on the real filesystem.
    #[must_use]
    pub const fn live() -> Self {
        Self {
            namespace: LiveNamespace,
        }
    }
}

impl RenameEngine<PreviewNamespace> {
    /// Engine simulating renames over the real filesystem.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            namespace: PreviewNamespace::new(),
        }
    }
}

impl<N: Namespace> RenameEngine<N> {
    /// Engine over a caller-supplied namespace.
    #[must_use]
    pub const fn new(namespace: N) -> Self {
        Self { namespace }
    }

    /// Borrow the namespace, mainly to inspect a preview overlay.
    #[must_use]
    pub const fn namespace(&self) -> &N {
        &self.namespace
    }

    /// Run every operation in order, reporting each item to `observe`.
    pub fn execute_batch<F>(&mut self, operations: &[RenameOperation], mut observe: F) -> BatchRun
    where
        F: FnMut(ItemReport<'_>),
    {
        info!(operations = operations.len(), "starting rename batch");
        let mut run = BatchRun {
            results: Vec::with_capacity(operations.len()),
            undo: Vec::new(),
        };

        for (index, operation) in operations.iter().enumerate() {
            debug!(
                index,
                old_path = %operation.old_path.display(),
                new_name = %operation.new_name,
                "attempting rename"
            );
            let target = resolve_target(&operation.old_path, &operation.new_name);
            let (result, disposition) = match self.apply(operation, &target) {
                Ok(ItemDisposition::Renamed) => {
                    run.undo.push(UndoEntry::reversing(
                        operation.old_path.clone(),
                        target.clone(),
                    ));
                    debug!(index, new_path = %target.display(), "renamed");
                    (
                        RenameResult::succeeded(operation.old_path.clone(), target),
                        ItemDisposition::Renamed,
                    )
                }
                Ok(disposition) => {
                    debug!(index, "name unchanged; skipping rename");
                    (
                        RenameResult::succeeded(operation.old_path.clone(), target),
                        disposition,
                    )
                }
                Err(failure) => {
                    warn!(
                        index,
                        old_path = %operation.old_path.display(),
                        kind = failure.kind().as_str(),
                        error = %failure,
                        "rename failed"
                    );
                    let kind = failure.kind();
                    (
                        RenameResult::failed(operation.old_path.clone(), target, &failure),
                        ItemDisposition::Failed(kind),
                    )
                }
            };
            observe(ItemReport {
                index,
                result: &result,
                disposition,
            });
            run.results.push(result);
        }

        let succeeded = run.results.iter().filter(|result| result.success).count();
        info!(
            succeeded,
            failed = run.results.len() - succeeded,
            undo_entries = run.undo.len(),
            "rename batch complete"
        );
        run
    }

    /// Replay undo entries as raw renames, reporting each item to `observe`.
    pub fn undo_batch<F>(
        &mut self,
        entries: &[UndoEntry],
        policy: UndoPolicy,
        mut observe: F,
    ) -> Vec<RenameResult>
    where
        F: FnMut(ItemReport<'_>),
    {
        info!(entries = entries.len(), ?policy, "starting undo");
        let mut results = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let (result, disposition) = match self.restore(entry, policy) {
                Ok(()) => (
                    RenameResult::succeeded(entry.old_path.clone(), entry.new_path.clone()),
                    ItemDisposition::Renamed,
                ),
                Err(failure) => {
                    warn!(
                        index,
                        old_path = %entry.old_path.display(),
                        new_path = %entry.new_path.display(),
                        error = %failure,
                        "undo rename failed"
                    );
                    let kind = failure.kind();
                    (
                        RenameResult::failed(
                            entry.old_path.clone(),
                            entry.new_path.clone(),
                            &failure,
                        ),
                        ItemDisposition::Failed(kind),
                    )
                }
            };
            observe(ItemReport {
                index,
                result: &result,
                disposition,
            });
            results.push(result);
        }

        let restored = results.iter().filter(|result| result.success).count();
        info!(restored, failed = results.len() - restored, "undo complete");
        results
    }

    fn apply(
        &mut self,
        operation: &RenameOperation,
        target: &Path,
    ) -> Result<ItemDisposition, RenameFailure> {
        let source = operation.old_path.as_path();
        if !self.namespace.is_file(source) {
            return Err(RenameFailure::SourceNotFound);
        }
        let unchanged = target == source;
        // An empty name resolves to the parent directory; emptiness reports it.
        let named = !operation.new_name.trim().is_empty();
        if !unchanged
            && named
            && self.namespace.exists(target)
            && !self.is_case_variant(source, target)
        {
            return Err(RenameFailure::TargetExists);
        }
        validate_name(&operation.new_name)?;
        if unchanged {
            return Ok(ItemDisposition::Unchanged);
        }
        self.namespace
            .rename(source, target)
            .map_err(RenameFailure::Filesystem)?;
        Ok(ItemDisposition::Renamed)
    }

    /// A target that differs from the source only by letter case, resolves to
    /// the same entry, and is not itself listed under that exact spelling is
    /// the source seen through a case-insensitive volume. A hard link spelled
    /// like the target is a separate entry and still collides.
    fn is_case_variant(&self, source: &Path, target: &Path) -> bool {
        let same_name = match (source.file_name(), target.file_name()) {
            (Some(left), Some(right)) => {
                left.to_string_lossy().to_lowercase() == right.to_string_lossy().to_lowercase()
            }
            _ => false,
        };
        same_name
            && self.namespace.is_same_entry(source, target)
            && !self.namespace.has_exact_name(target)
    }

    fn restore(&mut self, entry: &UndoEntry, policy: UndoPolicy) -> Result<(), RenameFailure> {
        if entry.old_path != entry.new_path && self.namespace.exists(&entry.new_path) {
            match policy {
                UndoPolicy::Replace => warn!(
                    new_path = %entry.new_path.display(),
                    "undo target already exists; rename may replace it"
                ),
                UndoPolicy::Guarded => {
                    return Err(RenameFailure::Filesystem(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("undo target already exists: {}", entry.new_path.display()),
                    )));
                }
            }
        }
        self.namespace
            .rename(&entry.old_path, &entry.new_path)
            .map_err(RenameFailure::Filesystem)
    }
}

/// Resolve the target of renaming `source` to `new_name` in the same directory.
#[must_use]
pub fn resolve_target(source: &Path, new_name: &str) -> PathBuf {
    let Some(parent) = source.parent().filter(|parent| !parent.as_os_str().is_empty()) else {
        return PathBuf::from(new_name);
    };
    let mut joined = OsString::from(parent.as_os_str());
    let has_separator = parent
        .as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|byte| is_separator(char::from(*byte)));
    if !has_separator {
        joined.push(MAIN_SEPARATOR_STR);
    }
    joined.push(new_name);
    PathBuf::from(joined)
}
