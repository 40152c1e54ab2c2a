//! On-disk copy of the most recent undo script.
//!
//! # Design
//! - The journal is a pretty JSON document holding the batch id, creation
//!   time and undo entries.
//! - A missing journal means there is nothing to undo.
//! - After a replay only the failed entries are kept, so they can be retried;
//!   a fully successful replay removes the journal.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{FsOpsError, FsOpsResult};
use crate::model::{RenameResult, UndoEntry};

/// Persisted undo script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoJournal {
    /// Batch that produced the entries.
    pub batch_id: Uuid,
    /// When the journal was written.
    pub created_at: DateTime<Utc>,
    /// Entries to replay, in the order they should run.
    pub entries: Vec<UndoEntry>,
}

impl UndoJournal {
    /// Journal for `entries` produced by `batch_id`, stamped now.
    #[must_use]
    pub fn new(batch_id: Uuid, entries: Vec<UndoEntry>) -> Self {
        Self {
            batch_id,
            created_at: Utc::now(),
            entries,
        }
    }
}

/// Write `journal` to `path` as pretty JSON.
///
/// # Errors
///
/// Returns an error when the journal cannot be serialized or written.
pub fn save_undo_journal(path: &Path, journal: &UndoJournal) -> FsOpsResult<()> {
    let rendered = serde_json::to_string_pretty(journal)
        .map_err(|source| FsOpsError::json("journal.serialize", path, source))?;
    fs::write(path, rendered).map_err(|source| FsOpsError::io("journal.write", path, source))?;
    debug!(path = %path.display(), entries = journal.entries.len(), "undo journal written");
    Ok(())
}

/// Read the journal at `path`, or `None` when there is none.
///
/// # Errors
///
/// Returns an error when an existing journal cannot be read or parsed.
pub fn load_undo_journal(path: &Path) -> FsOpsResult<Option<UndoJournal>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(FsOpsError::io("journal.read", path, source)),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| FsOpsError::json("journal.parse", path, source))
}

/// Remove the journal at `path` if present.
///
/// # Errors
///
/// Returns an error when an existing journal cannot be removed.
pub fn clear_undo_journal(path: &Path) -> FsOpsResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FsOpsError::io("journal.remove", path, source)),
    }
}

/// Keep the entries whose replay failed, clearing the journal when none did.
///
/// `results` must line up with `journal.entries`.
///
/// # Errors
///
/// Returns an error when the journal cannot be rewritten or removed.
pub fn retain_failed_entries(
    path: &Path,
    journal: &UndoJournal,
    results: &[RenameResult],
) -> FsOpsResult<usize> {
    let remaining: Vec<UndoEntry> = journal
        .entries
        .iter()
        .zip(results)
        .filter(|(_, result)| !result.success)
        .map(|(entry, _)| entry.clone())
        .collect();

    if remaining.is_empty() {
        clear_undo_journal(path)?;
        info!(path = %path.display(), "undo journal cleared");
        return Ok(0);
    }

    let kept = remaining.len();
    save_undo_journal(
        path,
        &UndoJournal {
            batch_id: journal.batch_id,
            created_at: journal.created_at,
            entries: remaining,
        },
    )?;
    info!(path = %path.display(), remaining = kept, "undo journal trimmed to failed entries");
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenameFailure;
    use renamiq_test_support::fixtures::{scratch_dir, seed_file};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn entries() -> Vec<UndoEntry> {
        vec![
            UndoEntry::reversing("/d/a.txt".into(), "/d/x.txt".into()),
            UndoEntry::reversing("/d/b.txt".into(), "/d/y.txt".into()),
        ]
    }

    #[test]
    fn journal_round_trips() -> TestResult {
        let dir = scratch_dir("journal")?;
        let path = dir.path().join("undo.json");
        let journal = UndoJournal::new(Uuid::new_v4(), entries());

        save_undo_journal(&path, &journal)?;
        assert_eq!(load_undo_journal(&path)?, Some(journal));
        Ok(())
    }

    #[test]
    fn missing_journal_is_nothing_to_undo() -> TestResult {
        let dir = scratch_dir("journal-missing")?;
        let path = dir.path().join("undo.json");
        assert_eq!(load_undo_journal(&path)?, None);
        clear_undo_journal(&path)?;
        Ok(())
    }

    #[test]
    fn corrupt_journal_is_a_parse_error() -> TestResult {
        let dir = scratch_dir("journal-corrupt")?;
        let path = seed_file(dir.path(), "undo.json", b"[1, 2")?;
        assert!(matches!(
            load_undo_journal(&path),
            Err(FsOpsError::Json {
                operation: "journal.parse",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn replay_keeps_only_failed_entries() -> TestResult {
        let dir = scratch_dir("journal-trim")?;
        let path = dir.path().join("undo.json");
        let journal = UndoJournal::new(Uuid::new_v4(), entries());
        save_undo_journal(&path, &journal)?;

        let results = vec![
            RenameResult::succeeded("/d/x.txt".into(), "/d/a.txt".into()),
            RenameResult::failed(
                "/d/y.txt".into(),
                "/d/b.txt".into(),
                &RenameFailure::Filesystem(io::Error::from(io::ErrorKind::NotFound)),
            ),
        ];
        assert_eq!(retain_failed_entries(&path, &journal, &results)?, 1);
        let trimmed = load_undo_journal(&path)?.ok_or("journal should remain")?;
        assert_eq!(trimmed.entries, vec![journal.entries[1].clone()]);
        assert_eq!(trimmed.batch_id, journal.batch_id);

        let all_ok = vec![RenameResult::succeeded("/d/y.txt".into(), "/d/b.txt".into())];
        assert_eq!(retain_failed_entries(&path, &trimmed, &all_ok)?, 0);
        assert!(!path.exists());
        Ok(())
    }
}
