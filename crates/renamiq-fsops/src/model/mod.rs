//! Wire-facing data carried between the rename engine and its callers.
//!
//! Field names serialize in camelCase so template and journal files stay
//! interchangeable with existing `.rnq` documents.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{RenameErrorKind, RenameFailure};

/// Description of one regular file in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Full path of the file.
    pub path: PathBuf,
    /// Final path component.
    pub name: String,
    /// Extension including the leading dot, or empty.
    pub ext: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

/// Request to rename a file within its own directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOperation {
    /// Current full path of the file.
    pub old_path: PathBuf,
    /// Proposed final path component.
    pub new_name: String,
}

impl RenameOperation {
    /// Build an operation from any path-like source and name.
    #[must_use]
    pub fn new(old_path: impl Into<PathBuf>, new_name: impl Into<String>) -> Self {
        Self {
            old_path: old_path.into(),
            new_name: new_name.into(),
        }
    }
}

/// Outcome of a single rename request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResult {
    /// Whether the file now lives at `new_path`.
    pub success: bool,
    /// Path the request started from.
    pub old_path: PathBuf,
    /// Resolved target path.
    pub new_path: PathBuf,
    /// Failure message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RenameErrorKind>,
}

impl RenameResult {
    pub(crate) const fn succeeded(old_path: PathBuf, new_path: PathBuf) -> Self {
        Self {
            success: true,
            old_path,
            new_path,
            error: None,
            kind: None,
        }
    }

    pub(crate) fn failed(old_path: PathBuf, new_path: PathBuf, failure: &RenameFailure) -> Self {
        Self {
            success: false,
            old_path,
            new_path,
            error: Some(failure.to_string()),
            kind: Some(failure.kind()),
        }
    }
}

/// Inverse of a performed rename, replayed as a move from `old_path` to
/// `new_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoEntry {
    /// Where the batch moved the file.
    pub old_path: PathBuf,
    /// Where the file lived before the batch.
    pub new_path: PathBuf,
}

impl UndoEntry {
    /// Inverse of a rename from `original` to `renamed`.
    #[must_use]
    pub const fn reversing(original: PathBuf, renamed: PathBuf) -> Self {
        Self {
            old_path: renamed,
            new_path: original,
        }
    }
}

/// Per-item classification handed to batch observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemDisposition {
    /// The file was moved.
    Renamed,
    /// Source and target were the same path; nothing was moved.
    Unchanged,
    /// The request failed.
    Failed(RenameErrorKind),
}

impl ItemDisposition {
    /// Outcome label used for metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Renamed => "renamed",
            Self::Unchanged => "unchanged",
            Self::Failed(_) => "failed",
        }
    }
}

/// Results of one batch plus the entries needed to reverse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Identifier correlating events and the undo journal.
    pub batch_id: Uuid,
    /// One result per input operation, in input order.
    pub results: Vec<RenameResult>,
    /// One entry per actually performed rename, in execution order.
    pub undo_data: Vec<UndoEntry>,
}

impl BatchOutcome {
    /// Aggregate counts over the results.
    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_results(&self.results)
    }
}

/// Counts describing a result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of results.
    pub total: usize,
    /// Results with `success == true`.
    pub succeeded: usize,
    /// Results with `success == false`.
    pub failed: usize,
}

impl BatchSummary {
    /// Count successes and failures in `results`.
    #[must_use]
    pub fn from_results(results: &[RenameResult]) -> Self {
        let succeeded = results.iter().filter(|result| result.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    /// True when no result failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Result of a template save or load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateOutcome {
    /// Whether the operation completed.
    pub success: bool,
    /// Path written, on a successful save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Parsed document, on a successful load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure message, including `"Cancelled"` when the picker was dismissed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error message reported when the user dismisses a picker.
pub const CANCELLED: &str = "Cancelled";

impl TemplateOutcome {
    /// Successful save at `path`.
    #[must_use]
    pub const fn saved(path: PathBuf) -> Self {
        Self {
            success: true,
            path: Some(path),
            data: None,
            error: None,
        }
    }

    /// Successful load producing `data`.
    #[must_use]
    pub const fn loaded(data: Value) -> Self {
        Self {
            success: true,
            path: None,
            data: Some(data),
            error: None,
        }
    }

    /// Failed operation with a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            path: None,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Picker dismissed by the user.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::failed(CANCELLED)
    }

    /// True when the failure was a dismissed picker.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.error.as_deref() == Some(CANCELLED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn results_serialize_in_camel_case() -> Result<(), serde_json::Error> {
        let ok = RenameResult::succeeded("/d/a.txt".into(), "/d/b.txt".into());
        assert_eq!(
            serde_json::to_value(&ok)?,
            json!({ "success": true, "oldPath": "/d/a.txt", "newPath": "/d/b.txt" })
        );

        let failed = RenameResult::failed(
            "/d/a.txt".into(),
            "/d/b.txt".into(),
            &RenameFailure::TargetExists,
        );
        assert_eq!(
            serde_json::to_value(&failed)?,
            json!({
                "success": false,
                "oldPath": "/d/a.txt",
                "newPath": "/d/b.txt",
                "error": "target file already exists",
                "kind": "TargetExists"
            })
        );
        Ok(())
    }

    #[test]
    fn operations_parse_from_plan_documents() -> Result<(), serde_json::Error> {
        let operations: Vec<RenameOperation> = serde_json::from_value(json!([
            { "oldPath": "/d/a.txt", "newName": "x.txt" },
            { "oldPath": "/d/b.txt", "newName": "y.txt" }
        ]))?;
        assert_eq!(operations[0], RenameOperation::new("/d/a.txt", "x.txt"));
        assert_eq!(operations[1].new_name, "y.txt");
        Ok(())
    }

    #[test]
    fn outcome_serializes_undo_data_key() -> Result<(), serde_json::Error> {
        let outcome = BatchOutcome {
            batch_id: Uuid::nil(),
            results: Vec::new(),
            undo_data: vec![UndoEntry::reversing("/d/a.txt".into(), "/d/b.txt".into())],
        };
        let value = serde_json::to_value(&outcome)?;
        assert_eq!(value["undoData"][0]["oldPath"], "/d/b.txt");
        assert_eq!(value["undoData"][0]["newPath"], "/d/a.txt");
        assert_eq!(value["batchId"], Uuid::nil().to_string());
        Ok(())
    }

    #[test]
    fn summary_counts_failures() {
        let results = vec![
            RenameResult::succeeded("/a".into(), "/b".into()),
            RenameResult::failed("/c".into(), "/d".into(), &RenameFailure::SourceNotFound),
        ];
        let summary = BatchSummary::from_results(&results);
        assert_eq!(
            summary,
            BatchSummary {
                total: 2,
                succeeded: 1,
                failed: 1
            }
        );
        assert!(!summary.is_clean());
        assert!(BatchSummary::default().is_clean());
    }

    #[test]
    fn template_outcomes_report_cancellation() {
        let cancelled = TemplateOutcome::cancelled();
        assert!(!cancelled.success);
        assert!(cancelled.is_cancelled());
        assert!(!TemplateOutcome::failed("boom").is_cancelled());
        assert!(TemplateOutcome::saved("/t.rnq".into()).success);
        assert_eq!(ItemDisposition::Failed(RenameErrorKind::InvalidName).as_str(), "failed");
    }
}
