//! Event payload types published while renaming files.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifier assigned to each event emitted by the bus.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
pub const DEFAULT_REPLAY_CAPACITY: usize = 1_024;

/// Where an inventory listing came from.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InventorySource {
    /// Explicit list of file paths.
    Files,
    /// Immediate children of a folder.
    Folder,
}

impl InventorySource {
    /// Stable label used for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::Folder => "folder",
        }
    }
}

/// Typed domain events surfaced to UI subscribers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// File metadata was collected for a selection.
    InventoryLoaded {
        /// Origin of the listing.
        source: InventorySource,
        /// Number of regular files returned.
        files: usize,
        /// Number of entries skipped because they could not be read or were not files.
        skipped: usize,
    },
    /// A rename batch started executing.
    BatchStarted {
        /// Identifier of the batch.
        batch_id: Uuid,
        /// Number of operations submitted.
        operations: usize,
        /// Whether the batch is a dry-run preview.
        preview: bool,
    },
    /// A single file was renamed.
    ItemRenamed {
        /// Identifier of the batch.
        batch_id: Uuid,
        /// Position of the operation within the batch.
        index: usize,
        /// Path before the rename.
        old_path: String,
        /// Path after the rename.
        new_path: String,
    },
    /// A rename resolved to the file's current name; nothing was touched.
    ItemUnchanged {
        /// Identifier of the batch.
        batch_id: Uuid,
        /// Position of the operation within the batch.
        index: usize,
        /// Path of the untouched file.
        path: String,
    },
    /// A single rename failed.
    ItemFailed {
        /// Identifier of the batch.
        batch_id: Uuid,
        /// Position of the operation within the batch.
        index: usize,
        /// Path the rename was attempted on.
        old_path: String,
        /// Machine-readable failure kind.
        kind: String,
        /// Human-readable failure detail.
        message: String,
    },
    /// A rename batch finished.
    BatchCompleted {
        /// Identifier of the batch.
        batch_id: Uuid,
        /// Items reported as successful (including no-ops).
        succeeded: usize,
        /// Items reported as failed.
        failed: usize,
        /// Entries recorded in the undo script.
        undo_entries: usize,
    },
    /// An undo script started replaying.
    UndoStarted {
        /// Identifier of the undo run.
        batch_id: Uuid,
        /// Number of entries to replay.
        entries: usize,
    },
    /// A single undo entry could not be restored.
    UndoItemFailed {
        /// Identifier of the undo run.
        batch_id: Uuid,
        /// Position of the entry within the script.
        index: usize,
        /// Path the file was expected at.
        old_path: String,
        /// Human-readable failure detail.
        message: String,
    },
    /// An undo script finished replaying.
    UndoCompleted {
        /// Identifier of the undo run.
        batch_id: Uuid,
        /// Entries restored to their original path.
        restored: usize,
        /// Entries that could not be restored.
        failed: usize,
    },
    /// A template document was written.
    TemplateSaved {
        /// Destination of the template file.
        path: String,
    },
    /// A template document was read.
    TemplateLoaded {
        /// Source of the template file.
        path: String,
    },
}

impl Event {
    /// Machine-friendly discriminator for subscribers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InventoryLoaded { .. } => "inventory_loaded",
            Self::BatchStarted { .. } => "batch_started",
            Self::ItemRenamed { .. } => "item_renamed",
            Self::ItemUnchanged { .. } => "item_unchanged",
            Self::ItemFailed { .. } => "item_failed",
            Self::BatchCompleted { .. } => "batch_completed",
            Self::UndoStarted { .. } => "undo_started",
            Self::UndoItemFailed { .. } => "undo_item_failed",
            Self::UndoCompleted { .. } => "undo_completed",
            Self::TemplateSaved { .. } => "template_saved",
            Self::TemplateLoaded { .. } => "template_loaded",
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Monotonic identifier assigned to the wrapped event.
    pub id: EventId,
    /// Timestamp recording when the envelope was produced.
    pub timestamp: DateTime<Utc>,
    /// Wrapped event payload.
    pub event: Event,
}
