#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Bulk rename engine and file inventory for Renamiq.
//!
//! Layout: `engine.rs` (batch execution, preview and undo), `namespace.rs`
//! (live and simulated filesystem views), `validate.rs` (proposed-name rules),
//! `inventory.rs` (file metadata listings), `templates.rs` and `journal.rs`
//! (JSON persistence), `picker.rs` (path selection seam), `service.rs` (async
//! facade with events and metrics), `model/` (wire types), `error.rs`.

pub mod engine;
pub mod error;
pub mod inventory;
pub mod journal;
pub mod model;
pub mod namespace;
pub mod picker;
pub mod service;
pub mod templates;
pub mod validate;

pub use engine::{BatchRun, ItemReport, RenameEngine, UndoPolicy, resolve_target};
pub use error::{FsOpsError, FsOpsResult, RenameErrorKind, RenameFailure};
pub use inventory::{InventoryListing, list_directory, list_directory_matching, stat_files};
pub use journal::{
    UndoJournal, clear_undo_journal, load_undo_journal, retain_failed_entries, save_undo_journal,
};
pub use model::{
    BatchOutcome, BatchSummary, FileRecord, ItemDisposition, RenameOperation, RenameResult,
    TemplateOutcome, UndoEntry,
};
pub use namespace::{LiveNamespace, Namespace, PreviewNamespace};
pub use picker::PathPicker;
pub use service::{FsOpsSettings, RenameService};
pub use templates::{DEFAULT_TEMPLATE_EXTENSION, TemplateStore};
pub use validate::validate_name;
