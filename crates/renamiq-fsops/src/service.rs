//! Async facade over the rename engine, inventory reader and template store.
//!
//! # Design
//! - Filesystem work runs on `spawn_blocking`; items inside one call still run
//!   sequentially.
//! - Every call publishes domain events and updates metrics. Publishing with no
//!   subscribers is normal for the CLI and only logged at debug level.
//! - Per-item failures live in the returned results; the only errors surfaced
//!   are setup failures such as a panicked blocking task or a bad glob.

use std::path::PathBuf;
use std::time::Instant;

use renamiq_events::{Event, EventBus, InventorySource};
use renamiq_telemetry::Metrics;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::engine::{ItemReport, RenameEngine, UndoPolicy};
use crate::error::{FsOpsError, FsOpsResult};
use crate::inventory::{self, InventoryListing};
use crate::model::{
    BatchOutcome, FileRecord, ItemDisposition, RenameOperation, RenameResult, TemplateOutcome,
    UndoEntry,
};
use crate::namespace::Namespace;
use crate::picker::PathPicker;
use crate::templates::{DEFAULT_TEMPLATE_EXTENSION, TemplateStore};

/// Tunables for [`RenameService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsOpsSettings {
    /// Extension appended to template paths without one.
    pub template_extension: String,
    /// File name offered when picking a template save path.
    pub default_template_name: String,
    /// Behaviour when an undo target already exists.
    pub undo_policy: UndoPolicy,
}

impl Default for FsOpsSettings {
    fn default() -> Self {
        Self {
            template_extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
            default_template_name: format!("template.{DEFAULT_TEMPLATE_EXTENSION}"),
            undo_policy: UndoPolicy::default(),
        }
    }
}

/// Rename operations exposed to front ends.
#[derive(Clone)]
pub struct RenameService {
    events: EventBus,
    metrics: Metrics,
    settings: FsOpsSettings,
}

impl RenameService {
    /// Create a service with default settings.
    #[must_use]
    pub fn new(events: EventBus, metrics: Metrics) -> Self {
        Self {
            events,
            metrics,
            settings: FsOpsSettings::default(),
        }
    }

    /// Replace the service settings.
    #[must_use]
    pub fn with_settings(mut self, settings: FsOpsSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Event bus the service publishes to.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Metrics the service records into.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &FsOpsSettings {
        &self.settings
    }

    /// Describe the given paths, skipping anything that is not a readable file.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task fails.
    pub async fn stat_files(&self, paths: Vec<PathBuf>) -> FsOpsResult<Vec<FileRecord>> {
        let listing = tokio::task::spawn_blocking(move || inventory::stat_files(&paths))
            .await
            .map_err(|source| FsOpsError::task("inventory.stat", source))?;
        Ok(self.finish_inventory(InventorySource::Files, listing))
    }

    /// Describe the regular files directly inside `folder`, optionally
    /// filtered by a file-name glob.
    ///
    /// # Errors
    ///
    /// Returns an error when `pattern` does not compile or the blocking task
    /// fails. An unreadable folder yields an empty list.
    pub async fn list_directory(
        &self,
        folder: PathBuf,
        pattern: Option<String>,
    ) -> FsOpsResult<Vec<FileRecord>> {
        let listing = tokio::task::spawn_blocking(move || {
            inventory::list_directory_matching(&folder, pattern.as_deref())
        })
        .await
        .map_err(|source| FsOpsError::task("inventory.list", source))??;
        Ok(self.finish_inventory(InventorySource::Folder, listing))
    }

    /// Apply a rename batch to disk.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task fails; per-item failures are
    /// reported in the outcome.
    pub async fn execute_batch(
        &self,
        operations: Vec<RenameOperation>,
    ) -> FsOpsResult<BatchOutcome> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || {
            service.run_batch(RenameEngine::live(), &operations, BatchMode::Execute)
        })
        .await
        .map_err(|source| FsOpsError::task("rename.execute", source))
    }

    /// Predict the outcome of a rename batch without touching disk.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task fails.
    pub async fn preview_batch(
        &self,
        operations: Vec<RenameOperation>,
    ) -> FsOpsResult<BatchOutcome> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || {
            service.run_batch(RenameEngine::preview(), &operations, BatchMode::Preview)
        })
        .await
        .map_err(|source| FsOpsError::task("rename.preview", source))
    }

    /// Replay an undo script.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task fails; per-entry failures are
    /// reported in the results.
    pub async fn undo_batch(&self, entries: Vec<UndoEntry>) -> FsOpsResult<Vec<RenameResult>> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.run_undo(&entries))
            .await
            .map_err(|source| FsOpsError::task("rename.undo", source))
    }

    /// Save a template document; failures are reported in the outcome.
    pub async fn save_template(&self, document: Value, path: PathBuf) -> TemplateOutcome {
        let store = self.template_store();
        let saved = tokio::task::spawn_blocking(move || store.save(&document, &path))
            .await
            .map_err(|source| FsOpsError::task("template.save", source))
            .and_then(|result| result);
        match saved {
            Ok(path) => {
                self.publish_event(Event::TemplateSaved {
                    path: path.display().to_string(),
                });
                TemplateOutcome::saved(path)
            }
            Err(err) => template_failure("save", &err),
        }
    }

    /// Load a template document; failures are reported in the outcome.
    pub async fn load_template(&self, path: PathBuf) -> TemplateOutcome {
        let store = self.template_store();
        let source_path = path.clone();
        let loaded = tokio::task::spawn_blocking(move || store.load(&source_path))
            .await
            .map_err(|source| FsOpsError::task("template.load", source))
            .and_then(|result| result);
        match loaded {
            Ok(document) => {
                self.publish_event(Event::TemplateLoaded {
                    path: path.display().to_string(),
                });
                TemplateOutcome::loaded(document)
            }
            Err(err) => template_failure("load", &err),
        }
    }

    /// Ask `picker` for files and describe them; a dismissed picker yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task fails.
    pub async fn select_files(&self, picker: &dyn PathPicker) -> FsOpsResult<Vec<FileRecord>> {
        match picker.pick_files().await {
            Some(paths) => self.stat_files(paths).await,
            None => {
                debug!("file selection cancelled");
                Ok(Vec::new())
            }
        }
    }

    /// Ask `picker` for a folder and list it; a dismissed picker yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task fails.
    pub async fn select_folder(&self, picker: &dyn PathPicker) -> FsOpsResult<Vec<FileRecord>> {
        match picker.pick_folder().await {
            Some(folder) => self.list_directory(folder, None).await,
            None => {
                debug!("folder selection cancelled");
                Ok(Vec::new())
            }
        }
    }

    /// Ask `picker` where to save `document`, then save it.
    pub async fn save_template_with(
        &self,
        picker: &dyn PathPicker,
        document: Value,
    ) -> TemplateOutcome {
        match picker
            .pick_template_save_path(&self.settings.default_template_name)
            .await
        {
            Some(path) => self.save_template(document, path).await,
            None => TemplateOutcome::cancelled(),
        }
    }

    /// Ask `picker` which template to open, then load it.
    pub async fn load_template_with(&self, picker: &dyn PathPicker) -> TemplateOutcome {
        match picker.pick_template_open_path().await {
            Some(path) => self.load_template(path).await,
            None => TemplateOutcome::cancelled(),
        }
    }

    fn template_store(&self) -> TemplateStore {
        TemplateStore::new(self.settings.template_extension.clone())
    }

    fn finish_inventory(&self, source: InventorySource, listing: InventoryListing) -> Vec<FileRecord> {
        self.metrics
            .record_inventory(source.as_str(), listing.files.len(), listing.skipped);
        info!(
            source = source.as_str(),
            files = listing.files.len(),
            skipped = listing.skipped,
            "inventory loaded"
        );
        self.publish_event(Event::InventoryLoaded {
            source,
            files: listing.files.len(),
            skipped: listing.skipped,
        });
        listing.files
    }

    fn run_batch<N: Namespace>(
        &self,
        mut engine: RenameEngine<N>,
        operations: &[RenameOperation],
        mode: BatchMode,
    ) -> BatchOutcome {
        let batch_id = Uuid::new_v4();
        let span = info_span!("rename_batch", %batch_id, mode = mode.as_str());
        let _entered = span.enter();
        let started = Instant::now();

        self.metrics.inc_rename_batch(mode.as_str());
        self.publish_event(Event::BatchStarted {
            batch_id,
            operations: operations.len(),
            preview: mode == BatchMode::Preview,
        });

        let run = engine.execute_batch(operations, |report| {
            if mode == BatchMode::Execute {
                self.record_item(batch_id, report);
            }
        });

        let outcome = BatchOutcome {
            batch_id,
            results: run.results,
            undo_data: run.undo,
        };
        let summary = outcome.summary();
        if mode == BatchMode::Execute {
            self.metrics.observe_batch_duration(started.elapsed());
        }
        self.publish_event(Event::BatchCompleted {
            batch_id,
            succeeded: summary.succeeded,
            failed: summary.failed,
            undo_entries: outcome.undo_data.len(),
        });
        outcome
    }

    fn record_item(&self, batch_id: Uuid, report: ItemReport<'_>) {
        let ItemReport {
            index,
            result,
            disposition,
        } = report;
        self.metrics.inc_rename_item(disposition.as_str());
        let event = match disposition {
            ItemDisposition::Renamed => Event::ItemRenamed {
                batch_id,
                index,
                old_path: result.old_path.display().to_string(),
                new_path: result.new_path.display().to_string(),
            },
            ItemDisposition::Unchanged => Event::ItemUnchanged {
                batch_id,
                index,
                path: result.old_path.display().to_string(),
            },
            ItemDisposition::Failed(kind) => {
                self.metrics.inc_rename_failure(kind.as_str());
                Event::ItemFailed {
                    batch_id,
                    index,
                    old_path: result.old_path.display().to_string(),
                    kind: kind.as_str().to_string(),
                    message: result.error.clone().unwrap_or_default(),
                }
            }
        };
        self.publish_event(event);
    }

    fn run_undo(&self, entries: &[UndoEntry]) -> Vec<RenameResult> {
        let batch_id = Uuid::new_v4();
        let span = info_span!("undo_batch", %batch_id);
        let _entered = span.enter();

        self.publish_event(Event::UndoStarted {
            batch_id,
            entries: entries.len(),
        });

        let mut engine = RenameEngine::live();
        let results = engine.undo_batch(entries, self.settings.undo_policy, |report| {
            if report.result.success {
                self.metrics.inc_undo_item("restored");
            } else {
                self.metrics.inc_undo_item("failed");
                self.publish_event(Event::UndoItemFailed {
                    batch_id,
                    index: report.index,
                    old_path: report.result.old_path.display().to_string(),
                    message: report.result.error.clone().unwrap_or_default(),
                });
            }
        });

        let restored = results.iter().filter(|result| result.success).count();
        self.publish_event(Event::UndoCompleted {
            batch_id,
            restored,
            failed: results.len() - restored,
        });
        results
    }

    fn publish_event(&self, event: Event) {
        self.metrics.inc_event(event.kind());
        if let Err(error) = self.events.publish(event) {
            debug!(
                event_id = error.event_id(),
                event_kind = error.event_kind(),
                error = %error,
                "event published without subscribers"
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchMode {
    Execute,
    Preview,
}

impl BatchMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Execute => "execute",
            Self::Preview => "preview",
        }
    }
}

fn template_failure(action: &'static str, err: &FsOpsError) -> TemplateOutcome {
    let detail = err.detail();
    warn!(action, error = %detail, "template operation failed");
    TemplateOutcome::failed(detail)
}
