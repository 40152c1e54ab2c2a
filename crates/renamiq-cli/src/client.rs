//! Shared context, error types, and the argument-backed path picker.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use renamiq_config::AppConfig;
use renamiq_events::EventBus;
use renamiq_fsops::{FsOpsSettings, PathPicker, RenameService, UndoPolicy};
use renamiq_telemetry::Metrics;

/// Argument value that means "read from standard input".
pub(crate) const STDIN_MARKER: &str = "-";

/// CLI-level error type separating bad input, operational failures, and
/// batches where only some items failed.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    Partial { failed: usize, total: usize },
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Partial { .. } => 1,
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::Partial { failed, total } => format!("{failed} of {total} items failed"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) service: RenameService,
    pub(crate) config: AppConfig,
}

impl AppContext {
    /// Build the rename service described by `config`.
    pub(crate) fn from_config(config: AppConfig) -> CliResult<Self> {
        let metrics = Metrics::new()
            .map_err(|err| CliError::failure(anyhow!("failed to initialise metrics: {err}")))?;
        let events = EventBus::with_capacity(config.events.capacity);
        let settings = FsOpsSettings {
            template_extension: config.templates.extension.clone(),
            default_template_name: config.templates.default_file_name.clone(),
            undo_policy: UndoPolicy::from_guard(config.undo.guard_existing_targets),
        };
        let service = RenameService::new(events, metrics).with_settings(settings);
        Ok(Self { service, config })
    }

    /// Journal path from the command line, falling back to configuration.
    pub(crate) fn journal_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(|| self.config.undo.journal_path.clone(), Path::to_path_buf)
    }
}

/// Read a JSON argument from a file path, or from stdin when given `-`.
pub(crate) fn read_json_source<T>(source: &str, what: &str) -> CliResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let raw = if source == STDIN_MARKER {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .with_context(|| format!("failed to read {what} from stdin"))
            .map_err(CliError::failure)?;
        buffer
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("failed to read {what} from {source}"))
            .map_err(CliError::failure)?
    };
    serde_json::from_str(&raw)
        .map_err(|err| CliError::validation(format!("{what} is not valid JSON: {err}")))
}

/// Path picker answering from command-line arguments; absent arguments
/// behave like a dismissed dialog.
#[derive(Debug, Clone, Default)]
pub(crate) struct ArgsPicker {
    pub(crate) files: Option<Vec<PathBuf>>,
    pub(crate) folder: Option<PathBuf>,
    pub(crate) template: Option<PathBuf>,
}

#[async_trait]
impl PathPicker for ArgsPicker {
    async fn pick_files(&self) -> Option<Vec<PathBuf>> {
        self.files.clone().filter(|files| !files.is_empty())
    }

    async fn pick_folder(&self) -> Option<PathBuf> {
        self.folder.clone()
    }

    async fn pick_template_save_path(&self, default_name: &str) -> Option<PathBuf> {
        let path = self.template.as_ref()?;
        if path.is_dir() {
            Some(path.join(default_name))
        } else {
            Some(path.clone())
        }
    }

    async fn pick_template_open_path(&self) -> Option<PathBuf> {
        self.template.clone()
    }
}
