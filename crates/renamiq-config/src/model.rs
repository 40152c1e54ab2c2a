//! Typed configuration model.
//!
//! Every section derives `serde(default)` so a configuration file only needs
//! to name the fields it overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Logging output.
    pub logging: LoggingSettings,
    /// Event bus sizing.
    pub events: EventSettings,
    /// Template persistence.
    pub templates: TemplateSettings,
    /// Undo journal and replay policy.
    pub undo: UndoSettings,
}

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Filter directive handed to the tracing subscriber (`RUST_LOG` still wins).
    pub level: String,
    /// `json` or `pretty`; `None` picks based on the build profile.
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: None,
        }
    }
}

/// Event bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventSettings {
    /// Capacity of the broadcast channel and replay ring.
    pub capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            capacity: defaults::EVENT_CAPACITY,
        }
    }
}

/// Template persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateSettings {
    /// Extension (without the dot) appended to template paths that lack one.
    pub extension: String,
    /// File name suggested to pickers when saving.
    pub default_file_name: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            extension: defaults::TEMPLATE_EXTENSION.to_string(),
            default_file_name: defaults::TEMPLATE_FILE_NAME.to_string(),
        }
    }
}

/// Undo settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UndoSettings {
    /// File holding the most recent undo script.
    pub journal_path: PathBuf,
    /// Refuse to replay an undo entry onto an existing file instead of replacing it.
    pub guard_existing_targets: bool,
}

impl Default for UndoSettings {
    fn default() -> Self {
        Self {
            journal_path: PathBuf::from(defaults::UNDO_JOURNAL),
            guard_existing_targets: false,
        }
    }
}
