//! Layered configuration loader.
//!
//! # Design
//! - Layers apply in order: built-in defaults, an optional JSON file, then
//!   `RENAMIQ_*` environment variables.
//! - Environment access goes through an injectable lookup so tests never touch
//!   the process environment.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::AppConfig;
use crate::validate::{parse_bool, parse_usize, validate_config};

/// Environment variable naming the configuration file.
pub const ENV_CONFIG_FILE: &str = "RENAMIQ_CONFIG";
/// Environment override for `logging.level`.
pub const ENV_LOG_LEVEL: &str = "RENAMIQ_LOG_LEVEL";
/// Environment override for `logging.format`.
pub const ENV_LOG_FORMAT: &str = "RENAMIQ_LOG_FORMAT";
/// Environment override for `events.capacity`.
pub const ENV_EVENT_CAPACITY: &str = "RENAMIQ_EVENT_CAPACITY";
/// Environment override for `templates.extension`.
pub const ENV_TEMPLATE_EXTENSION: &str = "RENAMIQ_TEMPLATE_EXTENSION";
/// Environment override for `undo.journal_path`.
pub const ENV_UNDO_JOURNAL: &str = "RENAMIQ_UNDO_JOURNAL";
/// Environment override for `undo.guard_existing_targets`.
pub const ENV_UNDO_GUARD_TARGETS: &str = "RENAMIQ_UNDO_GUARD_TARGETS";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builder that resolves an [`AppConfig`] from its layers.
#[derive(Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: EnvLookup,
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConfigLoader")
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::from_process_env()
    }
}

impl ConfigLoader {
    /// Loader reading overrides from the process environment.
    #[must_use]
    pub fn from_process_env() -> Self {
        Self {
            file: None,
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Use an explicit configuration file instead of `RENAMIQ_CONFIG`.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Replace the environment lookup.
    #[must_use]
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// Resolve and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be read or parsed,
    /// or when any layered value fails validation.
    pub fn load(&self) -> ConfigResult<AppConfig> {
        let file = self
            .file
            .clone()
            .or_else(|| self.lookup(ENV_CONFIG_FILE).map(PathBuf::from));

        let mut config = match file {
            Some(path) => read_config_file(&path)?,
            None => AppConfig::default(),
        };

        self.apply_env(&mut config)?;
        validate_config(&config)?;
        Ok(config)
    }

    fn lookup(&self, name: &str) -> Option<String> {
        (self.env)(name).filter(|value| !value.trim().is_empty())
    }

    fn apply_env(&self, config: &mut AppConfig) -> ConfigResult<()> {
        if let Some(level) = self.lookup(ENV_LOG_LEVEL) {
            config.logging.level = level.trim().to_string();
        }
        if let Some(format) = self.lookup(ENV_LOG_FORMAT) {
            config.logging.format = Some(format.trim().to_ascii_lowercase());
        }
        if let Some(capacity) = self.lookup(ENV_EVENT_CAPACITY) {
            config.events.capacity = parse_usize("events", "capacity", &capacity)?;
        }
        if let Some(extension) = self.lookup(ENV_TEMPLATE_EXTENSION) {
            let extension = extension.trim().to_string();
            config.templates.default_file_name = format!("template.{extension}");
            config.templates.extension = extension;
        }
        if let Some(journal) = self.lookup(ENV_UNDO_JOURNAL) {
            config.undo.journal_path = PathBuf::from(journal);
        }
        if let Some(guard) = self.lookup(ENV_UNDO_GUARD_TARGETS) {
            config.undo.guard_existing_targets =
                parse_bool("undo", "guard_existing_targets", &guard)?;
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> ConfigResult<AppConfig> {
    debug!(path = %path.display(), "loading configuration file");
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
