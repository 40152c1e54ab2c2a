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

//! Layered configuration for Renamiq.
//!
//! Layout: `model.rs` (typed sections), `loader.rs` (defaults → file → env
//! layering), `validate.rs` (field validation), `defaults.rs` (built-in values).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ConfigLoader, ENV_CONFIG_FILE, ENV_EVENT_CAPACITY, ENV_LOG_FORMAT, ENV_LOG_LEVEL,
    ENV_TEMPLATE_EXTENSION, ENV_UNDO_GUARD_TARGETS, ENV_UNDO_JOURNAL,
};
pub use model::{AppConfig, EventSettings, LoggingSettings, TemplateSettings, UndoSettings};
pub use validate::validate_config;
