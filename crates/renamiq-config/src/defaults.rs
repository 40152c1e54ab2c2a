//! Default values applied before the configuration file and environment layers.

/// Default log level when neither the file nor the environment sets one.
pub(crate) const LOG_LEVEL: &str = "info";
/// Default event bus capacity (broadcast channel and replay ring).
pub(crate) const EVENT_CAPACITY: usize = 256;
/// Upper bound accepted for the event bus capacity.
pub(crate) const MAX_EVENT_CAPACITY: usize = 65_536;
/// Extension used for persisted rename templates.
pub(crate) const TEMPLATE_EXTENSION: &str = "rnq";
/// Suggested file name when saving a template.
pub(crate) const TEMPLATE_FILE_NAME: &str = "template.rnq";
/// Where the most recent undo script is kept between invocations.
pub(crate) const UNDO_JOURNAL: &str = ".renamiq-undo.json";
