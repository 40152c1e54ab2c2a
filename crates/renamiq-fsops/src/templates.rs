//! Template document persistence.
//!
//! Templates are opaque JSON documents stored pretty-printed. Saving a path
//! without an extension appends the configured template extension.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{FsOpsError, FsOpsResult};

/// Extension applied to template files without one.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "rnq";

/// Reads and writes template documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateStore {
    extension: String,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_EXTENSION)
    }
}

impl TemplateStore {
    /// Store appending `extension` (without a dot) to bare paths.
    #[must_use]
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Extension appended to bare paths.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path a save to `path` will actually write.
    #[must_use]
    pub fn resolve_save_path(&self, path: &Path) -> PathBuf {
        if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(&self.extension)
        }
    }

    /// Write `document` as pretty JSON, returning the path written.
    ///
    /// # Errors
    ///
    /// Returns an error when `path` is empty, when serialization fails, or
    /// when the file cannot be written.
    pub fn save(&self, document: &Value, path: &Path) -> FsOpsResult<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(FsOpsError::InvalidInput {
                field: "path",
                reason: "template path must not be empty",
                value: None,
            });
        }
        let target = self.resolve_save_path(path);
        let rendered = serde_json::to_string_pretty(document)
            .map_err(|source| FsOpsError::json("template.serialize", &target, source))?;
        fs::write(&target, rendered)
            .map_err(|source| FsOpsError::io("template.write", &target, source))?;
        debug!(path = %target.display(), "template saved");
        Ok(target)
    }

    /// Read and parse the template at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not valid JSON.
    pub fn load(&self, path: &Path) -> FsOpsResult<Value> {
        let raw =
            fs::read_to_string(path).map_err(|source| FsOpsError::io("template.read", path, source))?;
        let document = serde_json::from_str(&raw)
            .map_err(|source| FsOpsError::json("template.parse", path, source))?;
        debug!(path = %path.display(), "template loaded");
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renamiq_test_support::fixtures::{scratch_dir, seed_file};
    use serde_json::json;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn bare_paths_gain_the_template_extension() {
        let store = TemplateStore::default();
        assert_eq!(
            store.resolve_save_path(Path::new("/t/photos")),
            PathBuf::from("/t/photos.rnq")
        );
        assert_eq!(
            store.resolve_save_path(Path::new("/t/photos.json")),
            PathBuf::from("/t/photos.json")
        );
        assert_eq!(
            TemplateStore::new("tpl").resolve_save_path(Path::new("x")),
            PathBuf::from("x.tpl")
        );
    }

    #[test]
    fn saved_templates_load_back() -> TestResult {
        let dir = scratch_dir("templates")?;
        let store = TemplateStore::default();
        let document = json!({ "rules": [{ "type": "prefix", "value": "IMG_" }], "counter": 1 });

        let written = store.save(&document, &dir.path().join("holiday"))?;
        assert_eq!(written, dir.path().join("holiday.rnq"));
        assert!(fs::read_to_string(&written)?.contains("\n  \"counter\": 1"));
        assert_eq!(store.load(&written)?, document);
        Ok(())
    }

    #[test]
    fn load_reports_parse_and_read_failures() -> TestResult {
        let dir = scratch_dir("templates-bad")?;
        let store = TemplateStore::default();
        let broken = seed_file(dir.path(), "broken.rnq", b"{ not json")?;

        assert!(matches!(
            store.load(&broken),
            Err(FsOpsError::Json {
                operation: "template.parse",
                ..
            })
        ));
        assert!(matches!(
            store.load(&dir.path().join("absent.rnq")),
            Err(FsOpsError::Io {
                operation: "template.read",
                ..
            })
        ));
        assert!(matches!(
            store.save(&json!({}), Path::new("")),
            Err(FsOpsError::InvalidInput { field: "path", .. })
        ));
        Ok(())
    }
}
