//! User-facing path selection seam.

use std::path::PathBuf;

use async_trait::async_trait;

/// Source of user-chosen paths (file dialogs, command-line arguments, tests).
///
/// Every method returns `None` when the user dismisses the prompt.
#[async_trait]
pub trait PathPicker: Send + Sync {
    /// Choose one or more files to rename.
    async fn pick_files(&self) -> Option<Vec<PathBuf>>;
    /// Choose a folder whose files should be listed.
    async fn pick_folder(&self) -> Option<PathBuf>;
    /// Choose where to save a template, starting from `default_name`.
    async fn pick_template_save_path(&self, default_name: &str) -> Option<PathBuf>;
    /// Choose a template to open.
    async fn pick_template_open_path(&self) -> Option<PathBuf>;
}
