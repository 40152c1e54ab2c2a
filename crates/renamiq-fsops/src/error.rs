//! # Design
//!
//! - `FsOpsError` covers setup-level failures (task joins, template and journal
//!   IO, glob compilation) with constant messages and structured context.
//! - `RenameFailure` covers per-item rename failures; its message is what the
//!   caller sees in the result list, so it stays human-readable.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced outside the per-item rename contract.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// JSON parsing or serialization failures for templates and journals.
    #[error("fsops json failure")]
    Json {
        /// Operation that triggered the JSON failure.
        operation: &'static str,
        /// Path involved in the JSON failure.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Globset compilation failures.
    #[error("fsops glob failure")]
    Glob {
        /// Operation that triggered the glob failure.
        operation: &'static str,
        /// Glob pattern that failed to compile.
        pattern: String,
        /// Underlying globset error.
        source: globset::Error,
    },
    /// Input validation failures.
    #[error("fsops invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// A blocking filesystem task panicked or was cancelled.
    #[error("fsops task failure")]
    Task {
        /// Operation that was running on the task.
        operation: &'static str,
        /// Underlying join error.
        source: tokio::task::JoinError,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) const fn task(operation: &'static str, source: tokio::task::JoinError) -> Self {
        Self::Task { operation, source }
    }

    /// Message including every source in the chain, for user-facing reports.
    #[must_use]
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        detail
    }
}

/// Machine-readable classification of a failed rename.
///
/// Serialises under the variant name (`TargetExists`); [`Self::as_str`] gives
/// the snake-case label used for metrics and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenameErrorKind {
    /// The source path is not an existing regular file.
    SourceNotFound,
    /// Another entry already occupies the target path.
    TargetExists,
    /// The proposed name is empty or contains reserved characters.
    InvalidName,
    /// The rename itself failed at the filesystem level.
    FilesystemError,
}

impl RenameErrorKind {
    /// Stable label used for logs, metrics and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceNotFound => "source_not_found",
            Self::TargetExists => "target_exists",
            Self::InvalidName => "invalid_name",
            Self::FilesystemError => "filesystem_error",
        }
    }
}

/// Why a single rename did not happen.
#[derive(Debug, Error)]
pub enum RenameFailure {
    /// The source file does not exist (or is not a regular file).
    #[error("source file does not exist")]
    SourceNotFound,
    /// A file already exists at the resolved target path.
    #[error("target file already exists")]
    TargetExists,
    /// The proposed name is empty after trimming whitespace.
    #[error("invalid filename: empty name")]
    EmptyName,
    /// The proposed name contains a reserved or control character.
    #[error("invalid filename: contains invalid characters")]
    ForbiddenCharacter {
        /// First offending character.
        character: char,
    },
    /// The filesystem rejected the rename.
    #[error(transparent)]
    Filesystem(io::Error),
}

impl RenameFailure {
    /// Classification reported alongside the message.
    #[must_use]
    pub const fn kind(&self) -> RenameErrorKind {
        match self {
            Self::SourceNotFound => RenameErrorKind::SourceNotFound,
            Self::TargetExists => RenameErrorKind::TargetExists,
            Self::EmptyName | Self::ForbiddenCharacter { .. } => RenameErrorKind::InvalidName,
            Self::Filesystem(_) => RenameErrorKind::FilesystemError,
        }
    }
}
