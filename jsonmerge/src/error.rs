//! Error and diagnostic types for merge runs.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Why a single data file was left out of the merged document.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipKind {
    /// An I/O error occurred while opening or reading the file.
    IoError,
    /// The file exceeded the configured maximum size limit.
    FileTooLarge,
    /// The file content is not valid UTF-8.
    InvalidEncoding,
    /// The file content could not be parsed as JSON.
    JsonParseError,
    /// The top-level JSON value is neither an object nor an array.
    UnknownStructure,
    /// No usable key path could be derived from the file's location.
    InvalidKeyPath,
    /// An exclude glob pattern could not be parsed.
    InvalidExcludePattern,
}

/// A data file that was skipped. The run continues without it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct SkippedFile {
    /// The offending file (or pattern, for [`SkipKind::InvalidExcludePattern`]).
    pub file: PathBuf,
    /// The kind of failure.
    pub kind: SkipKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl SkippedFile {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, kind: SkipKind, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind,
            message: message.into(),
        }
    }

    /// Format the diagnostic for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("{}: [skipped] {}", self.file.display(), self.message)
    }
}

/// A directory traversal error. The walk stopped here; everything merged
/// before it is kept.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct WalkFailure {
    /// Path at which traversal failed.
    pub path: PathBuf,
    /// Human-readable description of the failure.
    pub message: String,
}

impl WalkFailure {
    /// Format the failure for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("walking the path {}: {}", self.path.display(), self.message)
    }
}

/// Errors that fail a merge run as a whole.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MergeError {
    /// A key path collided with an existing value under [`ConflictPolicy::Error`](crate::ConflictPolicy::Error).
    #[error("key path `{key_path}` collides with an existing {existing} at `{at}`")]
    Conflict {
        /// Key path of the file being inserted.
        key_path: String,
        /// Prefix of `key_path` where the existing value sits.
        at: String,
        /// JSON type of the existing value.
        existing: String,
    },

    /// The output file could not be created, written or moved into place.
    #[error("failed writing output file {}: {source}", .path.display())]
    Output {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The merged document could not be encoded.
    #[error("failed encoding final data to JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_skipped_file() {
        let skipped = SkippedFile::new(
            "data/broken.json",
            SkipKind::JsonParseError,
            "JSON parse error: EOF while parsing an object at line 1 column 1",
        );

        let formatted = skipped.format_human_readable();
        assert!(formatted.starts_with("data/broken.json: [skipped]"));
        assert!(formatted.contains("EOF while parsing"));
    }

    #[test]
    fn test_format_walk_failure() {
        let failure = WalkFailure {
            path: PathBuf::from("data/locked"),
            message: "Permission denied (os error 13)".to_owned(),
        };

        assert_eq!(
            failure.format_human_readable(),
            "walking the path data/locked: Permission denied (os error 13)"
        );
    }

    #[test]
    fn test_output_error_names_path() {
        let err = MergeError::Output {
            path: PathBuf::from("out/output.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };

        let msg = err.to_string();
        assert!(msg.contains("out/output.json"), "got: {msg}");
        assert!(msg.contains("no such directory"), "got: {msg}");
    }
}
