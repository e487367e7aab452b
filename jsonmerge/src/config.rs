//! Configuration types for a merge run.

use std::path::PathBuf;

/// What to do when a file's key path collides with a value already merged.
///
/// A collision happens when one file's key path is a strict prefix of
/// another's (`a.json` and `a/b.json`) and the slot `a` cannot serve as both:
/// `a.json` holds an array or scalar, or it lands after `a/b.json` and would
/// replace the merged subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictPolicy {
    /// The later insertion replaces whatever occupied the slot. The discarded
    /// value is reported as an [`Overwrite`](crate::Overwrite).
    #[default]
    Overwrite,
    /// Abort the run with [`MergeError::Conflict`](crate::MergeError::Conflict).
    Error,
}

/// Source options for a merge run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct MergeConfig {
    /// Directory to scan recursively (default: `.`).
    pub root: PathBuf,
    /// Recognized data-file extension, without the leading dot (default: `json`).
    pub extension: String,
    /// Exclude patterns (glob format), matched against the path relative to
    /// `root` and against the bare file name.
    pub exclude: Vec<String>,
    /// Concrete files that are never merged, even when they sit under `root`.
    ///
    /// Used for the output file, so that re-running over a tree that already
    /// contains a previous output does not fold it back in.
    pub skip_paths: Vec<PathBuf>,
    /// Whether to follow symbolic links to directories (default: `false`).
    pub follow_links: bool,
    /// Maximum directory traversal depth (default: unbounded).
    pub max_depth: usize,
    /// Maximum size of a single data file in bytes (default: unbounded).
    /// Larger files are skipped.
    pub max_file_size: u64,
    /// Collision handling, see [`ConflictPolicy`].
    pub on_conflict: ConflictPolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extension: "json".to_owned(),
            exclude: Vec::new(),
            skip_paths: Vec::new(),
            follow_links: false,
            max_depth: usize::MAX,
            max_file_size: u64::MAX,
            on_conflict: ConflictPolicy::Overwrite,
        }
    }
}

impl MergeConfig {
    /// Config scanning `root` with every other option at its default.
    #[must_use]
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// The suffix a file name must end with to be merged, e.g. `.json`.
    #[must_use]
    pub fn file_suffix(&self) -> String {
        format!(".{}", self.extension)
    }
}
