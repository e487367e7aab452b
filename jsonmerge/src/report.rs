//! Merge report types.

use serde::Serialize;

use crate::document::Overwrite;
use crate::error::{SkippedFile, WalkFailure};

/// Result of a merge run, apart from the document itself.
///
/// Skipped files never fail a run. A `walk_error` means the tree was only
/// partly merged; callers that need the whole tree must treat it as failure.
#[derive(Debug, Clone, Default, Serialize)]
#[non_exhaustive]
pub struct MergeReport {
    /// Number of files inserted into the document.
    pub merged_files: usize,
    /// Files left out because they could not be read, decoded or keyed.
    pub skipped_files: Vec<SkippedFile>,
    /// Values discarded by later insertions.
    pub overwrites: Vec<Overwrite>,
    /// The traversal error that stopped the walk early, if any.
    pub walk_error: Option<WalkFailure>,
}

impl MergeReport {
    /// Whether the whole tree was walked.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.walk_error.is_none()
    }

    /// Total number of data files attempted (merged + skipped).
    #[must_use]
    pub fn files_attempted(&self) -> usize {
        self.merged_files + self.skipped_files.len()
    }
}
