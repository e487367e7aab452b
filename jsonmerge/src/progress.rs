//! Read-only progress snapshot shared with a reporting task.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::document::MergedDocument;

/// Counters published by the merge worker after every insertion.
///
/// Cloning shares the same counters. Readers see a recent, not necessarily
/// current, value; the counters have no effect on the merge itself.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    top_level_keys: Arc<AtomicUsize>,
    merged_files: Arc<AtomicUsize>,
}

impl Progress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level key count of the document at the last insertion.
    #[must_use]
    pub fn top_level_keys(&self) -> usize {
        self.top_level_keys.load(Ordering::Relaxed)
    }

    /// Files merged so far.
    #[must_use]
    pub fn merged_files(&self) -> usize {
        self.merged_files.load(Ordering::Relaxed)
    }

    /// Publish the state of `document` after one more merged file.
    pub fn record(&self, document: &MergedDocument) {
        self.top_level_keys.store(document.len(), Ordering::Relaxed);
        self.merged_files.fetch_add(1, Ordering::Relaxed);
    }
}
