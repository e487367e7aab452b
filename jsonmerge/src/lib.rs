//! # jsonmerge
//!
//! Merge a directory tree of JSON files into a single JSON document.
//!
//! Each file's location relative to the scan root becomes its key path in
//! the output: `config/db/primary.json` lands at
//! `{"config": {"db": {"primary": ...}}}`. A file holding one object (or an
//! array of exactly one element) is stored as that element; any other array
//! is stored as-is.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use jsonmerge::{MergeConfig, Progress, merge_to_file};
//!
//! let config = MergeConfig::for_root("fragments");
//! let report = merge_to_file(&config, Path::new("output.json"), &Progress::new()).unwrap();
//! println!("Files merged: {}", report.merged_files);
//! println!("Files skipped: {}", report.skipped_files.len());
//! ```

mod config;
mod decoded;
mod document;
mod error;
mod key_path;
pub mod output;
mod progress;
mod report;
pub mod traverse;

pub use config::{ConflictPolicy, MergeConfig};
pub use decoded::{DecodeError, Decoded, ValueKind};
pub use document::{MergedDocument, Overwrite};
pub use error::{MergeError, SkipKind, SkippedFile, WalkFailure};
pub use key_path::{KeyPath, KeyPathError};
pub use progress::Progress;
pub use report::MergeReport;

use std::path::Path;

use tracing::debug;

/// Merge every data file under `config.root` into a new document.
///
/// # Errors
///
/// Returns [`MergeError::Conflict`] if `config.on_conflict` is
/// [`ConflictPolicy::Error`] and two key paths collide. Unreadable or
/// malformed files and walk errors do not fail the call; they are listed in
/// the returned [`MergeReport`].
pub fn merge_dir(config: &MergeConfig) -> Result<(MergedDocument, MergeReport), MergeError> {
    merge_dir_with_progress(config, &Progress::new())
}

/// Like [`merge_dir`], publishing counters to `progress` after every file.
///
/// # Errors
///
/// See [`merge_dir`].
pub fn merge_dir_with_progress(
    config: &MergeConfig,
    progress: &Progress,
) -> Result<(MergedDocument, MergeReport), MergeError> {
    let mut document = MergedDocument::new();
    let mut report = MergeReport::default();

    let traversal = traverse::traverse(config, |key_path, decoded, file| {
        if let Some(overwrite) = document.insert(&key_path, decoded, config.on_conflict)? {
            report.overwrites.push(overwrite);
        }
        report.merged_files += 1;
        progress.record(&document);
        debug!(file = %file.display(), key_path = %key_path, "merged");
        Ok(())
    })?;

    report.skipped_files = traversal.skipped;
    report.walk_error = traversal.walk_error;
    Ok((document, report))
}

/// Merge `config.root` and write the document to `output`.
///
/// `output` is never merged into itself, even when it sits under the scan
/// root. The document is written even when the walk stopped early; check
/// [`MergeReport::is_complete`].
///
/// # Errors
///
/// Returns [`MergeError::Output`] or [`MergeError::Serialize`] if the output
/// cannot be written, and [`MergeError::Conflict`] as for [`merge_dir`].
pub fn merge_to_file(
    config: &MergeConfig,
    output: &Path,
    progress: &Progress,
) -> Result<MergeReport, MergeError> {
    let mut config = config.clone();
    config.skip_paths.push(output.to_path_buf());

    let (document, report) = merge_dir_with_progress(&config, progress)?;
    document.write_file(output)?;
    Ok(report)
}
