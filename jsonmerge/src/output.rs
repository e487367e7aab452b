//! Plain-text summary of a merge report.
//!
//! Color/terminal formatting is left to the CLI layer. A walk error is not
//! part of the summary; callers report it as the run's failure.

use std::io::Write;

use crate::report::MergeReport;

/// Write a human-readable summary of `report`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &MergeReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer, "  Files attempted: {}", report.files_attempted())?;
    writeln!(writer, "  Files merged:   {}", report.merged_files)?;
    writeln!(writer, "  Files skipped:  {}", report.skipped_files.len())?;
    writeln!(writer, "  Overwrites:     {}", report.overwrites.len())?;

    if !report.skipped_files.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "  SKIPPED FILES")?;
        for skipped in &report.skipped_files {
            writeln!(writer, "    {}", skipped.format_human_readable())?;
        }
    }

    if !report.overwrites.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "  OVERWRITTEN VALUES")?;
        for overwrite in &report.overwrites {
            writeln!(writer, "    {}", overwrite.format_human_readable())?;
        }
    }

    Ok(())
}
