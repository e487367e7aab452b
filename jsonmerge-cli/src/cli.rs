//! Argument parsing and the merge driver.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use jsonmerge::{MergeConfig, MergeReport, Progress, merge_to_file, output};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::logging;

/// How often the progress task logs the document size.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Recursively scans the specified directory for JSON files, merging their
/// contents into a single JSON file
#[derive(Debug, Parser)]
#[command(name = "jsonmerge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to search for JSON files
    #[arg(short = 'd', long = "dir", default_value = "./")]
    pub dir: PathBuf,

    /// Path and filename for the output JSON file
    #[arg(short = 'o', long = "output-file-path", default_value = "output.json")]
    pub output_file_path: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse arguments, set up logging and run the merge.
///
/// # Errors
///
/// Returns an error if the output cannot be written or the walk stopped early.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    execute(&cli, PROGRESS_INTERVAL).await?;
    Ok(())
}

/// Merge `cli.dir` into `cli.output_file_path` on a blocking worker, logging
/// progress every `progress_interval` until the worker finishes.
///
/// # Errors
///
/// Returns an error if the worker panics, the output cannot be written, or a
/// directory traversal error stopped the walk. In the last case the partial
/// document has already been written.
pub async fn execute(cli: &Cli, progress_interval: Duration) -> Result<MergeReport> {
    let config = MergeConfig::for_root(&cli.dir);
    let output_path = cli.output_file_path.clone();
    let progress = Progress::new();

    let reporter = spawn_progress_reporter(progress.clone(), progress_interval);
    let worker = {
        let output_path = output_path.clone();
        tokio::task::spawn_blocking(move || merge_to_file(&config, &output_path, &progress))
    };
    let joined = worker.await;
    reporter.abort();

    let report = joined
        .context("merge worker terminated unexpectedly")?
        .with_context(|| format!("merging {}", cli.dir.display()))?;

    if !report.skipped_files.is_empty() || !report.overwrites.is_empty() {
        warn!(
            skipped = report.skipped_files.len(),
            overwrites = report.overwrites.len(),
            "output is missing data from some input files"
        );
        output::write_human(&report, &mut std::io::stderr())?;
    }
    info!(
        merged = report.merged_files,
        skipped = report.skipped_files.len(),
        overwrites = report.overwrites.len(),
        "merge finished"
    );
    println!("JSON data written to `{}`", output_path.display());

    if let Some(failure) = &report.walk_error {
        bail!("{}", failure.format_human_readable());
    }
    Ok(report)
}

fn spawn_progress_reporter(progress: Progress, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            info!(
                top_level_keys = progress.top_level_keys(),
                merged_files = progress.merged_files(),
                "Current size of merged document: {} items",
                progress.top_level_keys()
            );
        }
    })
}
