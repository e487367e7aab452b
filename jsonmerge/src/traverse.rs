//! Filesystem traversal.
//!
//! Walks the scan root, decodes every recognized data file and hands each
//! `(key path, decoded value)` pair to a sink. Failure policy:
//! - A file that cannot be read, decoded or keyed is skipped with a
//!   diagnostic; the walk continues.
//! - A directory traversal error stops the walk; pairs already delivered
//!   stay delivered.

use std::io::Read;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::MergeConfig;
use crate::decoded::{DecodeError, Decoded};
use crate::error::{MergeError, SkipKind, SkippedFile, WalkFailure};
use crate::key_path::KeyPath;

/// Outcome of a walk, apart from what was delivered to the sink.
#[derive(Debug, Default)]
pub struct Traversal {
    /// Files left out, in walk order.
    pub skipped: Vec<SkippedFile>,
    /// The error that stopped the walk early, if any.
    pub walk_error: Option<WalkFailure>,
}

/// Check if a path relative to the root matches any of the exclude patterns
fn matches_exclude(relative: &Path, exclude_patterns: &[Pattern]) -> bool {
    let path_str = relative.to_string_lossy();
    exclude_patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || relative
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    })
}

fn compile_excludes(patterns: &[String], skipped: &mut Vec<SkippedFile>) -> Vec<Pattern> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for pat_str in patterns {
        match Pattern::new(pat_str) {
            Ok(pat) => compiled.push(pat),
            Err(e) => skipped.push(SkippedFile::new(
                pat_str,
                SkipKind::InvalidExcludePattern,
                format!("Invalid exclude glob pattern '{pat_str}': {e}"),
            )),
        }
    }
    compiled
}

/// Walk `config.root` and deliver every decodable data file to `sink`.
///
/// Entries are visited in file-name order within each directory. The sink
/// receives the key path, the decoded content and the file's path.
///
/// # Errors
///
/// Only errors returned by `sink` abort the traversal; they are propagated
/// unchanged. Skipped files and walk errors are reported in the returned
/// [`Traversal`].
pub fn traverse<F>(config: &MergeConfig, mut sink: F) -> Result<Traversal, MergeError>
where
    F: FnMut(KeyPath, Decoded, &Path) -> Result<(), MergeError>,
{
    let mut traversal = Traversal::default();
    let exclude_patterns = compile_excludes(&config.exclude, &mut traversal.skipped);
    let skip_paths: Vec<PathBuf> = config
        .skip_paths
        .iter()
        .filter_map(|p| p.canonicalize().ok())
        .collect();
    let suffix = config.file_suffix();

    for entry_result in WalkDir::new(&config.root)
        .follow_links(config.follow_links)
        .max_depth(config.max_depth)
        .sort_by_file_name()
    {
        let entry = match entry_result {
            Ok(e) => e,
            Err(walk_err) => {
                let path = walk_err
                    .path()
                    .map_or_else(|| config.root.clone(), Path::to_path_buf);
                let failure = WalkFailure {
                    path,
                    message: walk_err.to_string(),
                };
                debug!("Error: {}", failure.format_human_readable());
                traversal.walk_error = Some(failure);
                break;
            }
        };

        let file_path = entry.path();
        if entry.file_type().is_dir() || !file_path.is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(&suffix) {
            continue;
        }

        let relative = file_path.strip_prefix(&config.root).unwrap_or(file_path);
        if matches_exclude(relative, &exclude_patterns) {
            continue;
        }
        if !skip_paths.is_empty()
            && file_path
                .canonicalize()
                .is_ok_and(|canonical| skip_paths.contains(&canonical))
        {
            continue;
        }

        match load_file(&config.root, file_path, &suffix, config.max_file_size) {
            Ok((key_path, decoded)) => sink(key_path, decoded, file_path)?,
            Err(skipped) => {
                debug!(
                    "Error: processing JSON file {}: {}",
                    skipped.file.display(),
                    skipped.message
                );
                traversal.skipped.push(skipped);
            }
        }
    }

    Ok(traversal)
}

/// Derive the key path of one file and decode its content.
fn load_file(
    root: &Path,
    file_path: &Path,
    suffix: &str,
    max_file_size: u64,
) -> Result<(KeyPath, Decoded), SkippedFile> {
    let key_path = KeyPath::from_relative(root, file_path, suffix).map_err(|e| {
        SkippedFile::new(
            file_path,
            SkipKind::InvalidKeyPath,
            format!("Cannot derive key path: {e}"),
        )
    })?;

    let content = read_file_bounded(file_path, max_file_size)?;
    let decoded = Decoded::parse(&content).map_err(|e| {
        let kind = match e {
            DecodeError::Parse(_) => SkipKind::JsonParseError,
            DecodeError::UnknownStructure(_) => SkipKind::UnknownStructure,
        };
        SkippedFile::new(file_path, kind, e.to_string())
    })?;

    Ok((key_path, decoded))
}

/// Read a file using a bounded streaming read, enforcing `max_file_size`.
///
/// Uses `Read::take` so the size check and the read are the same operation.
fn read_file_bounded(path: &Path, max_file_size: u64) -> Result<String, SkippedFile> {
    let file = std::fs::File::open(path).map_err(|e| {
        SkippedFile::new(path, SkipKind::IoError, format!("Failed to open file: {e}"))
    })?;

    // Read at most max_file_size + 1 bytes to detect oversized files
    let mut buffer = Vec::new();
    file.take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(|e| {
            SkippedFile::new(path, SkipKind::IoError, format!("Failed to read file: {e}"))
        })?;

    if buffer.len() as u64 > max_file_size {
        return Err(SkippedFile::new(
            path,
            SkipKind::FileTooLarge,
            format!("File exceeds maximum size of {max_file_size} bytes"),
        ));
    }

    String::from_utf8(buffer).map_err(|_| {
        SkippedFile::new(path, SkipKind::InvalidEncoding, "File is not valid UTF-8")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn collect(config: &MergeConfig) -> (Vec<String>, Traversal) {
        let mut keys = Vec::new();
        let traversal = traverse(config, |key_path, _, _| {
            keys.push(key_path.to_string());
            Ok(())
        })
        .unwrap();
        (keys, traversal)
    }

    #[test]
    fn test_only_recognized_extension_visited() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.json", "{}");
        write(tmp.path(), "b.txt", "{}");
        write(tmp.path(), "c.json.bak", "{}");
        write(tmp.path(), "sub/d.JSON", "{}");

        let (keys, traversal) = collect(&MergeConfig::for_root(tmp.path()));
        assert_eq!(keys, ["a"]);
        assert!(traversal.skipped.is_empty());
    }

    #[test]
    fn test_sorted_walk_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b/x.json", "{}");
        write(tmp.path(), "a.json", "{}");
        write(tmp.path(), "b/a.json", "[]");

        let (keys, _) = collect(&MergeConfig::for_root(tmp.path()));
        assert_eq!(keys, ["a", "b/a", "b/x"]);
    }

    #[test]
    fn test_bad_files_skipped_and_walk_continues() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a_broken.json", "{\"key\": ");
        write(tmp.path(), "b_scalar.json", "42");
        write(tmp.path(), "c_good.json", "{\"key\": \"value\"}");
        fs::write(tmp.path().join("d_binary.json"), [0xff, 0xfe, 0x00]).unwrap();

        let (keys, traversal) = collect(&MergeConfig::for_root(tmp.path()));
        assert_eq!(keys, ["c_good"]);

        let kinds: Vec<SkipKind> = traversal.skipped.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                SkipKind::JsonParseError,
                SkipKind::UnknownStructure,
                SkipKind::InvalidEncoding
            ]
        );
        assert!(traversal.walk_error.is_none());
    }

    #[test]
    fn test_bare_extension_file_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), ".json", "{}");

        let (keys, traversal) = collect(&MergeConfig::for_root(tmp.path()));
        assert!(keys.is_empty());
        assert_eq!(traversal.skipped.len(), 1);
        assert_eq!(traversal.skipped[0].kind, SkipKind::InvalidKeyPath);
    }

    #[test]
    fn test_max_file_size() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "big.json", &format!("[\"{}\"]", "a".repeat(100)));
        write(tmp.path(), "small.json", "[]");

        let mut config = MergeConfig::for_root(tmp.path());
        config.max_file_size = 50;
        let (keys, traversal) = collect(&config);

        assert_eq!(keys, ["small"]);
        assert_eq!(traversal.skipped[0].kind, SkipKind::FileTooLarge);
    }

    #[test]
    fn test_exclude_patterns() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "keep/a.json", "{}");
        write(tmp.path(), "drafts/b.json", "{}");
        write(tmp.path(), "keep/c.draft.json", "{}");

        let mut config = MergeConfig::for_root(tmp.path());
        config.exclude = vec!["drafts/*".to_owned(), "*.draft.json".to_owned(), "[".to_owned()];
        let (keys, traversal) = collect(&config);

        assert_eq!(keys, ["keep/a"]);
        assert_eq!(traversal.skipped.len(), 1);
        assert_eq!(traversal.skipped[0].kind, SkipKind::InvalidExcludePattern);
    }

    #[test]
    fn test_skip_paths() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "data.json", "{}");
        write(tmp.path(), "output.json", "{}");

        let mut config = MergeConfig::for_root(tmp.path());
        config.skip_paths = vec![tmp.path().join("output.json")];
        let (keys, _) = collect(&config);

        assert_eq!(keys, ["data"]);
    }

    #[test]
    fn test_missing_root_is_walk_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does_not_exist");

        let (keys, traversal) = collect(&MergeConfig::for_root(&missing));
        assert!(keys.is_empty());
        let failure = traversal.walk_error.unwrap();
        assert_eq!(failure.path, missing);
    }

    #[test]
    fn test_sink_error_aborts() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.json", "{}");
        write(tmp.path(), "b.json", "{}");

        let mut seen = 0;
        let result = traverse(&MergeConfig::for_root(tmp.path()), |key_path, _, _| {
            seen += 1;
            Err(MergeError::Conflict {
                key_path: key_path.to_string(),
                at: key_path.to_string(),
                existing: "object".to_owned(),
            })
        });

        assert!(result.is_err());
        assert_eq!(seen, 1);
    }
}
