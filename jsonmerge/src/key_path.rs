//! Key paths: where a file's content lands in the merged document.

use std::fmt;
use std::path::{Component, Path};

use thiserror::Error;

/// Why a key path could not be derived from a file path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyPathError {
    #[error("path is not under the scan root")]
    OutsideRoot,

    #[error("path component {0:?} is not valid UTF-8")]
    NonUtf8(String),

    #[error("key path has an empty segment")]
    EmptySegment,

    #[error("key path has no segments")]
    Empty,
}

/// Ordered, non-empty list of non-empty segments, root-most first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Build a key path from explicit segments.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is empty or any segment is empty.
    pub fn new<I, S>(segments: I) -> Result<Self, KeyPathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(KeyPathError::Empty);
        }
        if segments.iter().any(String::is_empty) {
            return Err(KeyPathError::EmptySegment);
        }
        Ok(Self { segments })
    }

    /// Derive the key path of `file` relative to `root`.
    ///
    /// `suffix` (e.g. `.json`) is stripped from the last segment; every other
    /// path component becomes one segment.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` is not under `root`, a component is not
    /// UTF-8, or a resulting segment is empty (a file named just `.json`).
    pub fn from_relative(root: &Path, file: &Path, suffix: &str) -> Result<Self, KeyPathError> {
        let relative = file
            .strip_prefix(root)
            .map_err(|_| KeyPathError::OutsideRoot)?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name
                        .to_str()
                        .ok_or_else(|| KeyPathError::NonUtf8(name.to_string_lossy().into_owned()))?;
                    segments.push(name.to_owned());
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(KeyPathError::OutsideRoot);
                }
            }
        }

        if let Some(last) = segments.last_mut()
            && let Some(stem_len) = last.strip_suffix(suffix).map(str::len)
        {
            last.truncate(stem_len);
        }

        Self::new(segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first `len` segments joined with `/`.
    #[must_use]
    pub fn prefix(&self, len: usize) -> String {
        self.segments[..len.min(self.segments.len())].join("/")
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn derive(root: &str, file: &str) -> Result<KeyPath, KeyPathError> {
        KeyPath::from_relative(Path::new(root), Path::new(file), ".json")
    }

    #[test]
    fn test_file_directly_under_root() {
        let key_path = derive("/data", "/data/settings.json").unwrap();
        assert_eq!(key_path.segments(), ["settings"]);
    }

    #[test]
    fn test_nested_file() {
        let key_path = derive("/data", "/data/level1/level2/level3/object.json").unwrap();
        assert_eq!(
            key_path.segments(),
            ["level1", "level2", "level3", "object"]
        );
        assert_eq!(key_path.to_string(), "level1/level2/level3/object");
    }

    #[test]
    fn test_current_dir_root() {
        let root = PathBuf::from("./");
        let file = root.join("test").join("object.json");
        let key_path = KeyPath::from_relative(&root, &file, ".json").unwrap();
        assert_eq!(key_path.segments(), ["test", "object"]);
    }

    #[test]
    fn test_only_trailing_extension_stripped() {
        let key_path = derive("/data", "/data/a.json.d/b.json.json").unwrap();
        assert_eq!(key_path.segments(), ["a.json.d", "b.json"]);
    }

    #[test]
    fn test_bare_extension_name_rejected() {
        assert_eq!(derive("/data", "/data/.json"), Err(KeyPathError::EmptySegment));
    }

    #[test]
    fn test_root_itself_rejected() {
        assert_eq!(derive("/data/a.json", "/data/a.json"), Err(KeyPathError::Empty));
    }

    #[test]
    fn test_outside_root_rejected() {
        assert_eq!(derive("/data", "/other/a.json"), Err(KeyPathError::OutsideRoot));
    }

    #[test]
    fn test_prefix() {
        let key_path = KeyPath::new(["a", "b", "c"]).unwrap();
        assert_eq!(key_path.prefix(0), "");
        assert_eq!(key_path.prefix(2), "a/b");
        assert_eq!(key_path.prefix(10), "a/b/c");
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(KeyPath::new(Vec::<String>::new()), Err(KeyPathError::Empty));
        assert_eq!(KeyPath::new(["a", ""]), Err(KeyPathError::EmptySegment));
    }
}
