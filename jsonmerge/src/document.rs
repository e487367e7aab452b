//! The merged document: one nested mapping fed by every data file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ConflictPolicy;
use crate::decoded::{Decoded, ValueKind};
use crate::error::MergeError;
use crate::key_path::KeyPath;

/// A value that was discarded because a later insertion needed its slot.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct Overwrite {
    /// Key path of the insertion that caused the overwrite.
    pub key_path: String,
    /// Key path of the slot whose value was discarded.
    pub discarded_at: String,
    /// JSON type of the discarded value.
    pub discarded: ValueKind,
}

impl Overwrite {
    /// Format the overwrite for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!(
            "{}: replaced {} at `{}`",
            self.key_path, self.discarded, self.discarded_at
        )
    }
}

/// Mapping from string keys to nested mappings, arrays and scalars.
///
/// Files whose key paths share a prefix share the mapping nodes along that
/// prefix, and a nested file extends a record merged at its parent path.
/// When one key path is a strict prefix of another and the slot cannot be
/// shared (a non-mapping value, or a leaf landing on a merged subtree), the
/// later insertion wins and the earlier value is dropped (see
/// [`ConflictPolicy`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedDocument {
    root: Map<String, Value>,
}

impl MergedDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Look up the value stored at `segments`.
    #[must_use]
    pub fn get(&self, segments: &[&str]) -> Option<&Value> {
        let (last, parents) = segments.split_last()?;
        let mut node = &self.root;
        for segment in parents {
            node = node.get(*segment)?.as_object()?;
        }
        node.get(*last)
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Insert a decoded file at `key_path`.
    ///
    /// Missing mappings along the path are created. An intermediate slot that
    /// holds a non-mapping value is replaced by an empty mapping, and an
    /// occupied final slot is replaced by the new value; in both cases the
    /// discarded value is returned as an [`Overwrite`].
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Conflict`] when `policy` is
    /// [`ConflictPolicy::Error`] and the insertion would discard a value.
    /// The document is left untouched in that case.
    pub fn insert(
        &mut self,
        key_path: &KeyPath,
        decoded: Decoded,
        policy: ConflictPolicy,
    ) -> Result<Option<Overwrite>, MergeError> {
        let Some((last, parents)) = key_path.segments().split_last() else {
            return Ok(None);
        };

        let overwrite = self.find_collision(key_path);
        if let Some(collision) = &overwrite {
            if policy == ConflictPolicy::Error {
                return Err(MergeError::Conflict {
                    key_path: collision.key_path.clone(),
                    at: collision.discarded_at.clone(),
                    existing: collision.discarded.to_string(),
                });
            }
            debug!(
                key_path = %collision.key_path,
                at = %collision.discarded_at,
                discarded = %collision.discarded,
                "overwriting previously merged value"
            );
        }

        let mut node = &mut self.root;
        for segment in parents {
            let slot = node
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            node = match slot {
                Value::Object(map) => map,
                other => {
                    *other = Value::Object(Map::new());
                    match other {
                        Value::Object(map) => map,
                        _ => return Ok(overwrite),
                    }
                }
            };
        }
        node.insert(last.clone(), decoded.into_value());

        Ok(overwrite)
    }

    /// The value an insertion at `key_path` would discard, if any.
    fn find_collision(&self, key_path: &KeyPath) -> Option<Overwrite> {
        let (last, parents) = key_path.segments().split_last()?;
        let collision = |depth: usize, existing: &Value| Overwrite {
            key_path: key_path.to_string(),
            discarded_at: key_path.prefix(depth),
            discarded: ValueKind::of(existing),
        };

        let mut node = &self.root;
        for (index, segment) in parents.iter().enumerate() {
            match node.get(segment)? {
                Value::Object(map) => node = map,
                other => return Some(collision(index + 1, other)),
            }
        }
        node.get(last)
            .map(|existing| collision(parents.len() + 1, existing))
    }

    /// Serialize the document as compact JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Serialize`] if encoding or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), MergeError> {
        serde_json::to_writer(&mut writer, &self.root)?;
        writer.write_all(b"\n").map_err(serde_json::Error::io)?;
        Ok(())
    }

    /// Write the document to `path`.
    ///
    /// Content goes to a sibling temporary file first and is renamed into
    /// place once complete, so `path` never holds a partial document.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Output`] if the file cannot be created, written
    /// or renamed, and [`MergeError::Serialize`] if encoding fails.
    pub fn write_file(&self, path: &Path) -> Result<(), MergeError> {
        let output_err = |source: std::io::Error| MergeError::Output {
            path: path.to_owned(),
            source,
        };

        let staging = staging_path(path);
        let file = File::create(&staging).map_err(output_err)?;
        let mut writer = BufWriter::new(file);

        let flushed = self
            .write_to(&mut writer)
            .and_then(|()| writer.flush().map_err(output_err));
        drop(writer);

        let written = flushed.and_then(|()| fs::rename(&staging, path).map_err(output_err));
        if written.is_err() {
            let _ = fs::remove_file(&staging);
        }
        written
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
