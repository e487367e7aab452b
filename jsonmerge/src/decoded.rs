//! Decoded content of a single data file.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON type of a value, used in diagnostics.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// Why a file's content could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown JSON structure: top-level {0} is neither an object nor an array")]
    UnknownStructure(ValueKind),
}

/// The top-level shape of a data file.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A single object.
    Record(Map<String, Value>),
    /// An array of arbitrary values, order preserved.
    Sequence(Vec<Value>),
}

impl Decoded {
    /// Parse file content.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Parse`] for malformed JSON and
    /// [`DecodeError::UnknownStructure`] when the top level is a scalar or null.
    pub fn parse(content: &str) -> Result<Self, DecodeError> {
        Self::from_value(serde_json::from_str(content)?)
    }

    /// Classify an already parsed value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownStructure`] when `value` is neither an
    /// object nor an array.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => Ok(Self::Record(map)),
            Value::Array(items) => Ok(Self::Sequence(items)),
            other => Err(DecodeError::UnknownStructure(ValueKind::of(&other))),
        }
    }

    /// The value to store in the merged document.
    ///
    /// A sequence holding exactly one element collapses to that element, so a
    /// file with `[{"id": 1}]` merges the same way as one with `{"id": 1}`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Record(map) => Value::Object(map),
            Self::Sequence(mut items) if items.len() == 1 => items.pop().unwrap_or(Value::Null),
            Self::Sequence(items) => Value::Array(items),
        }
    }
}
