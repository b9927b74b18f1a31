//! Manifest loading and saving.
//!
//! A manifest is a JSON array of objects. Each object is kept as an
//! order-preserving map so unknown fields round-trip verbatim; only the
//! `image` and `topic` fields get typed accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Field holding the image reference.
pub const IMAGE_FIELD: &str = "image";
/// Field holding the human-readable label used for naming.
pub const TOPIC_FIELD: &str = "topic";

/// Structural failures. Any of these stops the run before a record is processed
/// (or, for output errors, before the result is persisted).
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("input manifest not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read manifest {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("manifest {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("manifest must be a JSON array, found {found}")]
    NotArray { found: &'static str },
    #[error("manifest entry {index} must be a JSON object, found {found}")]
    EntryNotObject { index: usize, found: &'static str },
    #[error("failed to prepare output directory {path}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write manifest {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize manifest")]
    Serialize(#[source] serde_json::Error),
}

/// The `image` field of a record, as far as eligibility is concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageRef<'a> {
    Missing,
    NotText(&'a Value),
    Text(&'a str),
}

/// One manifest entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn image(&self) -> ImageRef<'_> {
        match self.fields.get(IMAGE_FIELD) {
            None => ImageRef::Missing,
            Some(Value::String(s)) => ImageRef::Text(s),
            Some(other) => ImageRef::NotText(other),
        }
    }

    /// Replaces the `image` value, keeping its position among the fields.
    pub fn set_image(&mut self, value: impl Into<String>) {
        self.fields
            .insert(IMAGE_FIELD.to_string(), Value::String(value.into()));
    }

    /// The `topic` label, if present and a string.
    pub fn topic(&self) -> Option<&str> {
        self.fields.get(TOPIC_FIELD).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Validates a parsed JSON document as a manifest.
pub fn from_value(doc: Value) -> Result<Vec<Record>, ManifestError> {
    let items = match doc {
        Value::Array(items) => items,
        other => {
            return Err(ManifestError::NotArray {
                found: kind_of(&other),
            })
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(Record::new(fields)),
            other => Err(ManifestError::EntryNotObject {
                index,
                found: kind_of(&other),
            }),
        })
        .collect()
}

/// Reads and validates the manifest at `path`.
pub fn load(path: &Path) -> Result<Vec<Record>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }
    let data = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_json::from_str(&data).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    from_value(doc)
}

/// Serializes records as a two-space indented JSON array.
pub fn to_string_pretty(records: &[Record]) -> Result<String, ManifestError> {
    serde_json::to_string_pretty(records).map_err(ManifestError::Serialize)
}

/// Writes `records` to `path`, replacing any existing file.
pub fn save(path: &Path, records: &[Record]) -> Result<(), ManifestError> {
    let data = to_string_pretty(records)?;
    fs::write(path, data).map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })
}
