//! Flat-file JSON dataset storage.
//!
//! Datasets are JSON arrays of loosely-typed objects. They are read whole and
//! written back pretty-printed with a trailing newline so diffs stay readable.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset {path} does not contain a JSON array")]
    NotAnArray { path: String },

    #[error("failed to serialize dataset: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write dataset {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reads a JSON array from `path`.
///
/// Individual elements are returned as-is; sparse or malformed entries are
/// the pipeline's concern, not the loader's.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, is not valid JSON, or
/// its top-level value is not an array.
pub fn load_dataset(path: &Path) -> Result<Vec<Value>, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let parsed: Value = serde_json::from_str(&content).map_err(|e| DatasetError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;

    match parsed {
        Value::Array(items) => Ok(items),
        _ => Err(DatasetError::NotAnArray {
            path: path.display().to_string(),
        }),
    }
}

/// Writes `data` to `path` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns [`DatasetError`] if serialization or the write fails.
pub fn save_dataset<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), DatasetError> {
    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');
    std::fs::write(path, json).map_err(|e| DatasetError::Write {
        path: path.display().to_string(),
        source: e,
    })
}
