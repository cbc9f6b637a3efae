//! Document encoding for trace files and reports.
//!
//! Everything the toolchain persists is pretty-printed JSON. Errors always
//! name the file involved so batch callers can report it and move on.

use oracle_core::TraceRecord;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Failure reading or writing a persisted document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceFileError {
    /// File could not be read
    #[error("Cannot read {path}: {reason}")]
    Read {
        /// File read
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// File is not a well-formed document of the expected shape
    #[error("Malformed document {path}: {reason}")]
    Malformed {
        /// File parsed
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// File could not be written
    #[error("Cannot write {path}: {reason}")]
    Write {
        /// File written
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Value could not be serialized
    #[error("Cannot encode document: {0}")]
    Encode(String),
}

impl TraceFileError {
    /// Path of the file involved, if any
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Read { path, .. } | Self::Malformed { path, .. } | Self::Write { path, .. } => {
                Some(path)
            }
            Self::Encode(_) => None,
        }
    }
}

/// Trait for documents persisted as JSON
pub trait JsonDocument: Serialize + DeserializeOwned {
    /// Encode as pretty-printed JSON
    fn to_pretty_json(&self) -> Result<String, TraceFileError> {
        serde_json::to_string_pretty(self).map_err(|e| TraceFileError::Encode(e.to_string()))
    }

    /// Decode from JSON text; `origin` names the source in errors
    fn from_json_str(json: &str, origin: &str) -> Result<Self, TraceFileError> {
        serde_json::from_str(json).map_err(|e| TraceFileError::Malformed {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read and decode a file
    fn read_from(path: &Path) -> Result<Self, TraceFileError> {
        let json = read_text(path)?;
        Self::from_json_str(&json, &path.display().to_string())
    }

    /// Encode and write a file, creating its directory if needed
    fn write_to(&self, path: &Path) -> Result<(), TraceFileError> {
        write_text(path, &self.to_pretty_json()?)
    }
}

impl<T: Serialize + DeserializeOwned> JsonDocument for T {}

/// Read a trace file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a list of records
pub fn read_trace(path: &Path) -> Result<Vec<TraceRecord>, TraceFileError> {
    Vec::<TraceRecord>::read_from(path)
}

/// Write a trace file
///
/// # Errors
///
/// Returns error if the file cannot be written
pub fn write_trace(path: &Path, records: &[TraceRecord]) -> Result<(), TraceFileError> {
    let json =
        serde_json::to_string_pretty(records).map_err(|e| TraceFileError::Encode(e.to_string()))?;
    write_text(path, &json)
}

pub(crate) fn read_text(path: &Path) -> Result<String, TraceFileError> {
    std::fs::read_to_string(path).map_err(|e| TraceFileError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn write_text(path: &Path, text: &str) -> Result<(), TraceFileError> {
    let to_error = |e: std::io::Error| TraceFileError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_error)?;
    }
    std::fs::write(path, text).map_err(to_error)
}
