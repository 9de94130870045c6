//! Error types for descriptor loading.
//!
//! Conversion of an already-built [`Schema`](crate::Schema) cannot fail:
//! every kind has a type and format table entry. Failures happen only when a
//! descriptor is read from JSON.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // Descriptor errors (exit code 2)
    #[error("unsupported kind \"{kind}\" at {path}")]
    UnsupportedKind { path: String, kind: String },

    #[error("invalid descriptor at {path}: {message}")]
    InvalidDescriptor { path: String, message: String },

    #[error("invalid date default \"{value}\" at {path}: {source}")]
    InvalidDate {
        path: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl DescriptorError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DescriptorError::FileNotFound { .. } | DescriptorError::ReadError { .. } => 3,
            _ => 2,
        }
    }

    /// JSON pointer of the offending node, for descriptor errors.
    pub fn pointer(&self) -> Option<&str> {
        match self {
            DescriptorError::UnsupportedKind { path, .. }
            | DescriptorError::InvalidDescriptor { path, .. }
            | DescriptorError::InvalidDate { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }
}
