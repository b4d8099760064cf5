//! Error types for word-space operations.
//!
//! Absent words are not errors: lookups return `Option::None` (and
//! `semantic_similarity` keeps its `-2.0` compatibility sentinel). The
//! variants here cover everything else: wrong store kind, corrupt inputs,
//! shape mismatches, and I/O failures.

use std::fmt;

use wordspace_vectors::VectorError;

use crate::config::SpaceKind;

/// Result alias for word-space operations.
pub type SpaceResult<T> = Result<T, SpaceError>;

/// Errors that can occur while opening or querying a word space.
#[derive(Debug)]
pub enum SpaceError {
    /// An operation was called on a store that cannot serve it: a
    /// neighbour query on a COL space, or a feature-key query on a dense
    /// store.
    WrongSpaceType {
        operation: &'static str,
        kind: SpaceKind,
    },

    /// The config file cannot be parsed or holds a malformed value.
    /// Fatal at open.
    CorruptConfig {
        message: String,
    },

    /// A store image is unreadable: bad magic, version mismatch, checksum
    /// failure, or a truncated record.
    CorruptIndex {
        message: String,
    },

    /// Dense vectors of mismatched length were combined.
    Shape(VectorError),

    /// Underlying storage failure. Fatal for the current operation, not for
    /// the handle.
    Io(std::io::Error),

    /// A query string could not be interpreted (e.g. a multi-token query
    /// against the single-token lookup).
    Parse(String),
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceError::WrongSpaceType { operation, kind } => {
                write!(f, "Operation '{}' is not supported on this word space (kind {})", operation, kind)
            }
            SpaceError::CorruptConfig { message } => {
                write!(f, "Corrupt config: {}", message)
            }
            SpaceError::CorruptIndex { message } => {
                write!(f, "Corrupt store: {}", message)
            }
            SpaceError::Shape(e) => write!(f, "Shape error: {}", e),
            SpaceError::Io(e) => write!(f, "I/O error: {}", e),
            SpaceError::Parse(message) => write!(f, "Parse error: {}", message),
        }
    }
}

impl std::error::Error for SpaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpaceError::Io(e) => Some(e),
            SpaceError::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SpaceError {
    fn from(e: std::io::Error) -> Self {
        SpaceError::Io(e)
    }
}

impl From<VectorError> for SpaceError {
    fn from(e: VectorError) -> Self {
        SpaceError::Shape(e)
    }
}
