//! Error types for vector algebra.

use std::fmt;

/// Errors that can occur during vector operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorError {
    /// Dense vectors of different lengths were combined.
    DimensionMismatch {
        left: usize,
        right: usize,
    },
    /// An operation over a list of vectors received no vectors.
    Empty,
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorError::DimensionMismatch { left, right } => {
                write!(f, "Dimension mismatch: left has {} dimensions, right has {}", left, right)
            }
            VectorError::Empty => write!(f, "No vectors supplied"),
        }
    }
}

impl std::error::Error for VectorError {}
