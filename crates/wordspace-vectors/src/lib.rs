//! Vector algebra and similarity measures for distributional word spaces.
//!
//! This crate provides the numeric building blocks shared by the sparse and
//! dense word-space back-ends:
//!
//! - **Dense algebra** ([`dense`]): element-wise operations over `&[f32]`
//!   slices, shape-checked.
//! - **Sparse algebra** ([`sparse`]): operations over string-keyed sparse
//!   vectors stored as parallel sorted arrays; missing features read as zero.
//! - **Similarity measures** ([`similarity`]): cosine and the Dice-style
//!   Kolb measure, each with a dense and a sparse entry point.
//!
//! Higher-level concerns (stores, composition, search) live in the
//! `wordspace` crate; this crate deliberately has no I/O and no knowledge of
//! where vectors come from.
//!
//! # Example
//!
//! ```rust
//! use wordspace_vectors::{dense, similarity};
//!
//! let u = vec![1.0, 0.0, 2.0];
//! let v = vec![1.0, 1.0, 0.0];
//! let sum = dense::add(&u, &v)?;
//! assert_eq!(sum, vec![2.0, 1.0, 2.0]);
//!
//! let sim = similarity::cosine(&u, &v)?;
//! assert!(sim > 0.0 && sim < 1.0);
//! # Ok::<(), wordspace_vectors::VectorError>(())
//! ```

/// Dense vector algebra over `&[f32]` slices.
pub mod dense;

/// Error types for vector algebra.
pub mod error;

/// Cosine and Kolb similarity measures.
pub mod similarity;

/// String-keyed sparse vectors and their algebra.
pub mod sparse;

pub use error::VectorError;
pub use similarity::Measure;
pub use sparse::SparseVector;
