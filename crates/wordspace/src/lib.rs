//! Query engine for pre-computed distributional word-similarity databases.
//!
//! A *word space* is built offline from a corpus: per-word vectors, corpus
//! frequencies, and optionally precomputed nearest-neighbour lists. This
//! crate answers queries against such a space: frequency lookups, nearest
//! neighbours, pairwise and second-order similarity, vector retrieval,
//! phrase composition, analogy completion, graph-based approximate search,
//! short-text similarity, and clustering-graph export.
//!
//! # Back-ends
//!
//! Two interchangeable storage layouts sit behind the [`WordSpace`] handle:
//!
//! - **Sparse** ([`sparse`]): an on-disk inverted index; per-word records
//!   carry string feature keys with significance scores. Opened either
//!   memory-mapped or fully resident.
//! - **Dense** ([`dense`]): a row-major float matrix serialized as one
//!   image, with optional character n-gram vectors for out-of-vocabulary
//!   synthesis and optional neighbour matrices.
//!
//! The back-end is auto-detected at open time: directories are sparse
//! stores, files are dense images.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wordspace::prelude::*;
//!
//! let space = WordSpace::load(Path::new("de-general.denseMatrix"))?;
//! if let Some(neighbours) = space.similar_words("Haus")? {
//!     for (word, sim) in neighbours.iter().take(10) {
//!         println!("{}\t{}", word, sim);
//!     }
//! }
//! # Ok::<(), wordspace::SpaceError>(())
//! ```
//!
//! # Concurrency
//!
//! A handle is immutable after open and freely shareable across threads;
//! queries never mutate store data. The only destructive operations are
//! the documented in-place sparse-vector helpers, which operate on caller
//! copies.

/// Clustering and rank utilities over neighbour sets.
pub mod cluster;

/// The word-space config record and its `key=value` file format.
pub mod config;

/// Compositional operators, phrase similarity, and analogy solving.
pub mod compose;

/// The dense back-end: matrix store, subword table, single-image
/// serialization.
pub mod dense;

/// Error types for word-space operations.
pub mod error;

/// Export writers: frequency lists and CLUTO files.
pub mod export;

/// Character n-gram extraction.
pub mod ngram;

/// Exact and graph-based nearest-neighbour search.
pub mod search;

/// The unified word-space handle.
pub mod space;

/// The sparse back-end: inverted-index store and its writer.
pub mod sparse;

/// Alignment-weighted short-text similarity.
pub mod textsim;

pub use config::{Config, SpaceKind};
pub use error::{SpaceError, SpaceResult};
pub use space::{QueryVector, WordSpace};

// Re-exported so callers need not depend on the algebra crate directly.
pub use wordspace_vectors::{Measure, SparseVector, VectorError};

/// Separator between a feature word and its relation identifier inside a
/// feature key. A private-use codepoint, so it cannot collide with corpus
/// text.
pub const RELATION_SEPARATOR: char = '\u{F8FF}';

/// Common imports for working with word spaces.
pub mod prelude {
    pub use crate::cluster;
    pub use crate::compose::{self, Composition};
    pub use crate::export;
    pub use crate::search;
    pub use crate::textsim;
    pub use crate::{Config, Measure, QueryVector, SpaceError, SpaceKind, SparseVector, WordSpace};
}
