//! The unified word-space handle.
//!
//! [`WordSpace`] is a tagged variant over the two back-ends; every query
//! dispatches on it. The storage layout is auto-detected at open time: a
//! directory is a sparse store, a plain file is a dense image.
//!
//! A handle is immutable after open and shareable across threads without
//! synchronization; queries on distinct threads may run in parallel.

use std::path::Path;

use smallvec::SmallVec;
use wordspace_vectors::{Measure, SparseVector};

use crate::config::{Config, SpaceKind};
use crate::dense::DenseSpace;
use crate::error::{SpaceError, SpaceResult};
use crate::sparse::{SparseSpace, UNKNOWN_SIMILARITY};

/// Neighbour list of one entry: ids with similarities, zero-terminated
/// prefix of the stored matrix row. Small enough to live on the stack for
/// typical neighbour widths.
pub(crate) type NeighbourList = SmallVec<[(u32, f32); 64]>;

/// A word vector in the representation native to its back-end.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryVector {
    Dense(Vec<f32>),
    Sparse(SparseVector),
}

impl QueryVector {
    /// Similarity of two vectors of the same representation.
    ///
    /// Mixing representations is caller misuse and yields a parse error.
    pub fn similarity(&self, other: &QueryVector, measure: Measure) -> SpaceResult<f32> {
        match (self, other) {
            (QueryVector::Dense(u), QueryVector::Dense(v)) => Ok(measure.dense(u, v)?),
            (QueryVector::Sparse(a), QueryVector::Sparse(b)) => Ok(measure.sparse(a, b)),
            _ => Err(SpaceError::Parse(
                "cannot compare dense and sparse vector representations".to_string(),
            )),
        }
    }
}

/// Handle to an opened word space, sparse or dense.
pub enum WordSpace {
    Sparse(SparseSpace),
    Dense(DenseSpace),
}

impl WordSpace {
    /// Open a word space, auto-detecting the back-end from the on-disk
    /// layout: a directory holds a sparse store, a file a dense image.
    ///
    /// With `load_into_memory` a sparse store is mirrored into memory;
    /// a dense image is always fully loaded.
    pub fn open(path: &Path, load_into_memory: bool) -> SpaceResult<WordSpace> {
        if path.is_dir() {
            Ok(WordSpace::Sparse(SparseSpace::open(path, load_into_memory)?))
        } else {
            Ok(WordSpace::Dense(DenseSpace::open(path)?))
        }
    }

    /// Open a word space fully resident in memory.
    pub fn load(path: &Path) -> SpaceResult<WordSpace> {
        WordSpace::open(path, true)
    }

    /// The sparse back-end, if this is a sparse space.
    pub fn as_sparse(&self) -> Option<&SparseSpace> {
        match self {
            WordSpace::Sparse(s) => Some(s),
            WordSpace::Dense(_) => None,
        }
    }

    /// The dense back-end, if this is a dense space.
    pub fn as_dense(&self) -> Option<&DenseSpace> {
        match self {
            WordSpace::Sparse(_) => None,
            WordSpace::Dense(d) => Some(d),
        }
    }

    /// The store's config record.
    pub fn config(&self) -> &Config {
        match self {
            WordSpace::Sparse(s) => s.config(),
            WordSpace::Dense(d) => d.config(),
        }
    }

    /// Content kind: COL (vectors only) or SIM (vectors plus neighbours).
    pub fn kind(&self) -> SpaceKind {
        self.config().kind()
    }

    /// Measure the stored neighbour lists were built with.
    pub fn similarity_measure(&self) -> Measure {
        self.config().similarity_measure
    }

    /// Vocabulary size `V`.
    pub fn number_of_words(&self) -> usize {
        match self {
            WordSpace::Sparse(s) => s.len(),
            WordSpace::Dense(d) => d.len(),
        }
    }

    /// Feature dimensionality `D`.
    pub fn number_of_feature_words(&self) -> usize {
        match self {
            WordSpace::Sparse(s) => s.config().number_feature_words as usize,
            WordSpace::Dense(d) => d.dimension(),
        }
    }

    /// Stored neighbours per word (the neighbour matrix width).
    pub fn number_of_similar_words(&self) -> usize {
        self.config().number_of_similar_words as usize
    }

    /// Corpus size in tokens.
    pub fn token_count(&self) -> u64 {
        self.config().token_count
    }

    /// Minimum corpus frequency over the vocabulary.
    pub fn min_freq(&self) -> u64 {
        self.config().min_freq
    }

    /// Maximum corpus frequency over the vocabulary.
    pub fn max_freq(&self) -> u64 {
        self.config().max_freq
    }

    /// The stopword list the space was built with.
    pub fn stopwords(&self) -> &[String] {
        &self.config().stopwords
    }

    /// Whether the word is in the stopword list.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.config().is_stopword(word)
    }

    /// Whether all store data is resident in memory.
    pub fn is_resident(&self) -> bool {
        match self {
            WordSpace::Sparse(s) => s.is_resident(),
            WordSpace::Dense(_) => true,
        }
    }

    /// Dense document id of a word, if present.
    pub fn id_of(&self, word: &str) -> Option<usize> {
        match self {
            WordSpace::Sparse(s) => s.id_of(word),
            WordSpace::Dense(d) => d.id_of(word),
        }
    }

    /// Surface string of the entry at document id `id`.
    pub fn word_by_id(&self, id: usize) -> SpaceResult<Option<String>> {
        match self {
            WordSpace::Sparse(s) => s.word_by_id(id),
            WordSpace::Dense(d) => Ok(d.word_by_id(id).map(str::to_string)),
        }
    }

    /// Corpus frequency of a word; 0 when unknown.
    pub fn frequency(&self, word: &str) -> SpaceResult<u64> {
        match self {
            WordSpace::Sparse(s) => s.frequency(word),
            WordSpace::Dense(d) => Ok(d.frequency(word)),
        }
    }

    /// The word's vector as a sparse mapping.
    ///
    /// On the sparse back-end these are the stored feature keys; on the
    /// dense back-end the non-zero matrix row entries keyed by dimension
    /// index. Calling this twice returns equal mappings.
    pub fn word_vector(&self, word: &str) -> SpaceResult<Option<SparseVector>> {
        match self {
            WordSpace::Sparse(s) => s.word_vector(word),
            WordSpace::Dense(d) => {
                let Some(id) = d.id_of(word) else {
                    return Ok(None);
                };
                let row = d.word_vector(id).unwrap_or(&[]);
                Ok(Some(SparseVector::from_entries(
                    row.iter()
                        .enumerate()
                        .filter(|(_, v)| **v != 0.0)
                        .map(|(i, v)| (i.to_string(), *v)),
                )))
            }
        }
    }

    /// Dense embedding of a word, with OOV subword synthesis where the
    /// store carries n-grams. `None` on the sparse back-end.
    pub fn word_embedding(&self, word: &str) -> SpaceResult<Option<Vec<f32>>> {
        match self {
            WordSpace::Sparse(_) => Ok(None),
            WordSpace::Dense(d) => Ok(d.word_embedding(word)),
        }
    }

    /// The word's vector in the back-end's native representation.
    ///
    /// On dense stores this includes OOV subword synthesis.
    pub fn vector_of(&self, word: &str) -> SpaceResult<Option<QueryVector>> {
        match self {
            WordSpace::Sparse(s) => Ok(s.word_vector(word)?.map(QueryVector::Sparse)),
            WordSpace::Dense(d) => Ok(d.word_embedding(word).map(QueryVector::Dense)),
        }
    }

    /// The vector of the entry at document id `id`, in native
    /// representation.
    pub fn vector_of_id(&self, id: usize) -> SpaceResult<Option<QueryVector>> {
        match self {
            WordSpace::Sparse(s) => Ok(s
                .record_by_id(id)?
                .map(|r| QueryVector::Sparse(r.feature_vector()))),
            WordSpace::Dense(d) => Ok(d
                .word_vector(id)
                .map(|row| QueryVector::Dense(row.to_vec()))),
        }
    }

    /// Collocations of a word (sparse back-end only): feature keys with
    /// relation suffixes stripped and duplicate words summed, sorted by
    /// significance descending.
    pub fn collocations(&self, word: &str) -> SpaceResult<Option<Vec<(String, f32)>>> {
        match self {
            WordSpace::Sparse(s) => s.collocations(word),
            WordSpace::Dense(_) => Err(SpaceError::WrongSpaceType {
                operation: "collocations",
                kind: self.kind(),
            }),
        }
    }

    /// Stored nearest neighbours of a word, best first; `None` when the
    /// word is unknown. Rejects COL spaces.
    pub fn similar_words(&self, word: &str) -> SpaceResult<Option<Vec<(String, f32)>>> {
        match self {
            WordSpace::Sparse(s) => s.similar_words(word),
            WordSpace::Dense(d) => d.similar_words(word),
        }
    }

    /// First-order similarity of two words under `measure`; `-2.0` when
    /// either word is unknown.
    pub fn semantic_similarity(&self, w1: &str, w2: &str, measure: Measure) -> SpaceResult<f32> {
        match self {
            WordSpace::Sparse(s) => s.semantic_similarity(w1, w2, measure),
            WordSpace::Dense(d) => d.semantic_similarity(w1, w2, measure),
        }
    }

    /// Similarity of two words' stored neighbour lists under `measure`;
    /// `-2.0` when either word is unknown. Rejects COL spaces.
    pub fn second_order_similarity(&self, w1: &str, w2: &str, measure: Measure) -> SpaceResult<f32> {
        match self {
            WordSpace::Sparse(s) => s.second_order_similarity(w1, w2, measure),
            WordSpace::Dense(d) => d.second_order_similarity(w1, w2, measure),
        }
    }

    /// Stored neighbour ids with similarities of the entry at `id`,
    /// stopping at the first zero similarity. Rejects COL spaces.
    pub(crate) fn neighbours_by_id(&self, id: usize) -> SpaceResult<NeighbourList> {
        match self {
            WordSpace::Dense(d) => d.neighbours_by_id(id),
            WordSpace::Sparse(s) => {
                s.require_sim("similar_words")?;
                let Some(record) = s.record_by_id(id)? else {
                    return Ok(NeighbourList::new());
                };
                let mut out = NeighbourList::new();
                for (word, sim) in crate::sparse::live_neighbour_prefix(record.neighbours) {
                    match s.id_of(&word) {
                        Some(nid) => out.push((nid as u32, sim)),
                        // Every stored neighbour should resolve; a miss
                        // means the store was built inconsistently.
                        None => log::warn!("neighbour '{}' not in vocabulary, skipped", word),
                    }
                }
                Ok(out)
            }
        }
    }

    pub(crate) fn require_sim(&self, operation: &'static str) -> SpaceResult<()> {
        match self {
            WordSpace::Sparse(s) => s.require_sim(operation),
            WordSpace::Dense(d) => d.require_sim(operation).map(|_| ()),
        }
    }

    /// Iterate over the vocabulary.
    ///
    /// The order is unspecified and entries cannot be removed; each item is
    /// a `SpaceResult` because sparse stores decode records lazily.
    pub fn vocabulary(&self) -> Vocabulary<'_> {
        Vocabulary {
            space: self,
            next_id: 0,
        }
    }

    /// The `-2.0` sentinel `semantic_similarity` returns for unknown words.
    pub fn unknown_similarity() -> f32 {
        UNKNOWN_SIMILARITY
    }
}

/// Unordered iterator over the words of a space. See
/// [`WordSpace::vocabulary`].
pub struct Vocabulary<'a> {
    space: &'a WordSpace,
    next_id: usize,
}

impl Iterator for Vocabulary<'_> {
    type Item = SpaceResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_id >= self.space.number_of_words() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        match self.space.word_by_id(id) {
            Ok(Some(word)) => Some(Ok(word)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WordSpace>();
        assert_send_sync::<QueryVector>();
    }

    #[test]
    fn test_mixed_representations_rejected() {
        let dense = QueryVector::Dense(vec![1.0, 0.0]);
        let sparse = QueryVector::Sparse(SparseVector::empty());
        assert!(matches!(
            dense.similarity(&sparse, Measure::Cosine),
            Err(SpaceError::Parse(_))
        ));
    }
}
