//! Dense word-space back-end.
//!
//! Vectors are stored in Structure of Arrays (SoA) format for cache
//! efficiency: one `Vec<f32>` of `V * D` floats, one row per word. A SIM
//! store adds two parallel neighbour matrices (`V * nSim` ids and
//! similarities); an optional character n-gram table of `G * D` floats
//! backs out-of-vocabulary synthesis. Word and n-gram lookups go through
//! fst term dictionaries, which double as the membership test.
//!
//! The whole store is one serialized image (see the format module); opening
//! it reconstructs an immutable, owned object graph. Row slices handed out
//! by [`DenseSpace::word_vector`] alias the backing matrix and must not be
//! mutated.

mod builder;
mod format;
pub(crate) mod subword;

pub use builder::DenseSpaceBuilder;

use std::fs;
use std::path::Path;

use fst::Map;
use wordspace_vectors::{Measure, SparseVector};

use crate::config::{Config, SpaceKind};
use crate::error::{SpaceError, SpaceResult};
use crate::space::NeighbourList;
use crate::sparse::UNKNOWN_SIMILARITY;

pub(crate) struct NgramTable {
    pub(crate) dict: Map<Vec<u8>>,
    pub(crate) matrix: Vec<f32>,
}

pub(crate) struct NeighbourData {
    pub(crate) n_sim: usize,
    pub(crate) ids: Vec<i32>,
    pub(crate) sims: Vec<f32>,
}

/// Handle to an in-memory dense word space.
///
/// Immutable after open; shareable across threads without locking.
pub struct DenseSpace {
    pub(crate) config: Config,
    pub(crate) dict: Map<Vec<u8>>,
    pub(crate) words: Vec<String>,
    pub(crate) freqs: Vec<u64>,
    pub(crate) matrix: Vec<f32>,
    pub(crate) dimension: usize,
    pub(crate) ngrams: Option<NgramTable>,
    pub(crate) neighbours: Option<NeighbourData>,
}

impl DenseSpace {
    /// Load a serialized dense store image.
    ///
    /// Any deserialization failure is fatal for the open attempt.
    pub fn open(path: &Path) -> SpaceResult<DenseSpace> {
        let bytes = fs::read(path)?;
        let space = format::from_bytes(&bytes)?;
        log::info!(
            "opened dense word space: {} words x {} dims, {} kind, ngrams={}",
            space.len(),
            space.dimension(),
            space.config.kind(),
            space.ngrams.is_some()
        );
        Ok(space)
    }

    /// Serialize the store into a single image file.
    pub fn save(&self, path: &Path) -> SpaceResult<()> {
        fs::write(path, format::to_bytes(self))?;
        Ok(())
    }

    /// The store's config record.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of vocabulary entries.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the store holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Feature dimensionality `D`.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Width of the neighbour matrices; 0 on COL stores.
    pub fn n_sim(&self) -> usize {
        self.neighbours.as_ref().map(|n| n.n_sim).unwrap_or(0)
    }

    /// Row id of a word, if present.
    pub fn id_of(&self, word: &str) -> Option<usize> {
        self.dict.get(word).map(|id| id as usize)
    }

    /// Surface string of the entry at row id `id`.
    pub fn word_by_id(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    /// Corpus frequency of a word; 0 when unknown.
    pub fn frequency(&self, word: &str) -> u64 {
        self.id_of(word)
            .and_then(|id| self.freqs.get(id).copied())
            .unwrap_or(0)
    }

    /// The matrix row of the entry at `id`.
    ///
    /// The returned slice aliases the backing matrix; callers must not
    /// mutate it (copy first).
    pub fn word_vector(&self, id: usize) -> Option<&[f32]> {
        if id >= self.words.len() {
            return None;
        }
        let start = id * self.dimension;
        Some(&self.matrix[start..start + self.dimension])
    }

    /// Embedding of a word, synthesizing out-of-vocabulary words from
    /// subword n-grams when the store carries them.
    ///
    /// - Known word: copy of its matrix row.
    /// - OOV with an n-gram table: sum of the stored n-gram vectors of the
    ///   padded word; the zero vector when no n-gram matches.
    /// - OOV without an n-gram table: `None`.
    pub fn word_embedding(&self, word: &str) -> Option<Vec<f32>> {
        if let Some(id) = self.id_of(word) {
            return self.word_vector(id).map(|row| row.to_vec());
        }
        if self.ngrams.is_some() {
            return Some(subword::oov_vector(self, word));
        }
        None
    }

    /// Row of an n-gram in the subword table, if present.
    pub(crate) fn ngram_row(&self, gram: &str) -> Option<&[f32]> {
        let table = self.ngrams.as_ref()?;
        let id = table.dict.get(gram)? as usize;
        let start = id * self.dimension;
        Some(&table.matrix[start..start + self.dimension])
    }

    /// Stored neighbour ids and similarities of the entry at `id`, stopping
    /// at the first zero similarity.
    pub(crate) fn neighbours_by_id(&self, id: usize) -> SpaceResult<NeighbourList> {
        let data = self.require_sim("similar_words")?;
        let mut out = NeighbourList::new();
        if id >= self.words.len() {
            return Ok(out);
        }
        let start = id * data.n_sim;
        for k in 0..data.n_sim {
            let sim = data.sims[start + k];
            if sim <= 0.0 {
                break;
            }
            out.push((data.ids[start + k] as u32, sim));
        }
        Ok(out)
    }

    /// Stored nearest neighbours of a word, best first.
    ///
    /// The stored width is an upper bound; the first zero similarity
    /// terminates the list. Rejects COL stores.
    pub fn similar_words(&self, word: &str) -> SpaceResult<Option<Vec<(String, f32)>>> {
        self.require_sim("similar_words")?;
        let Some(id) = self.id_of(word) else {
            return Ok(None);
        };
        let pairs = self.neighbours_by_id(id)?;
        Ok(Some(
            pairs
                .into_iter()
                .map(|(nid, sim)| (self.words[nid as usize].clone(), sim))
                .collect(),
        ))
    }

    /// First-order similarity of two words' rows under `measure`.
    ///
    /// Returns the `-2.0` sentinel when either word is unknown.
    pub fn semantic_similarity(&self, w1: &str, w2: &str, measure: Measure) -> SpaceResult<f32> {
        let (Some(id1), Some(id2)) = (self.id_of(w1), self.id_of(w2)) else {
            return Ok(UNKNOWN_SIMILARITY);
        };
        let (Some(u), Some(v)) = (self.word_vector(id1), self.word_vector(id2)) else {
            return Ok(UNKNOWN_SIMILARITY);
        };
        Ok(measure.dense(u, v)?)
    }

    /// Similarity of two words' stored neighbour lists under `measure`.
    ///
    /// Builds one sparse vector per word, keyed by neighbour id rendered as
    /// a string, and applies the measure. Returns `-2.0` when either word
    /// is unknown; rejects COL stores.
    pub fn second_order_similarity(&self, w1: &str, w2: &str, measure: Measure) -> SpaceResult<f32> {
        self.require_sim("second_order_similarity")?;
        let (Some(id1), Some(id2)) = (self.id_of(w1), self.id_of(w2)) else {
            return Ok(UNKNOWN_SIMILARITY);
        };
        let va = self.neighbour_id_vector(id1)?;
        let vb = self.neighbour_id_vector(id2)?;
        Ok(measure.sparse(&va, &vb))
    }

    fn neighbour_id_vector(&self, id: usize) -> SpaceResult<SparseVector> {
        let pairs = self.neighbours_by_id(id)?;
        Ok(SparseVector::from_entries(
            pairs.into_iter().map(|(nid, sim)| (nid.to_string(), sim)),
        ))
    }

    pub(crate) fn require_sim(&self, operation: &'static str) -> SpaceResult<&NeighbourData> {
        if self.config.kind() != SpaceKind::Sim {
            return Err(SpaceError::WrongSpaceType {
                operation,
                kind: self.config.kind(),
            });
        }
        self.neighbours.as_ref().ok_or(SpaceError::WrongSpaceType {
            operation,
            kind: SpaceKind::Col,
        })
    }
}
