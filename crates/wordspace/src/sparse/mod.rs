//! Sparse word-space back-end.
//!
//! An inverted-index store laid out as a directory:
//!
//! ```text
//! <dir>/disco.config   config record, key=value text
//! <dir>/terms.fst      term dictionary, word -> record id
//! <dir>/records.bin    per-word records, see the codec module
//! ```
//!
//! Records are decoded on demand. The record file is either memory-mapped
//! ("open") or mirrored into one resident buffer ("load"); resident stores
//! never touch the disk after open, which is the mode the O(V) rank
//! utilities expect. The files must not be mutated while a handle is open.

mod codec;
pub mod writer;

pub use codec::WordRecord;

use std::fs::{self, File};
use std::path::Path;

use fst::Map;
use memmap2::Mmap;
use wordspace_vectors::{Measure, SparseVector};

use crate::config::{Config, SpaceKind, CONFIG_FILE_NAME};
use crate::error::{SpaceError, SpaceResult};
use crate::RELATION_SEPARATOR;

/// File name of the term dictionary inside a store directory.
pub const TERMS_FILE_NAME: &str = "terms.fst";

/// File name of the record file inside a store directory.
pub const RECORDS_FILE_NAME: &str = "records.bin";

/// Similarity sentinel returned when either queried word is unknown.
pub(crate) const UNKNOWN_SIMILARITY: f32 = -2.0;

enum Backing {
    Mapped(Mmap),
    Resident(Vec<u8>),
}

impl Backing {
    fn bytes(&self) -> &[u8] {
        match self {
            Backing::Mapped(map) => map,
            Backing::Resident(buf) => buf,
        }
    }
}

/// Handle to an on-disk sparse word space.
///
/// Immutable after open; shareable across threads without locking.
pub struct SparseSpace {
    config: Config,
    dict: Map<Vec<u8>>,
    offsets: Vec<u64>,
    records: Backing,
}

impl SparseSpace {
    /// Open a sparse store directory.
    ///
    /// With `resident` set, the whole record file is read into memory as a
    /// single mirror and queries never block on page-in afterwards;
    /// otherwise the file is memory-mapped. Magic, version and checksum are
    /// verified either way.
    pub fn open(dir: &Path, resident: bool) -> SpaceResult<SparseSpace> {
        let config = Config::from_file(&dir.join(CONFIG_FILE_NAME))?;

        let dict_bytes = fs::read(dir.join(TERMS_FILE_NAME))?;
        let dict = Map::new(dict_bytes).map_err(|e| SpaceError::CorruptIndex {
            message: format!("term dictionary: {}", e),
        })?;

        let records = if resident {
            Backing::Resident(fs::read(dir.join(RECORDS_FILE_NAME))?)
        } else {
            let file = File::open(dir.join(RECORDS_FILE_NAME))?;
            // Safety: the store contract forbids mutating the files while a
            // handle is open.
            let map = unsafe { Mmap::map(&file)? };
            Backing::Mapped(map)
        };

        let offsets = codec::validate(records.bytes())?;
        if offsets.len() as u64 != dict.len() as u64 {
            return Err(SpaceError::CorruptIndex {
                message: format!(
                    "term dictionary has {} entries, record file has {}",
                    dict.len(),
                    offsets.len()
                ),
            });
        }

        log::info!(
            "opened sparse word space: {} words, {} kind, resident={}",
            offsets.len(),
            config.kind(),
            resident
        );

        Ok(SparseSpace {
            config,
            dict,
            offsets,
            records,
        })
    }

    /// The store's config record.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of vocabulary entries.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the store holds no words.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Whether the record file is fully resident in memory.
    pub fn is_resident(&self) -> bool {
        matches!(self.records, Backing::Resident(_))
    }

    /// Dense document id of a word, if present.
    pub fn id_of(&self, word: &str) -> Option<usize> {
        if !is_single_token(word) {
            return None;
        }
        self.dict.get(word).map(|id| id as usize)
    }

    /// Fetch the full record of a word.
    ///
    /// The query must be a single token; strings that would need
    /// tokenization are treated as not-found.
    pub fn lookup(&self, word: &str) -> SpaceResult<Option<WordRecord>> {
        match self.id_of(word) {
            Some(id) => self.record_by_id(id),
            None => Ok(None),
        }
    }

    /// Fetch the record stored at document id `id` (`[0, V)`).
    pub fn record_by_id(&self, id: usize) -> SpaceResult<Option<WordRecord>> {
        let Some(&offset) = self.offsets.get(id) else {
            return Ok(None);
        };
        codec::decode_record(self.records.bytes(), offset).map(Some)
    }

    /// Surface string of the entry at document id `id`.
    pub fn word_by_id(&self, id: usize) -> SpaceResult<Option<String>> {
        Ok(self.record_by_id(id)?.map(|r| r.word))
    }

    /// Corpus frequency of a word; 0 when unknown.
    pub fn frequency(&self, word: &str) -> SpaceResult<u64> {
        Ok(self.lookup(word)?.map(|r| r.freq).unwrap_or(0))
    }

    /// The word's feature vector as a sparse mapping.
    pub fn word_vector(&self, word: &str) -> SpaceResult<Option<SparseVector>> {
        Ok(self.lookup(word)?.map(|r| r.feature_vector()))
    }

    /// Collocations of a word: feature keys with their relation suffix
    /// stripped, significances of identical words summed, sorted by
    /// significance descending. Ties keep first-occurrence order.
    pub fn collocations(&self, word: &str) -> SpaceResult<Option<Vec<(String, f32)>>> {
        let Some(record) = self.lookup(word)? else {
            return Ok(None);
        };
        Ok(Some(fold_collocations(&record)))
    }

    /// Stored nearest neighbours of a word, best first.
    ///
    /// The stored width is an upper bound; the first zero similarity
    /// terminates the list. Rejects COL stores.
    pub fn similar_words(&self, word: &str) -> SpaceResult<Option<Vec<(String, f32)>>> {
        self.require_sim("similar_words")?;
        let Some(record) = self.lookup(word)? else {
            return Ok(None);
        };
        Ok(Some(live_neighbour_prefix(record.neighbours)))
    }

    /// First-order similarity of two words under `measure`.
    ///
    /// Returns the `-2.0` sentinel when either word is unknown.
    pub fn semantic_similarity(&self, w1: &str, w2: &str, measure: Measure) -> SpaceResult<f32> {
        let (Some(a), Some(b)) = (self.lookup(w1)?, self.lookup(w2)?) else {
            return Ok(UNKNOWN_SIMILARITY);
        };
        Ok(record_similarity(&a, &b, measure))
    }

    /// Similarity of two words' stored neighbour lists under `measure`.
    ///
    /// Builds one sparse vector per word, keyed by neighbour word, and
    /// applies the measure. Returns `-2.0` when either word is unknown;
    /// rejects COL stores.
    pub fn second_order_similarity(&self, w1: &str, w2: &str, measure: Measure) -> SpaceResult<f32> {
        self.require_sim("second_order_similarity")?;
        let (Some(a), Some(b)) = (self.lookup(w1)?, self.lookup(w2)?) else {
            return Ok(UNKNOWN_SIMILARITY);
        };
        let va = neighbour_vector(&a);
        let vb = neighbour_vector(&b);
        Ok(measure.sparse(&va, &vb))
    }

    pub(crate) fn require_sim(&self, operation: &'static str) -> SpaceResult<()> {
        if self.config.kind() != SpaceKind::Sim {
            return Err(SpaceError::WrongSpaceType {
                operation,
                kind: self.config.kind(),
            });
        }
        Ok(())
    }
}

/// The single-token check applied to every query string. Multi-token input
/// would need tokenization, which the lookup does not do; it is treated as
/// not-found.
fn is_single_token(word: &str) -> bool {
    !word.is_empty() && !word.chars().any(char::is_whitespace)
}

/// Strip the `<separator><relation>` suffix from a feature key. Plain words
/// and pure integer ids pass through unchanged.
pub(crate) fn strip_relation(key: &str) -> &str {
    match key.find(RELATION_SEPARATOR) {
        Some(pos) => &key[..pos],
        None => key,
    }
}

fn fold_collocations(record: &WordRecord) -> Vec<(String, f32)> {
    use std::collections::HashMap;

    let mut order: Vec<(String, f32)> = Vec::with_capacity(record.features.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(record.features.len());

    for (key, sig) in &record.features {
        let word = strip_relation(key);
        match index.get(word) {
            Some(&i) => order[i].1 += sig,
            None => {
                order.push((word.to_string(), *sig));
                // Borrow the key from the record, not from `order`, so the
                // map stays valid while `order` grows.
                index.insert(word, order.len() - 1);
            }
        }
    }

    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    order
}

/// Truncate a stored neighbour list at the first zero entry.
pub(crate) fn live_neighbour_prefix(neighbours: Vec<(String, f32)>) -> Vec<(String, f32)> {
    let end = neighbours
        .iter()
        .position(|(_, sim)| *sim <= 0.0)
        .unwrap_or(neighbours.len());
    let mut neighbours = neighbours;
    neighbours.truncate(end);
    neighbours
}

/// The record-level similarity overload: extract both feature vectors and
/// apply the measure. Kept private to the sparse back-end; external callers
/// hold the dense/sparse entry points only.
fn record_similarity(a: &WordRecord, b: &WordRecord, measure: Measure) -> f32 {
    measure.sparse(&a.feature_vector(), &b.feature_vector())
}

fn neighbour_vector(record: &WordRecord) -> SparseVector {
    SparseVector::from_entries(live_neighbour_prefix(record.neighbours.clone()))
}
