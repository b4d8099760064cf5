//! In-memory construction of a dense store.
//!
//! The heavy lifting (counting, weighting, neighbour computation) belongs
//! to the offline builder; this type only assembles finished rows into a
//! [`DenseSpace`], for fixtures, tests, and the serialization round trip.

use fst::MapBuilder;
use wordspace_vectors::VectorError;

use super::{DenseSpace, NeighbourData, NgramTable};
use crate::config::{Config, SpaceKind};
use crate::error::{SpaceError, SpaceResult};

/// Builder assembling a [`DenseSpace`] row by row.
pub struct DenseSpaceBuilder {
    config: Config,
    words: Vec<String>,
    freqs: Vec<u64>,
    rows: Vec<Vec<f32>>,
    neighbour_lists: Vec<Vec<(u32, f32)>>,
    ngrams: Vec<(String, Vec<f32>)>,
}

impl DenseSpaceBuilder {
    pub fn new(config: Config) -> DenseSpaceBuilder {
        DenseSpaceBuilder {
            config,
            words: Vec::new(),
            freqs: Vec::new(),
            rows: Vec::new(),
            neighbour_lists: Vec::new(),
            ngrams: Vec::new(),
        }
    }

    /// Add a vocabulary entry; the returned id is the row index.
    pub fn add_word(&mut self, word: &str, freq: u64, vector: Vec<f32>) -> usize {
        self.words.push(word.to_string());
        self.freqs.push(freq);
        self.rows.push(vector);
        self.neighbour_lists.push(Vec::new());
        self.words.len() - 1
    }

    /// Set the stored neighbour list of an entry, best first. Only
    /// meaningful when the config declares a SIM space.
    pub fn set_neighbours(&mut self, id: usize, neighbours: Vec<(u32, f32)>) {
        self.neighbour_lists[id] = neighbours;
    }

    /// Add a character n-gram vector to the subword table.
    pub fn add_ngram(&mut self, gram: &str, vector: Vec<f32>) {
        self.ngrams.push((gram.to_string(), vector));
    }

    /// Assemble the store, validating dimensions and ids.
    pub fn build(mut self) -> SpaceResult<DenseSpace> {
        let dimension = if self.config.number_feature_words > 0 {
            self.config.number_feature_words as usize
        } else {
            let d = self.rows.first().map(Vec::len).unwrap_or(0);
            self.config.number_feature_words = d as u32;
            d
        };

        for row in &self.rows {
            if row.len() != dimension {
                return Err(SpaceError::Shape(VectorError::DimensionMismatch {
                    left: dimension,
                    right: row.len(),
                }));
            }
        }

        let v = self.words.len();
        let dict = build_dict(&self.words)?;

        let mut matrix = Vec::with_capacity(v * dimension);
        for row in &self.rows {
            matrix.extend_from_slice(row);
        }

        let ngrams = if self.ngrams.is_empty() {
            None
        } else {
            for (gram, row) in &self.ngrams {
                if row.len() != dimension {
                    return Err(SpaceError::Shape(VectorError::DimensionMismatch {
                        left: dimension,
                        right: row.len(),
                    }));
                }
                if gram.is_empty() {
                    return Err(SpaceError::CorruptIndex {
                        message: "empty n-gram key".to_string(),
                    });
                }
            }
            let keys: Vec<String> = self.ngrams.iter().map(|(g, _)| g.clone()).collect();
            let dict = build_dict(&keys)?;
            // Rows must land at the ids the dictionary assigned, which are
            // insertion-order ids, so a flat copy in insertion order works.
            let mut table = Vec::with_capacity(self.ngrams.len() * dimension);
            for (_, row) in &self.ngrams {
                table.extend_from_slice(row);
            }
            self.config.number_of_ngrams = keys.len() as u64;
            Some(NgramTable {
                dict,
                matrix: table,
            })
        };

        let neighbours = if self.config.kind() == SpaceKind::Sim {
            let n_sim = if self.config.number_of_similar_words > 0 {
                self.config.number_of_similar_words as usize
            } else {
                let widest = self.neighbour_lists.iter().map(Vec::len).max().unwrap_or(0);
                self.config.number_of_similar_words = widest as u32;
                widest
            };

            let mut ids = vec![0i32; v * n_sim];
            let mut sims = vec![0.0f32; v * n_sim];
            for (id, list) in self.neighbour_lists.iter().enumerate() {
                if list.len() > n_sim {
                    return Err(SpaceError::CorruptIndex {
                        message: format!(
                            "word {} has {} neighbours, matrix width is {}",
                            self.words[id],
                            list.len(),
                            n_sim
                        ),
                    });
                }
                for (k, (nid, sim)) in list.iter().enumerate() {
                    if *nid as usize >= v {
                        return Err(SpaceError::CorruptIndex {
                            message: format!("neighbour id {} out of range", nid),
                        });
                    }
                    ids[id * n_sim + k] = *nid as i32;
                    sims[id * n_sim + k] = *sim;
                }
            }
            Some(NeighbourData { n_sim, ids, sims })
        } else {
            None
        };

        self.config.vocabulary_size = v as u64;

        Ok(DenseSpace {
            config: self.config,
            dict,
            words: self.words,
            freqs: self.freqs,
            matrix,
            dimension,
            ngrams,
            neighbours,
        })
    }
}

fn build_dict(words: &[String]) -> SpaceResult<fst::Map<Vec<u8>>> {
    let mut by_word: Vec<(&str, u64)> = words
        .iter()
        .enumerate()
        .map(|(id, w)| (w.as_str(), id as u64))
        .collect();
    by_word.sort();
    for pair in by_word.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(SpaceError::CorruptIndex {
                message: format!("duplicate word '{}'", pair[0].0),
            });
        }
    }

    let mut builder = MapBuilder::memory();
    for (word, id) in by_word {
        builder.insert(word, id).map_err(|e| SpaceError::CorruptIndex {
            message: format!("term dictionary: {}", e),
        })?;
    }
    let bytes = builder.into_inner().map_err(|e| SpaceError::CorruptIndex {
        message: format!("term dictionary: {}", e),
    })?;
    fst::Map::new(bytes).map_err(|e| SpaceError::CorruptIndex {
        message: format!("term dictionary: {}", e),
    })
}
