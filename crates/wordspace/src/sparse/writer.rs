//! Writer for the sparse store directory format.
//!
//! The offline builder that computes feature vectors and neighbour lists is
//! a separate system; this writer only serializes finished records into the
//! directory layout the [`SparseSpace`](super::SparseSpace) reader consumes.
//! Integration tests and fixtures use it to produce stores.

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use fst::MapBuilder;

use super::codec::{self, WordRecord, HEADER_LEN};
use super::{RECORDS_FILE_NAME, TERMS_FILE_NAME};
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::{SpaceError, SpaceResult};

/// Accumulates records and writes a sparse store directory.
pub struct StoreWriter {
    dir: PathBuf,
    config: Config,
    records: Vec<WordRecord>,
}

impl StoreWriter {
    /// Start a store under `dir` with the given config record.
    ///
    /// `vocabularySize` in the written config is set from the number of
    /// records at finish time.
    pub fn new(dir: &Path, config: Config) -> StoreWriter {
        StoreWriter {
            dir: dir.to_path_buf(),
            config,
            records: Vec::new(),
        }
    }

    /// Add one vocabulary entry. Insertion order defines document ids.
    pub fn add(
        &mut self,
        word: &str,
        freq: u64,
        features: Vec<(String, f32)>,
        neighbours: Vec<(String, f32)>,
    ) {
        self.records.push(WordRecord {
            word: word.to_string(),
            freq,
            features,
            neighbours,
        });
    }

    /// Serialize all files and finish the store.
    pub fn finish(mut self) -> SpaceResult<()> {
        // The fst builder needs keys in sorted order; ids stay the
        // insertion order of the records.
        let mut by_word: Vec<(String, u64)> = self
            .records
            .iter()
            .enumerate()
            .map(|(id, r)| (r.word.clone(), id as u64))
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
        for (word, id) in &by_word {
            builder.insert(word, *id).map_err(|e| SpaceError::CorruptIndex {
                message: format!("term dictionary: {}", e),
            })?;
        }
        let dict_bytes = builder.into_inner().map_err(|e| SpaceError::CorruptIndex {
            message: format!("term dictionary: {}", e),
        })?;

        let mut bytes = Vec::new();
        codec::write_header(&mut bytes, self.records.len() as u32);
        // Reserve the offset table, fill it in once the offsets are known.
        for _ in 0..self.records.len() {
            bytes.write_u64::<LittleEndian>(0).unwrap();
        }
        let mut offsets = Vec::with_capacity(self.records.len());
        for record in &self.records {
            offsets.push(bytes.len() as u64);
            codec::encode_record(&mut bytes, record);
        }
        for (id, offset) in offsets.iter().enumerate() {
            let pos = HEADER_LEN + id * 8;
            bytes[pos..pos + 8].copy_from_slice(&offset.to_le_bytes());
        }
        let crc = crc32fast::hash(&bytes);
        bytes.write_u32::<LittleEndian>(crc).unwrap();

        self.config.vocabulary_size = self.records.len() as u64;

        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(RECORDS_FILE_NAME), &bytes)?;
        fs::write(self.dir.join(TERMS_FILE_NAME), &dict_bytes)?;
        fs::write(self.dir.join(CONFIG_FILE_NAME), self.config.to_properties())?;

        log::info!(
            "wrote sparse word space: {} words at {}",
            self.records.len(),
            self.dir.display()
        );
        Ok(())
    }
}
