//! Single-image serialization of the dense store.
//!
//! Image layout (all integers little-endian):
//!
//! ```text
//! magic      b"WSPD"
//! version    u32
//! flags      u8          bit0 = n-gram table present, bit1 = neighbours
//! config     u32 length + key=value text (UTF-8)
//! word fst   u64 length + fst bytes
//! V, D       u32, u32
//! offsets    V x u64     byte offset of each word in the words buffer
//! words      u64 length, then per word u16 length + UTF-8 bytes
//! freqs      V x u64
//! matrix     V x D x f32
//! [bit0]     n-gram fst (u64 length + bytes), u32 G, G x D x f32
//! [bit1]     u32 nSim, V x nSim x i32 ids, V x nSim x f32 sims
//! checksum   u32         CRC32 of everything before it
//! ```
//!
//! Serialization is deterministic, so write -> read -> write reproduces the
//! image byte for byte.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use fst::Map;

use super::{DenseSpace, NeighbourData, NgramTable};
use crate::config::Config;
use crate::error::{SpaceError, SpaceResult};

const DENSE_MAGIC: [u8; 4] = *b"WSPD";
const DENSE_VERSION: u32 = 1;

const FLAG_NGRAMS: u8 = 1 << 0;
const FLAG_NEIGHBOURS: u8 = 1 << 1;

fn corrupt(message: impl Into<String>) -> SpaceError {
    SpaceError::CorruptIndex {
        message: message.into(),
    }
}

fn truncated(what: &str) -> SpaceError {
    corrupt(format!("truncated image: {}", what))
}

/// Serialize a dense store into its on-disk image.
pub(crate) fn to_bytes(space: &DenseSpace) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&DENSE_MAGIC);
    out.write_u32::<LittleEndian>(DENSE_VERSION).unwrap();

    let mut flags = 0u8;
    if space.ngrams.is_some() {
        flags |= FLAG_NGRAMS;
    }
    if space.neighbours.is_some() {
        flags |= FLAG_NEIGHBOURS;
    }
    out.write_u8(flags).unwrap();

    let config_text = space.config.to_properties();
    out.write_u32::<LittleEndian>(config_text.len() as u32).unwrap();
    out.extend_from_slice(config_text.as_bytes());

    let dict_bytes = space.dict.as_fst().as_bytes();
    out.write_u64::<LittleEndian>(dict_bytes.len() as u64).unwrap();
    out.extend_from_slice(dict_bytes);

    out.write_u32::<LittleEndian>(space.words.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(space.dimension as u32).unwrap();

    // Word buffer with its id -> offset table.
    let mut buffer = Vec::new();
    let mut offsets = Vec::with_capacity(space.words.len());
    for word in &space.words {
        offsets.push(buffer.len() as u64);
        buffer
            .write_u16::<LittleEndian>(word.len() as u16)
            .unwrap();
        buffer.extend_from_slice(word.as_bytes());
    }
    for offset in &offsets {
        out.write_u64::<LittleEndian>(*offset).unwrap();
    }
    out.write_u64::<LittleEndian>(buffer.len() as u64).unwrap();
    out.extend_from_slice(&buffer);

    for freq in &space.freqs {
        out.write_u64::<LittleEndian>(*freq).unwrap();
    }
    for value in &space.matrix {
        out.write_f32::<LittleEndian>(*value).unwrap();
    }

    if let Some(table) = &space.ngrams {
        let ngram_dict = table.dict.as_fst().as_bytes();
        out.write_u64::<LittleEndian>(ngram_dict.len() as u64).unwrap();
        out.extend_from_slice(ngram_dict);
        let count = if space.dimension == 0 {
            0
        } else {
            table.matrix.len() / space.dimension
        };
        out.write_u32::<LittleEndian>(count as u32).unwrap();
        for value in &table.matrix {
            out.write_f32::<LittleEndian>(*value).unwrap();
        }
    }

    if let Some(data) = &space.neighbours {
        out.write_u32::<LittleEndian>(data.n_sim as u32).unwrap();
        for id in &data.ids {
            out.write_i32::<LittleEndian>(*id).unwrap();
        }
        for sim in &data.sims {
            out.write_f32::<LittleEndian>(*sim).unwrap();
        }
    }

    let crc = crc32fast::hash(&out);
    out.write_u32::<LittleEndian>(crc).unwrap();
    out
}

fn read_fst(cursor: &mut Cursor<&[u8]>, what: &str) -> SpaceResult<Map<Vec<u8>>> {
    let len = cursor.read_u64::<LittleEndian>().map_err(|_| truncated(what))? as usize;
    let mut bytes = vec![0u8; len];
    cursor.read_exact(&mut bytes).map_err(|_| truncated(what))?;
    Map::new(bytes).map_err(|e| corrupt(format!("{}: {}", what, e)))
}

fn read_f32_vec(cursor: &mut Cursor<&[u8]>, len: usize, what: &str) -> SpaceResult<Vec<f32>> {
    let mut out = vec![0.0f32; len];
    cursor
        .read_f32_into::<LittleEndian>(&mut out)
        .map_err(|_| truncated(what))?;
    Ok(out)
}

/// Reconstruct a dense store from its on-disk image.
pub(crate) fn from_bytes(bytes: &[u8]) -> SpaceResult<DenseSpace> {
    if bytes.len() < 13 {
        return Err(corrupt("image too short"));
    }
    if bytes[0..4] != DENSE_MAGIC {
        return Err(corrupt("invalid magic bytes"));
    }

    let stored_crc = u32::from_le_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
    let actual_crc = crc32fast::hash(&bytes[..bytes.len() - 4]);
    if stored_crc != actual_crc {
        return Err(corrupt(format!(
            "checksum mismatch: stored {:#x}, computed {:#x}",
            stored_crc, actual_crc
        )));
    }

    let mut cursor = Cursor::new(bytes);
    cursor.set_position(4);
    let version = cursor.read_u32::<LittleEndian>().unwrap();
    if version != DENSE_VERSION {
        return Err(corrupt(format!("unsupported format version {}", version)));
    }
    let flags = cursor.read_u8().map_err(|_| truncated("flags"))?;

    let config_len = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| truncated("config length"))? as usize;
    let mut config_bytes = vec![0u8; config_len];
    cursor
        .read_exact(&mut config_bytes)
        .map_err(|_| truncated("config"))?;
    let config_text =
        String::from_utf8(config_bytes).map_err(|_| corrupt("config is not UTF-8"))?;
    let config = Config::parse(&config_text)?;

    let dict = read_fst(&mut cursor, "word dictionary")?;

    let v = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| truncated("vocabulary size"))? as usize;
    let d = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| truncated("dimensionality"))? as usize;

    if dict.len() != v {
        return Err(corrupt(format!(
            "word dictionary has {} entries, image says {}",
            dict.len(),
            v
        )));
    }
    if config.vocabulary_size as usize != v {
        return Err(corrupt(format!(
            "config vocabularySize {} disagrees with stored matrix rows {}",
            config.vocabulary_size, v
        )));
    }

    let mut offsets = Vec::with_capacity(v);
    for _ in 0..v {
        offsets.push(
            cursor
                .read_u64::<LittleEndian>()
                .map_err(|_| truncated("word offsets"))?,
        );
    }

    let buffer_len = cursor
        .read_u64::<LittleEndian>()
        .map_err(|_| truncated("word buffer length"))? as usize;
    let buffer_start = cursor.position() as usize;
    if buffer_start + buffer_len > bytes.len() {
        return Err(truncated("word buffer"));
    }
    let buffer = &bytes[buffer_start..buffer_start + buffer_len];

    let mut words = Vec::with_capacity(v);
    for (id, &offset) in offsets.iter().enumerate() {
        let mut word_cursor = Cursor::new(buffer);
        word_cursor.set_position(offset);
        let len = word_cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| truncated("word length"))? as usize;
        let start = word_cursor.position() as usize;
        if start + len > buffer.len() {
            return Err(truncated("word bytes"));
        }
        let word = std::str::from_utf8(&buffer[start..start + len])
            .map_err(|_| corrupt(format!("word {} is not UTF-8", id)))?;
        words.push(word.to_string());
    }
    cursor.set_position((buffer_start + buffer_len) as u64);

    let mut freqs = Vec::with_capacity(v);
    for _ in 0..v {
        freqs.push(
            cursor
                .read_u64::<LittleEndian>()
                .map_err(|_| truncated("frequencies"))?,
        );
    }

    let matrix = read_f32_vec(&mut cursor, v * d, "matrix")?;

    let ngrams = if flags & FLAG_NGRAMS != 0 {
        let ngram_dict = read_fst(&mut cursor, "n-gram dictionary")?;
        let g = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| truncated("n-gram count"))? as usize;
        if ngram_dict.len() != g {
            return Err(corrupt(format!(
                "n-gram dictionary has {} entries, image says {}",
                ngram_dict.len(),
                g
            )));
        }
        let ngram_matrix = read_f32_vec(&mut cursor, g * d, "n-gram matrix")?;
        Some(NgramTable {
            dict: ngram_dict,
            matrix: ngram_matrix,
        })
    } else {
        None
    };

    let neighbours = if flags & FLAG_NEIGHBOURS != 0 {
        let n_sim = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| truncated("neighbour width"))? as usize;
        if config.number_of_similar_words as usize != n_sim {
            return Err(corrupt(format!(
                "config numberOfSimilarWords {} disagrees with neighbour matrix width {}",
                config.number_of_similar_words, n_sim
            )));
        }
        let mut ids = vec![0i32; v * n_sim];
        cursor
            .read_i32_into::<LittleEndian>(&mut ids)
            .map_err(|_| truncated("neighbour ids"))?;
        let sims = read_f32_vec(&mut cursor, v * n_sim, "neighbour similarities")?;
        for &id in &ids {
            if id < 0 || id as usize >= v {
                return Err(corrupt(format!("neighbour id {} out of range", id)));
            }
        }
        Some(NeighbourData { n_sim, ids, sims })
    } else {
        None
    };

    Ok(DenseSpace {
        config,
        dict,
        words,
        freqs,
        matrix,
        dimension: d,
        ngrams,
        neighbours,
    })
}
