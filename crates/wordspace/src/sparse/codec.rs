//! Binary record format for the sparse store.
//!
//! `records.bin` layout (all integers little-endian):
//!
//! ```text
//! magic     b"WSPR"
//! version   u32
//! count     u32                       number of records
//! offsets   count x u64               absolute offset of each record, by id
//! records   count x record
//! checksum  u32                       CRC32 of everything before it
//! ```
//!
//! Each record:
//!
//! ```text
//! word        u16 length + UTF-8 bytes
//! freq        u64
//! nkol        u32
//! features    nkol x (u16 length + UTF-8 key, f32 significance)
//! nsim        u32
//! neighbours  nsim x (u16 length + UTF-8 word, f32 similarity)
//! ```
//!
//! Feature keys and significances are interleaved, so the parallel-array
//! invariant of the store holds by construction. COL stores write `nsim = 0`.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use wordspace_vectors::SparseVector;

use crate::error::{SpaceError, SpaceResult};

pub(crate) const SPARSE_MAGIC: [u8; 4] = *b"WSPR";
pub(crate) const SPARSE_VERSION: u32 = 1;

/// Byte position of the offset table, right after magic, version and count.
pub(crate) const HEADER_LEN: usize = 12;

/// One vocabulary entry of a sparse store.
#[derive(Debug, Clone, PartialEq)]
pub struct WordRecord {
    /// Surface string, unique in the word space.
    pub word: String,
    /// Corpus occurrence count.
    pub freq: u64,
    /// Feature keys with their significance scores, in stored order.
    pub features: Vec<(String, f32)>,
    /// Neighbour words with similarities, best first. Empty on COL stores.
    pub neighbours: Vec<(String, f32)>,
}

impl WordRecord {
    /// The feature list as a sparse vector.
    pub fn feature_vector(&self) -> SparseVector {
        SparseVector::from_entries(self.features.iter().cloned())
    }
}

fn truncated(what: &str) -> SpaceError {
    SpaceError::CorruptIndex {
        message: format!("truncated record: {}", what),
    }
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    debug_assert!(bytes.len() <= u16::MAX as usize);
    out.write_u16::<LittleEndian>(bytes.len() as u16).unwrap();
    out.extend_from_slice(bytes);
}

fn read_str(cursor: &mut Cursor<&[u8]>, what: &str) -> SpaceResult<String> {
    let len = cursor.read_u16::<LittleEndian>().map_err(|_| truncated(what))? as usize;
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf).map_err(|_| truncated(what))?;
    String::from_utf8(buf).map_err(|_| SpaceError::CorruptIndex {
        message: format!("invalid UTF-8 in {}", what),
    })
}

/// Append the file header (without offsets) to `out`.
pub(crate) fn write_header(out: &mut Vec<u8>, count: u32) {
    out.extend_from_slice(&SPARSE_MAGIC);
    out.write_u32::<LittleEndian>(SPARSE_VERSION).unwrap();
    out.write_u32::<LittleEndian>(count).unwrap();
}

/// Append one encoded record to `out`.
pub(crate) fn encode_record(out: &mut Vec<u8>, record: &WordRecord) {
    write_str(out, &record.word);
    out.write_u64::<LittleEndian>(record.freq).unwrap();
    out.write_u32::<LittleEndian>(record.features.len() as u32).unwrap();
    for (key, sig) in &record.features {
        write_str(out, key);
        out.write_f32::<LittleEndian>(*sig).unwrap();
    }
    out.write_u32::<LittleEndian>(record.neighbours.len() as u32).unwrap();
    for (word, sim) in &record.neighbours {
        write_str(out, word);
        out.write_f32::<LittleEndian>(*sim).unwrap();
    }
}

/// Decode the record starting at `offset`.
pub(crate) fn decode_record(bytes: &[u8], offset: u64) -> SpaceResult<WordRecord> {
    if offset as usize >= bytes.len() {
        return Err(SpaceError::CorruptIndex {
            message: format!("record offset {} beyond file end {}", offset, bytes.len()),
        });
    }
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(offset);

    let word = read_str(&mut cursor, "word")?;
    let freq = cursor
        .read_u64::<LittleEndian>()
        .map_err(|_| truncated("freq"))?;

    let nkol = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| truncated("feature count"))? as usize;
    let mut features = Vec::with_capacity(nkol);
    for _ in 0..nkol {
        let key = read_str(&mut cursor, "feature key")?;
        let sig = cursor
            .read_f32::<LittleEndian>()
            .map_err(|_| truncated("feature significance"))?;
        features.push((key, sig));
    }

    let nsim = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| truncated("neighbour count"))? as usize;
    let mut neighbours = Vec::with_capacity(nsim);
    for _ in 0..nsim {
        let word = read_str(&mut cursor, "neighbour word")?;
        let sim = cursor
            .read_f32::<LittleEndian>()
            .map_err(|_| truncated("neighbour similarity"))?;
        neighbours.push((word, sim));
    }

    Ok(WordRecord {
        word,
        freq,
        features,
        neighbours,
    })
}

/// Validate magic, version and checksum; return the record offset table.
pub(crate) fn validate(bytes: &[u8]) -> SpaceResult<Vec<u64>> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(SpaceError::CorruptIndex {
            message: "record file too short".to_string(),
        });
    }
    if bytes[0..4] != SPARSE_MAGIC {
        return Err(SpaceError::CorruptIndex {
            message: "invalid magic bytes".to_string(),
        });
    }
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(4);
    let version = cursor.read_u32::<LittleEndian>().unwrap();
    if version != SPARSE_VERSION {
        return Err(SpaceError::CorruptIndex {
            message: format!("unsupported format version {}", version),
        });
    }
    let count = cursor.read_u32::<LittleEndian>().unwrap() as usize;

    let stored_crc = u32::from_le_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
    let actual_crc = crc32fast::hash(&bytes[..bytes.len() - 4]);
    if stored_crc != actual_crc {
        return Err(SpaceError::CorruptIndex {
            message: format!("checksum mismatch: stored {:#x}, computed {:#x}", stored_crc, actual_crc),
        });
    }

    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| truncated("offset table"))?;
        offsets.push(offset);
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> WordRecord {
        WordRecord {
            word: "haus".to_string(),
            freq: 42,
            features: vec![("garten".to_string(), 1.5), ("tür\u{F8FF}-1".to_string(), 0.25)],
            neighbours: vec![("gebäude".to_string(), 0.9), ("hütte".to_string(), 0.7)],
        }
    }

    #[test]
    fn test_record_roundtrip() {
        let record = sample_record();
        let mut bytes = Vec::new();
        encode_record(&mut bytes, &record);
        let decoded = decode_record(&bytes, 0).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_truncated_record() {
        let record = sample_record();
        let mut bytes = Vec::new();
        encode_record(&mut bytes, &record);
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(
            decode_record(&bytes, 0),
            Err(SpaceError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_magic() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, 0);
        bytes[0] = b'X';
        let crc = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        assert!(matches!(
            validate(&bytes),
            Err(SpaceError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_checksum() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, 0);
        bytes.extend_from_slice(&0xdeadbeefu32.to_le_bytes());
        assert!(matches!(
            validate(&bytes),
            Err(SpaceError::CorruptIndex { .. })
        ));
    }
}
