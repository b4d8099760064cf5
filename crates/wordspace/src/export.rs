//! Export writers: word-frequency lists and CLUTO graph/matrix files.
//!
//! Bulk exports skip entries that fail to decode and report the tally
//! instead of aborting the whole run; everything else propagates.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{SpaceError, SpaceResult};
use crate::space::WordSpace;

/// File name of the CLUTO graph export.
pub const CLUTO_GRAPH_FILE: &str = "sparseGraph.dat";

/// File name of the CLUTO matrix export.
pub const CLUTO_MATRIX_FILE: &str = "sparseMatrix.dat";

/// File name of the row-label companion file of both CLUTO exports.
pub const CLUTO_LABELS_FILE: &str = "rowLabels.dat";

/// Outcome of a bulk export: entries written and entries skipped over
/// per-entry failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportTally {
    pub written: u64,
    pub skipped: u64,
}

/// Write one `word<TAB>frequency` line per vocabulary entry, UTF-8,
/// unsorted.
pub fn word_frequency_list(space: &WordSpace, path: &Path) -> SpaceResult<ExportTally> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut tally = ExportTally::default();

    for id in 0..space.number_of_words() {
        match frequency_entry(space, id) {
            Ok(Some((word, freq))) => {
                writeln!(out, "{}\t{}", word, freq)?;
                tally.written += 1;
            }
            Ok(None) => continue,
            Err(e) => {
                tally.skipped += 1;
                log::warn!("entry {} skipped in frequency list: {}", id, e);
            }
        }
    }

    out.flush()?;
    if tally.skipped > 0 {
        log::warn!("word-frequency list skipped {} entries", tally.skipped);
    }
    Ok(tally)
}

fn frequency_entry(space: &WordSpace, id: usize) -> SpaceResult<Option<(String, u64)>> {
    let Some(word) = space.word_by_id(id)? else {
        return Ok(None);
    };
    let freq = space.frequency(&word)?;
    Ok(Some((word, freq)))
}

/// Export the neighbourhood graph of the first `n` vocabulary words in
/// CLUTO sparse-graph format.
///
/// `sparseGraph.dat` holds one line per word with space-separated
/// `neighbourId similarity` pairs, keeping only neighbours with similarity
/// at least `min_sim` that are themselves among the first `n` words.
/// Neighbour ids are 1-based positions in the first-`n` iteration order;
/// `rowLabels.dat` lists the corresponding words. Rejects COL spaces.
pub fn cluto_sparse_graph(
    space: &WordSpace,
    out_dir: &Path,
    n: usize,
    min_sim: f32,
) -> SpaceResult<ExportTally> {
    space.require_sim("cluto_sparse_graph")?;
    let n = n.min(space.number_of_words());

    let mut graph = BufWriter::new(File::create(out_dir.join(CLUTO_GRAPH_FILE))?);
    let mut labels = BufWriter::new(File::create(out_dir.join(CLUTO_LABELS_FILE))?);
    let mut tally = ExportTally::default();

    for id in 0..n {
        let row = space
            .word_by_id(id)
            .and_then(|word| Ok((word, space.neighbours_by_id(id)?)));
        match row {
            Ok((Some(word), neighbours)) => {
                writeln!(labels, "{}", word)?;
                let mut first = true;
                for (nid, sim) in neighbours {
                    if sim < min_sim || nid as usize >= n {
                        continue;
                    }
                    if !first {
                        write!(graph, " ")?;
                    }
                    write!(graph, "{} {}", nid + 1, sim)?;
                    first = false;
                }
                writeln!(graph)?;
                tally.written += 1;
            }
            Ok((None, _)) => continue,
            Err(e) => {
                tally.skipped += 1;
                log::warn!("entry {} skipped in graph export: {}", id, e);
            }
        }
    }

    graph.flush()?;
    labels.flush()?;
    Ok(tally)
}

/// Export the feature vectors of a sparse store in CLUTO sparse-matrix
/// format.
///
/// `sparseMatrix.dat` holds one line per word with space-separated
/// `featureId value` pairs; feature ids are 1-based and interned in
/// first-use order across the whole export. `rowLabels.dat` lists the
/// words. Sparse back-end only.
pub fn cluto_sparse_matrix(space: &WordSpace, out_dir: &Path) -> SpaceResult<ExportTally> {
    let Some(sparse) = space.as_sparse() else {
        return Err(SpaceError::WrongSpaceType {
            operation: "cluto_sparse_matrix",
            kind: space.kind(),
        });
    };

    let mut matrix = BufWriter::new(File::create(out_dir.join(CLUTO_MATRIX_FILE))?);
    let mut labels = BufWriter::new(File::create(out_dir.join(CLUTO_LABELS_FILE))?);
    let mut feature_ids: HashMap<String, usize> = HashMap::new();
    let mut tally = ExportTally::default();

    for id in 0..sparse.len() {
        match sparse.record_by_id(id) {
            Ok(Some(record)) => {
                writeln!(labels, "{}", record.word)?;
                let mut first = true;
                for (key, value) in &record.features {
                    let next_id = feature_ids.len() + 1;
                    let fid = *feature_ids.entry(key.clone()).or_insert(next_id);
                    if !first {
                        write!(matrix, " ")?;
                    }
                    write!(matrix, "{} {}", fid, value)?;
                    first = false;
                }
                writeln!(matrix)?;
                tally.written += 1;
            }
            Ok(None) => continue,
            Err(e) => {
                tally.skipped += 1;
                log::warn!("entry {} skipped in matrix export: {}", id, e);
            }
        }
    }

    matrix.flush()?;
    labels.flush()?;
    Ok(tally)
}
