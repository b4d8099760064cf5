//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;

use wordspace::dense::{DenseSpace, DenseSpaceBuilder};
use wordspace::sparse::writer::StoreWriter;
use wordspace::{Config, Measure, WordSpace};

/// Config of a SIM space with plausible corpus statistics.
pub fn sim_config(n_sim: u32) -> Config {
    let mut config = Config::default();
    config.dont_compute_2nd_order = false;
    config.number_of_similar_words = n_sim;
    config.min_freq = 10;
    config.max_freq = 1000;
    config.token_count = 100_000;
    config.similarity_measure = Measure::Cosine;
    config
}

/// Config of a COL space.
pub fn col_config() -> Config {
    let mut config = Config::default();
    config.dont_compute_2nd_order = true;
    config.min_freq = 10;
    config.max_freq = 1000;
    config.token_count = 100_000;
    config
}

/// Three colour words with literal 4-dimensional vectors and two stored
/// neighbours per word; the third word's list is shorter than the matrix
/// width, so it exercises zero-termination.
pub fn colour_space() -> DenseSpace {
    let mut builder = DenseSpaceBuilder::new(sim_config(2));
    let blau = builder.add_word("blau", 120, vec![0.1, 0.2, 0.3, 0.4]);
    let gruen = builder.add_word("grün", 80, vec![0.2, 0.2, 0.1, 0.4]);
    let rot = builder.add_word("rot", 260, vec![0.9, 0.1, 0.0, 0.2]);
    builder.set_neighbours(blau, vec![(gruen as u32, 0.8), (rot as u32, 0.3)]);
    builder.set_neighbours(gruen, vec![(blau as u32, 0.8), (rot as u32, 0.4)]);
    builder.set_neighbours(rot, vec![(gruen as u32, 0.4)]);
    builder.build().unwrap()
}

/// Royal-analogy space: `king - man + woman` lands exactly on `queen`.
pub fn royal_space() -> DenseSpace {
    let mut builder = DenseSpaceBuilder::new(col_config());
    builder.add_word("man", 900, vec![1.0, 0.0, 0.0, 0.0]);
    builder.add_word("woman", 850, vec![0.0, 1.0, 0.0, 0.0]);
    builder.add_word("king", 300, vec![1.0, 0.0, 1.0, 0.0]);
    builder.add_word("queen", 120, vec![0.0, 1.0, 1.0, 0.0]);
    builder.add_word("apple", 400, vec![0.0, 0.0, 0.0, 1.0]);
    builder.build().unwrap()
}

/// A ring of `count` words with unit vectors spread over the circle and
/// each word's stored neighbours being its `width` nearest ring positions.
/// Large enough rings make the graph walk take real steps.
pub fn ring_space(count: usize, width: usize) -> DenseSpace {
    let mut builder = DenseSpaceBuilder::new(sim_config(2 * width as u32));
    for i in 0..count {
        let theta = 2.0 * std::f32::consts::PI * i as f32 / count as f32;
        builder.add_word(&format!("w{:04}", i), 50 + i as u64, vec![theta.cos(), theta.sin()]);
    }
    for i in 0..count {
        let mut neighbours = Vec::new();
        for step in 1..=width {
            let sim = 1.0 - step as f32 / (width + 1) as f32;
            neighbours.push((((i + step) % count) as u32, sim));
            neighbours.push((((i + count - step) % count) as u32, sim - 0.01));
        }
        builder.set_neighbours(i, neighbours);
    }
    builder.build().unwrap()
}

/// A directed chain `w0 -> w1 -> ... -> w(n-1)` with back edges, for
/// shortest-path tests.
pub fn chain_space(count: usize) -> DenseSpace {
    let mut builder = DenseSpaceBuilder::new(sim_config(2));
    for i in 0..count {
        builder.add_word(&format!("w{}", i), 10, vec![i as f32, 1.0]);
    }
    for i in 0..count {
        let mut neighbours = Vec::new();
        if i + 1 < count {
            neighbours.push(((i + 1) as u32, 0.9));
        }
        if i > 0 {
            neighbours.push(((i - 1) as u32, 0.8));
        }
        builder.set_neighbours(i, neighbours);
    }
    builder.build().unwrap()
}

/// Write the sparse house-themed fixture store under `dir`.
///
/// Feature keys cover all three forms: plain words, relation-marked pairs,
/// and pure integer ids.
pub fn write_house_store(dir: &Path, sim: bool) {
    let mut config = if sim { sim_config(3) } else { col_config() };
    config.number_feature_words = 4;
    config.stopwords = vec!["der".to_string(), "die".to_string(), "das".to_string()];
    let mut writer = StoreWriter::new(dir, config);

    let rel = '\u{F8FF}';
    writer.add(
        "haus",
        120,
        vec![
            (format!("tür{}OBJ", rel), 2.0),
            ("garten".to_string(), 1.5),
            (format!("tür{}SUBJ", rel), 0.5),
            ("42".to_string(), 0.25),
        ],
        if sim {
            vec![("gebäude".to_string(), 0.9), ("hütte".to_string(), 0.7)]
        } else {
            vec![]
        },
    );
    writer.add(
        "gebäude",
        45,
        vec![("garten".to_string(), 0.5), (format!("tür{}OBJ", rel), 1.0)],
        if sim {
            vec![("haus".to_string(), 0.9), ("hütte".to_string(), 0.5)]
        } else {
            vec![]
        },
    );
    writer.add(
        "hütte",
        30,
        vec![("garten".to_string(), 2.5), ("wald".to_string(), 1.0)],
        if sim {
            vec![("haus".to_string(), 0.7), ("gebäude".to_string(), 0.5)]
        } else {
            vec![]
        },
    );
    writer.add(
        "garten",
        200,
        vec![("haus".to_string(), 1.5), ("wald".to_string(), 0.5)],
        if sim {
            vec![("wald".to_string(), 0.6)]
        } else {
            vec![]
        },
    );
    writer.add(
        "wald",
        310,
        vec![("garten".to_string(), 0.5)],
        if sim {
            vec![("garten".to_string(), 0.6)]
        } else {
            vec![]
        },
    );
    writer.finish().unwrap();
}

/// Open the house fixture as a unified handle.
pub fn open_house_space(dir: &Path, sim: bool, resident: bool) -> WordSpace {
    write_house_store(dir, sim);
    WordSpace::open(dir, resident).unwrap()
}
