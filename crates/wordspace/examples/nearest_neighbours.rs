//! Open a word space and print the nearest neighbours of a query word.
//!
//! ```sh
//! cargo run --example nearest_neighbours -- <store-path> <word>
//! ```
//!
//! The store path may be a sparse store directory or a dense image file;
//! the back-end is auto-detected.

use std::env;
use std::path::Path;
use std::process::ExitCode;

use wordspace::prelude::*;
use wordspace::search;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: nearest_neighbours <store-path> <word>");
        return ExitCode::FAILURE;
    }
    let path = Path::new(&args[1]);
    let word = &args[2];

    let space = match WordSpace::load(path) {
        Ok(space) => space,
        Err(e) => {
            eprintln!("cannot open {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{} words, {} dimensions, {} space",
        space.number_of_words(),
        space.number_of_feature_words(),
        space.kind()
    );
    println!("frequency({}) = {}", word, space.frequency(word).unwrap_or(0));

    // Prefer the precomputed neighbour lists; fall back to an exhaustive
    // scan on COL spaces.
    let neighbours = match space.similar_words(word) {
        Ok(Some(list)) => list,
        Ok(None) => {
            eprintln!("'{}' is not in the vocabulary", word);
            return ExitCode::FAILURE;
        }
        Err(SpaceError::WrongSpaceType { .. }) => {
            let Ok(Some(query)) = space.vector_of(word) else {
                eprintln!("'{}' is not in the vocabulary", word);
                return ExitCode::FAILURE;
            };
            match search::nearest_neighbours(&space, &query, space.similarity_measure(), 20) {
                Ok(list) => list,
                Err(e) => {
                    eprintln!("scan failed: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        Err(e) => {
            eprintln!("neighbour lookup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for (neighbour, sim) in neighbours.iter().take(20) {
        println!("{}\t{:.4}", neighbour, sim);
    }
    ExitCode::SUCCESS
}
