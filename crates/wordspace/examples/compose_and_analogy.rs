//! Phrase composition and analogy completion against a dense word space.
//!
//! ```sh
//! cargo run --example compose_and_analogy -- <dense-image>
//! ```

use std::env;
use std::path::Path;
use std::process::ExitCode;

use wordspace::compose::{self, Composition};
use wordspace::prelude::*;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: compose_and_analogy <dense-image>");
        return ExitCode::FAILURE;
    }

    let space = match WordSpace::load(Path::new(&args[1])) {
        Ok(space) => space,
        Err(e) => {
            eprintln!("cannot open {}: {}", args[1], e);
            return ExitCode::FAILURE;
        }
    };

    let phrase1 = "strong coffee";
    let phrase2 = "powerful espresso";
    match compose::text_comparison(
        &space,
        phrase1,
        phrase2,
        Composition::Addition,
        Measure::Cosine,
    ) {
        Ok(Some(sim)) => println!("sim(\"{}\", \"{}\") = {:.4}", phrase1, phrase2, sim),
        Ok(None) => println!("one of the phrases cannot be composed from this vocabulary"),
        Err(e) => {
            eprintln!("composition failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match compose::solve_analogy(&space, "woman", "king", "man") {
        Ok(Some(candidates)) => {
            println!("king - man + woman =");
            for (word, sim) in candidates.iter().take(5) {
                println!("  {}\t{:.4}", word, sim);
            }
        }
        Ok(None) => println!("analogy words not all in vocabulary"),
        Err(e) => {
            eprintln!("analogy failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
