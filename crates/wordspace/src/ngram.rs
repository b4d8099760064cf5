//! Character n-gram extraction.
//!
//! N-grams are computed on Unicode scalar values (`char`), not bytes, so
//! multi-byte letters count as one position. For subword lookup the word is
//! first padded with the boundary markers `<` and `>`.

/// Marker prepended to a word before n-gram extraction.
pub const BOUNDARY_BEGIN: char = '<';

/// Marker appended to a word before n-gram extraction.
pub const BOUNDARY_END: char = '>';

/// All contiguous substrings of `word` with exactly `n` characters, in
/// left-to-right order of their start position.
///
/// Returns an empty list when `n` is 0 or larger than the word.
pub fn ngrams(word: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < n {
        return Vec::new();
    }
    (0..=chars.len() - n)
        .map(|start| chars[start..start + n].iter().collect())
        .collect()
}

/// All n-grams of the padded word for every length in `[min_n, max_n]`.
///
/// The word is wrapped in the boundary markers first, then n-grams are
/// emitted in order of increasing length and, within one length, by start
/// position. Empty input produces no output.
pub fn padded_ngrams(word: &str, min_n: usize, max_n: usize) -> Vec<String> {
    if word.is_empty() || min_n == 0 || max_n < min_n {
        return Vec::new();
    }
    let padded = format!("{}{}{}", BOUNDARY_BEGIN, word, BOUNDARY_END);
    let mut out = Vec::new();
    for n in min_n..=max_n {
        out.extend(ngrams(&padded, n));
    }
    out
}
