//! Out-of-vocabulary embedding synthesis from character n-grams.

use crate::dense::DenseSpace;
use crate::ngram;

/// Reconstruct a vector for an out-of-vocabulary word.
///
/// The word is padded with the boundary markers, all n-grams in the config
/// range are extracted, and the stored vectors of those present in the
/// n-gram table are summed. When no n-gram matches, the result is the zero
/// vector; callers who care about the difference between "absent" and
/// "zero" check vocabulary membership first.
pub(crate) fn oov_vector(space: &DenseSpace, word: &str) -> Vec<f32> {
    let mut sum = vec![0.0f32; space.dimension()];
    let min_n = space.config().min_ngram as usize;
    let max_n = space.config().max_ngram as usize;

    for gram in ngram::padded_ngrams(word, min_n, max_n) {
        if let Some(row) = space.ngram_row(&gram) {
            for (s, x) in sum.iter_mut().zip(row.iter()) {
                *s += x;
            }
        }
    }
    sum
}
