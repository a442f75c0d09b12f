use crate::index::Index;

/// Rate the semantic similarity of two word lists against an index.
///
/// Every cross pair `(w1, w2)` contributes the pair's co-occurrence weight,
/// discounted by how common its words are — `1 / (1 + occurrences(w1) +
/// occurrences(w2))` — so very frequent words cannot dominate the score.
/// The result is the discounted average over all contributing pairs.
///
/// Pairs whose raw strings are identical are skipped, as are tokens that
/// normalize to nothing (they have no entry). Entries are created as needed;
/// these lookups do not count as an indexing pass. When no pair contributes
/// (empty lists, or everything skipped) the score is 0.0, never NaN.
pub fn rate<S: AsRef<str>>(
    index: &mut Index,
    words1: &[S],
    words2: &[S],
) -> f64 {
    let mut sum = 0.0;
    let mut normalizer = 0.0;

    for w1 in words1 {
        for w2 in words2 {
            let (w1, w2) = (w1.as_ref(), w2.as_ref());
            if w1 == w2 {
                continue;
            }

            let Some(occ1) = index.lookup(w1, false).map(|e| e.occurrences)
            else {
                continue;
            };
            let Some(occ2) = index.lookup(w2, false).map(|e| e.occurrences)
            else {
                continue;
            };

            let discount = 1.0 / (1.0 + (occ1 + occ2) as f64);
            sum += index.pairwise_weight(w1, w2) * discount;
            normalizer += discount;
        }
    }

    if normalizer == 0.0 {
        0.0
    } else {
        sum / normalizer
    }
}
