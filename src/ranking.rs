use std::cmp::Ordering;

use crate::{entry::WordEntry, index::Index};

/// Orders a word's concepts by estimated relevance to an anchor word.
///
/// The score reads the index's live global statistics, which keep moving
/// while indexing proceeds, so an ordering is only meaningful "as of now".
/// Extract ranked concepts through
/// [`Index::ranked_concepts`](crate::Index::ranked_concepts), which
/// re-ranks on every read instead of trusting any stored order.
pub struct ConceptRanker<'a> {
    index: &'a Index,
    anchor: &'a WordEntry,
}

impl<'a> ConceptRanker<'a> {
    /// Bind a ranker to an anchor entry cached in `index`.
    pub fn new(index: &'a Index, anchor: &'a WordEntry) -> Self {
        Self { index, anchor }
    }

    /// Relevance of `word` to the anchor: co-occurrence strength weighted
    /// by augmented term frequency and inverse document frequency.
    ///
    /// Before any word has been recorded there is no most-frequent entry
    /// and every score is 0, so all comparisons are equal. A word that
    /// never co-occurred with the anchor scores 0 regardless of its other
    /// statistics; a word never counted into any document has maximal idf.
    pub fn score(&self, word: &str) -> f64 {
        let Some((_, most_frequent_count)) = self.index.most_frequent()
        else {
            return 0.0;
        };
        if most_frequent_count == 0 {
            return 0.0;
        }

        let mutual = self.anchor.mutual_occurrences_with(word);
        if mutual == 0.0 {
            return 0.0;
        }

        let (occurrences, documents) = match self.index.entry(word) {
            Some(entry) => (entry.occurrences as f64, entry.documents as f64),
            None => (0.0, 0.0),
        };

        let tf = 0.5 + 0.5 * occurrences / most_frequent_count as f64;
        let idf = if documents == 0.0 {
            f64::INFINITY
        } else {
            self.index.document_count() as f64 / documents
        };

        mutual * tf * idf
    }

    /// Descending by score: the better-scoring word sorts first.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.score(b).total_cmp(&self.score(a))
    }
}
