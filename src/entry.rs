use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Recommended token-distance window for co-occurrence.
///
/// The index itself does not enforce a radius; the corpus walker decides
/// which lookups are close enough to [`join`](crate::Index::join). This is
/// the window the scoring model was tuned for.
pub const MAX_SEARCH_RADIUS: usize = 3;

/// Cached/persisted statistics for one normalized word.
///
/// Entries are owned by the index registry while cached and reference other
/// words only by their normalized string, never by handle — the registry is
/// free to drop or replace an entry without dangling anything.
///
/// This struct is also the on-disk record: every field serializes into the
/// word's entry file. Concept ranking is derived state and is recomputed
/// from live index statistics on every read (see
/// [`Index::ranked_concepts`](crate::Index::ranked_concepts)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    /// Raw appearances across the corpus.
    pub occurrences: u64,
    /// Distinct documents the word appeared in.
    pub documents: u64,
    /// Co-occurrence counts with other words, symmetric across entries.
    pub mutual_occurrences: HashMap<String, f64>,
    /// Documents in which both words co-occurred, at most +1 per unordered
    /// pair per document.
    pub mutual_documents: HashMap<String, f64>,
    /// Related words, deduplicated. Unordered in memory and on disk.
    pub concepts: HashSet<String>,
}

impl WordEntry {
    /// A zero-valued entry for an already-normalized word.
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            occurrences: 0,
            documents: 0,
            mutual_occurrences: HashMap::new(),
            mutual_documents: HashMap::new(),
            concepts: HashSet::new(),
        }
    }

    /// Co-occurrence count with `other`, 0.0 when the words never co-occurred.
    pub fn mutual_occurrences_with(&self, other: &str) -> f64 {
        self.mutual_occurrences.get(other).copied().unwrap_or(0.0)
    }

    /// Mutual-document count with `other`, 0.0 when absent.
    pub fn mutual_documents_with(&self, other: &str) -> f64 {
        self.mutual_documents.get(other).copied().unwrap_or(0.0)
    }

    /// Closeness of two entries: their mutual occurrences relative to the
    /// words' combined raw frequency.
    ///
    /// The mutual-document ratio is deliberately not folded into the score;
    /// weighting by it changes ranking semantics materially. Returns 0.0
    /// when neither word has been seen, never NaN or infinity.
    pub fn closeness(a: &WordEntry, b: &WordEntry) -> f64 {
        let total = (a.occurrences + b.occurrences) as f64;
        if total == 0.0 {
            return 0.0;
        }
        a.mutual_occurrences_with(&b.word) / total
    }
}

/// Normalize a raw token: strip everything outside `[A-Za-z]`, lowercase.
///
/// Returns `None` when nothing remains — such a token has no entry and no
/// statistics. Idempotent.
///
/// # Examples
///
/// ```
/// use wordmesh::normalize;
///
/// assert_eq!(normalize("Saw-tooth!"), Some("sawtooth".to_string()));
/// assert_eq!(normalize("42"), None);
/// ```
pub fn normalize(raw: &str) -> Option<String> {
    let word: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!word.is_empty()).then_some(word)
}
