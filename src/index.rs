use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::{
    entry::{self, WordEntry},
    entry_store::EntryStore,
    error::Result,
    index_dir::IndexDir,
    ranking::ConceptRanker,
    stats_db::StatsDb,
};

/// Per-document guard for mutual-document counting.
///
/// A word pair's mutual-document count may grow at most once per document.
/// The corpus walker creates one guard per document via
/// [`Index::begin_document`] and passes it to every [`Index::join`] call for
/// that document.
#[derive(Debug, Default)]
pub struct SeenPairs {
    pairs: HashSet<(String, String)>,
}

impl SeenPairs {
    /// True exactly once per unordered pair.
    fn first_sighting(&mut self, a: &str, b: &str) -> bool {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        self.pairs.insert(key)
    }
}

/// The registry of cached word entries plus global corpus statistics and
/// their backing storage.
///
/// All mutation goes through `&mut self`: the registry, the most-frequent
/// pointer and the document count have a single logical writer, enforced at
/// compile time. Entries live in the registry for the lifetime of the index
/// once cached; there is no eviction, only explicit [`delete`](Self::delete).
pub struct Index {
    dir: IndexDir,
    store: EntryStore,
    stats: StatsDb,
    entries: HashMap<String, WordEntry>,
    document_count: u64,
    most_frequent: Option<(String, u64)>,
}

impl Index {
    /// Open (or create) the index rooted at `dir`, restoring the global
    /// statistics written by the last [`commit`](Self::commit).
    pub fn open(dir: &IndexDir) -> Result<Self> {
        let store = EntryStore::open(&dir.entries_dir()?)?;
        let stats = StatsDb::open(&dir.stats_db())?;
        let document_count = stats.document_count()?;
        let most_frequent = stats.most_frequent()?;

        Ok(Self {
            dir: dir.clone(),
            store,
            stats,
            entries: HashMap::new(),
            document_count,
            most_frequent,
        })
    }

    pub fn index_dir(&self) -> &IndexDir {
        &self.dir
    }

    /// Total number of indexed documents.
    pub fn document_count(&self) -> u64 {
        self.document_count
    }

    /// The globally most frequent word and its occurrence count.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.most_frequent.as_ref().map(|(w, c)| (w.as_str(), *c))
    }

    /// The cached entry for a token, read-only. Does not touch disk.
    pub fn entry(&self, raw: &str) -> Option<&WordEntry> {
        let word = entry::normalize(raw)?;
        self.entries.get(&word)
    }

    /// Start indexing a new document: bumps the document count and hands
    /// out a fresh per-document pair guard for [`join`](Self::join).
    pub fn begin_document(&mut self) -> SeenPairs {
        self.document_count += 1;
        SeenPairs::default()
    }

    /// Look up the entry for a raw token, normalizing first.
    ///
    /// Registry hits return the cached entry without touching disk. Misses
    /// load the persisted entry file when one exists and fall back to a
    /// fresh zero-valued entry otherwise; a malformed file is logged and
    /// treated like a missing one. When `indexing` is true and the entry
    /// was not already cached, its document count is incremented.
    ///
    /// Returns `None` only when the token normalizes to nothing.
    pub fn lookup(
        &mut self,
        raw: &str,
        indexing: bool,
    ) -> Option<&mut WordEntry> {
        let word = entry::normalize(raw)?;

        if !self.entries.contains_key(&word) {
            let mut loaded = match self.store.load(&word) {
                Ok(Some(entry)) => entry,
                Ok(None) => WordEntry::new(word.clone()),
                Err(e) => {
                    warn!(
                        word = %word,
                        error = %e,
                        "could not load word entry, starting fresh"
                    );
                    WordEntry::new(word.clone())
                }
            };
            if indexing {
                loaded.documents += 1;
            }
            self.entries.insert(word.clone(), loaded);
        }

        self.entries.get_mut(&word)
    }

    /// Record one raw appearance of a token, keeping the most-frequent
    /// pointer current. A token that normalizes to nothing records nothing.
    pub fn record(&mut self, raw: &str) {
        let Some(entry) = self.lookup(raw, false) else {
            return;
        };
        entry.occurrences += 1;
        let occurrences = entry.occurrences;
        let word = entry.word.clone();

        if let Some((current, count)) = &mut self.most_frequent {
            if *current == word {
                *count = occurrences;
            } else if occurrences > *count {
                *current = word;
                *count = occurrences;
            }
        } else {
            self.most_frequent = Some((word, occurrences));
        }
    }

    /// Join two tokens observed within the search radius.
    ///
    /// Increments mutual occurrences symmetrically by 1.0 and adds each
    /// word to the other's concept set. The first sighting of the unordered
    /// pair in `seen` also increments mutual documents symmetrically.
    ///
    /// Joining a word with itself, or a token that normalizes to nothing,
    /// is a no-op.
    pub fn join(&mut self, raw1: &str, raw2: &str, seen: &mut SeenPairs) {
        let Some(w1) = entry::normalize(raw1) else {
            return;
        };
        let Some(w2) = entry::normalize(raw2) else {
            return;
        };
        if w1 == w2 {
            return;
        }

        // Both entries must exist before cross-linking them.
        self.lookup(&w1, false);
        self.lookup(&w2, false);

        let first_sighting = seen.first_sighting(&w1, &w2);

        for (this, other) in [(&w1, &w2), (&w2, &w1)] {
            let Some(entry) = self.entries.get_mut(this.as_str()) else {
                continue;
            };
            *entry
                .mutual_occurrences
                .entry(other.to_string())
                .or_insert(0.0) += 1.0;
            entry.concepts.insert(other.to_string());
            if first_sighting {
                *entry
                    .mutual_documents
                    .entry(other.to_string())
                    .or_insert(0.0) += 1.0;
            }
        }
    }

    /// Symmetric co-occurrence weight of two tokens: the closeness of
    /// their entries. Entries are created as needed; tokens without an
    /// entry weigh 0.
    pub fn pairwise_weight(&mut self, raw1: &str, raw2: &str) -> f64 {
        let (Some(w1), Some(w2)) =
            (entry::normalize(raw1), entry::normalize(raw2))
        else {
            return 0.0;
        };
        self.lookup(&w1, false);
        self.lookup(&w2, false);

        let (Some(a), Some(b)) = (self.entries.get(&w1), self.entries.get(&w2))
        else {
            return 0.0;
        };
        WordEntry::closeness(a, b)
    }

    /// The concepts related to a token, best first under the live global
    /// statistics.
    ///
    /// The tf/idf terms read statistics that keep moving while indexing
    /// proceeds, so no stored ordering would stay correct; the ranking is
    /// recomputed on every read.
    pub fn ranked_concepts(&mut self, raw: &str) -> Vec<String> {
        let Some(word) = entry::normalize(raw) else {
            return Vec::new();
        };

        let mut concepts: Vec<String> = match self.lookup(&word, false) {
            Some(entry) => entry.concepts.iter().cloned().collect(),
            None => return Vec::new(),
        };

        // Scores must see real counts: cache every concept's entry first.
        for concept in &concepts {
            self.lookup(concept, false);
        }

        let Some(anchor) = self.entries.get(&word) else {
            return concepts;
        };
        let ranker = ConceptRanker::new(self, anchor);
        concepts.sort_by(|a, b| ranker.compare(a, b));
        concepts
    }

    /// Persist every cached entry and the global statistics.
    ///
    /// An entry that fails to write is logged and skipped — it stays
    /// cached, and the data is lost only if the process exits before a
    /// later commit succeeds. Statistics failures are real errors.
    pub fn commit(&self) -> Result<()> {
        for entry in self.entries.values() {
            if let Err(e) = self.store.store(entry) {
                warn!(
                    word = %entry.word,
                    error = %e,
                    "could not save word entry"
                );
            }
        }

        self.stats.set_document_count(self.document_count)?;
        if let Some((word, count)) = &self.most_frequent {
            self.stats.set_most_frequent(word, *count)?;
        }
        Ok(())
    }

    /// Delete a word from the index entirely.
    ///
    /// Scrubs the word from every other cached entry's mutual occurrences
    /// and concept set, removes its entry file, and drops it from the
    /// registry. Entries that are only on disk keep their stale references;
    /// they are not rehydrated here. Deleting an unknown word is a no-op.
    pub fn delete(&mut self, raw: &str) {
        let Some(word) = entry::normalize(raw) else {
            return;
        };

        for entry in self.entries.values_mut() {
            if entry.word != word {
                entry.mutual_occurrences.remove(&word);
                entry.concepts.remove(&word);
            }
        }

        if let Err(e) = self.store.remove(&word) {
            warn!(word = %word, error = %e, "could not remove word entry file");
        }

        self.entries.remove(&word);
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("root", &self.dir.root())
            .field("cached_entries", &self.entries.len())
            .field("document_count", &self.document_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_index() -> (tempfile::TempDir, Index) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = IndexDir::resolve(Some(tmp.path())).unwrap();
        let index = Index::open(&dir).unwrap();
        (tmp, index)
    }

    #[test]
    fn lookup_normalizes_and_caches() {
        let (_tmp, mut index) = test_index();

        let entry = index.lookup("Cat!", false).unwrap();
        assert_eq!(entry.word, "cat");

        entry.occurrences = 3;
        assert_eq!(index.lookup("cat", false).unwrap().occurrences, 3);
    }

    #[test]
    fn lookup_empty_token_is_none() {
        let (_tmp, mut index) = test_index();

        assert!(index.lookup("1234", false).is_none());
        assert!(index.lookup("", true).is_none());
    }

    #[test]
    fn indexing_lookup_counts_documents_on_cache_miss_only() {
        let (_tmp, mut index) = test_index();

        index.lookup("cat", true);
        index.lookup("cat", true);
        index.lookup("cat", false);

        assert_eq!(index.entry("cat").unwrap().documents, 1);
    }

    #[test]
    fn pure_read_lookup_never_counts_documents() {
        let (_tmp, mut index) = test_index();

        index.lookup("cat", false);
        assert_eq!(index.entry("cat").unwrap().documents, 0);
    }

    #[test]
    fn record_tracks_most_frequent() {
        let (_tmp, mut index) = test_index();

        for _ in 0..3 {
            index.record("apple");
        }
        for _ in 0..7 {
            index.record("banana");
        }
        for _ in 0..5 {
            index.record("cherry");
        }

        assert_eq!(index.most_frequent(), Some(("banana", 7)));
        assert_eq!(index.entry("apple").unwrap().occurrences, 3);
        assert_eq!(index.entry("cherry").unwrap().occurrences, 5);
    }

    #[test]
    fn join_is_symmetric() {
        let (_tmp, mut index) = test_index();
        let mut seen = index.begin_document();

        index.join("cat", "dog", &mut seen);
        index.join("cat", "dog", &mut seen);

        let cat = index.entry("cat").unwrap();
        let dog = index.entry("dog").unwrap();
        assert_eq!(cat.mutual_occurrences_with("dog"), 2.0);
        assert_eq!(
            cat.mutual_occurrences_with("dog"),
            dog.mutual_occurrences_with("cat")
        );
        assert!(cat.concepts.contains("dog"));
        assert!(dog.concepts.contains("cat"));
    }

    #[test]
    fn join_with_self_is_a_noop() {
        let (_tmp, mut index) = test_index();
        let mut seen = index.begin_document();

        index.lookup("cat", false);
        let before = index.entry("cat").unwrap().clone();

        index.join("cat", "cat", &mut seen);
        index.join("cat", "Cat!", &mut seen);

        assert_eq!(*index.entry("cat").unwrap(), before);
    }

    #[test]
    fn mutual_documents_count_once_per_document() {
        let (_tmp, mut index) = test_index();

        let mut seen = index.begin_document();
        index.join("cat", "dog", &mut seen);
        index.join("cat", "dog", &mut seen);

        let cat = index.entry("cat").unwrap();
        assert_eq!(cat.mutual_occurrences_with("dog"), 2.0);
        assert_eq!(cat.mutual_documents_with("dog"), 1.0);

        let mut seen = index.begin_document();
        index.join("dog", "cat", &mut seen);

        let cat = index.entry("cat").unwrap();
        let dog = index.entry("dog").unwrap();
        assert_eq!(cat.mutual_documents_with("dog"), 2.0);
        assert_eq!(dog.mutual_documents_with("cat"), 2.0);
    }

    #[test]
    fn begin_document_increments_count() {
        let (_tmp, mut index) = test_index();

        assert_eq!(index.document_count(), 0);
        index.begin_document();
        index.begin_document();
        assert_eq!(index.document_count(), 2);
    }

    #[test]
    fn commit_then_reopen_restores_state() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = IndexDir::resolve(Some(tmp.path())).unwrap();

        {
            let mut index = Index::open(&dir).unwrap();
            let mut seen = index.begin_document();
            for token in ["cat", "cat", "dog"] {
                index.lookup(token, true);
                index.record(token);
            }
            index.join("cat", "dog", &mut seen);
            index.commit().unwrap();
        }

        {
            let mut index = Index::open(&dir).unwrap();
            assert_eq!(index.document_count(), 1);
            assert_eq!(index.most_frequent(), Some(("cat", 2)));

            let cat = index.lookup("cat", false).unwrap();
            assert_eq!(cat.occurrences, 2);
            assert_eq!(cat.documents, 1);
            assert_eq!(cat.mutual_occurrences_with("dog"), 1.0);
            assert_eq!(cat.mutual_documents_with("dog"), 1.0);
            assert!(cat.concepts.contains("dog"));
        }
    }

    #[test]
    fn malformed_entry_file_falls_back_to_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = IndexDir::resolve(Some(tmp.path())).unwrap();
        std::fs::write(dir.entries_dir().unwrap().join("cat.json"), b"garbage")
            .unwrap();

        let mut index = Index::open(&dir).unwrap();
        let entry = index.lookup("cat", false).unwrap();
        assert_eq!(entry.occurrences, 0);
        assert_eq!(entry.documents, 0);
    }

    #[test]
    fn delete_scrubs_cached_back_references() {
        let (_tmp, mut index) = test_index();
        let mut seen = index.begin_document();
        index.join("cat", "dog", &mut seen);
        index.join("cat", "fish", &mut seen);
        index.commit().unwrap();

        index.delete("cat");

        assert!(index.entry("cat").is_none());
        let dog = index.entry("dog").unwrap();
        assert_eq!(dog.mutual_occurrences_with("cat"), 0.0);
        assert!(!dog.concepts.contains("cat"));

        // Deleting again must not fail.
        index.delete("cat");
    }

    #[test]
    fn delete_removes_entry_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = IndexDir::resolve(Some(tmp.path())).unwrap();
        let mut index = Index::open(&dir).unwrap();

        index.lookup("cat", false);
        index.commit().unwrap();
        let path = dir.entries_dir().unwrap().join("cat.json");
        assert!(path.exists());

        index.delete("cat");
        assert!(!path.exists());

        // A reopened index must not resurrect the entry from disk.
        drop(index);
        let mut reopened = Index::open(&dir).unwrap();
        assert_eq!(reopened.lookup("cat", false).unwrap().occurrences, 0);
    }

    #[test]
    fn pairwise_weight_is_symmetric() {
        let (_tmp, mut index) = test_index();
        let mut seen = index.begin_document();
        index.join("cat", "dog", &mut seen);
        index.record("cat");
        index.record("dog");
        index.record("dog");

        let ab = index.pairwise_weight("cat", "dog");
        let ba = index.pairwise_weight("dog", "cat");
        assert_eq!(ab, 1.0 / 3.0);
        assert_eq!(ab, ba);
    }

    #[test]
    fn pairwise_weight_of_unrelated_words_is_zero() {
        let (_tmp, mut index) = test_index();

        assert_eq!(index.pairwise_weight("cat", "dog"), 0.0);
        assert_eq!(index.pairwise_weight("42", "dog"), 0.0);
    }
}
