//! wordmesh - a disk-backed word co-occurrence index for rating the
//! semantic similarity of word lists.
//!
//! wordmesh keeps one statistics entry per normalized word: raw occurrence
//! and document counts, plus symmetric co-occurrence counts against every
//! other word it has been seen near. Entries are cached in memory and
//! persisted one file per word under the index directory. A corpus walker
//! feeds the index through [`Index::lookup`], [`Index::record`] and
//! [`Index::join`]; at query time [`rate`] scores two arbitrary word lists
//! against the accumulated statistics, and [`Index::ranked_concepts`]
//! lists the words most related to an anchor word.
//!
//! # Quick start
//!
//! ```
//! # let tmp = tempfile::tempdir().unwrap();
//! use wordmesh::{Index, IndexDir, rate};
//!
//! let dir = IndexDir::resolve(Some(tmp.path())).unwrap();
//! let mut index = Index::open(&dir).unwrap();
//!
//! // One document: record every token, join tokens seen near each other.
//! let tokens = ["the", "cat", "sat"];
//! let mut seen = index.begin_document();
//! for token in tokens {
//!     index.lookup(token, true);
//!     index.record(token);
//! }
//! for pair in tokens.windows(2) {
//!     index.join(pair[0], pair[1], &mut seen);
//! }
//! index.commit().unwrap();
//!
//! let score = rate(&mut index, &["cat"], &["sat"]);
//! assert!(score > 0.0);
//! ```

pub mod entry;
pub mod entry_store;
pub mod error;
pub mod index;
pub mod index_dir;
pub mod ranking;
pub mod rater;
pub mod stats_db;

pub use entry::{MAX_SEARCH_RADIUS, WordEntry, normalize};
pub use entry_store::EntryStore;
pub use error::{Error, Result};
pub use index::{Index, SeenPairs};
pub use index_dir::IndexDir;
pub use ranking::ConceptRanker;
pub use rater::rate;
pub use stats_db::StatsDb;
