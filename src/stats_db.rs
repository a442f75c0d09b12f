use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::error::Result;

const STATS: TableDefinition<&str, &str> = TableDefinition::new("stats");

const DOCUMENTS: &str = "documents";
const MOST_FREQUENT: &str = "most_frequent";
const MOST_FREQUENT_COUNT: &str = "most_frequent_count";

/// Durable index-level statistics: the total indexed document count and the
/// globally most frequent word.
///
/// Concept ranking reads both, so they must survive a restart; everything
/// else the index needs lives in the per-word entry files.
pub struct StatsDb {
    db: Database,
}

impl StatsDb {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        txn.open_table(STATS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    /// Total number of indexed documents, 0 when never written.
    pub fn document_count(&self) -> Result<u64> {
        Ok(self
            .get(DOCUMENTS)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    pub fn set_document_count(&self, count: u64) -> Result<()> {
        self.set(DOCUMENTS, &count.to_string())
    }

    /// The most frequent word and its occurrence count, if any word has
    /// been recorded yet.
    pub fn most_frequent(&self) -> Result<Option<(String, u64)>> {
        let Some(word) = self.get(MOST_FREQUENT)? else {
            return Ok(None);
        };
        let count = self
            .get(MOST_FREQUENT_COUNT)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Ok(Some((word, count)))
    }

    pub fn set_most_frequent(&self, word: &str, count: u64) -> Result<()> {
        self.set(MOST_FREQUENT, word)?;
        self.set(MOST_FREQUENT_COUNT, &count.to_string())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(STATS)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(STATS)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl std::fmt::Debug for StatsDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsDb").finish_non_exhaustive()
    }
}
