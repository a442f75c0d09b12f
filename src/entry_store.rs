use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{entry::WordEntry, error::Result};

/// Per-word entry persistence: one JSON file per word under the index's
/// `entries/` directory.
///
/// The filename is the normalized word itself plus `.json`. Normalized words
/// are lowercase ASCII letters only, so every word is a valid filename and
/// two distinct words can never alias the same file.
pub struct EntryStore {
    dir: PathBuf,
}

impl EntryStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Examples
    ///
    /// ```
    /// # let tmp = tempfile::tempdir().unwrap();
    /// use wordmesh::EntryStore;
    ///
    /// let store = EntryStore::open(tmp.path()).unwrap();
    /// assert!(store.list_words().unwrap().is_empty());
    /// ```
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the entry file backing `word`.
    pub fn entry_path(&self, word: &str) -> PathBuf {
        self.dir.join(format!("{word}.json"))
    }

    /// Load the persisted entry for `word`.
    ///
    /// Returns `Ok(None)` when no entry file exists. A file that exists but
    /// does not decode is an error — the caller decides how to degrade.
    pub fn load(&self, word: &str) -> Result<Option<WordEntry>> {
        let bytes = match fs::read(self.entry_path(word)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Persist an entry, replacing any previous file.
    ///
    /// Writes a temporary sibling first and renames it into place, so a
    /// crash mid-write cannot leave a truncated entry file behind.
    pub fn store(&self, entry: &WordEntry) -> Result<()> {
        let path = self.entry_path(&entry.word);
        let tmp = self.dir.join(format!("{}.json.tmp", entry.word));
        fs::write(&tmp, serde_json::to_vec(entry)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Remove the entry file for `word`. Returns whether a file existed.
    pub fn remove(&self, word: &str) -> Result<bool> {
        match fs::remove_file(self.entry_path(word)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// List all words with a persisted entry file, sorted.
    pub fn list_words(&self) -> Result<Vec<String>> {
        let mut words = Vec::new();
        for dirent in fs::read_dir(&self.dir)? {
            let name = dirent?.file_name();
            let name = name.to_string_lossy();
            if let Some(word) = name.strip_suffix(".json") {
                words.push(word.to_string());
            }
        }
        words.sort();
        Ok(words)
    }
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore").finish_non_exhaustive()
    }
}
