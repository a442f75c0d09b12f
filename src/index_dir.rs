use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// On-disk home of one index: a stats database plus a directory of per-word
/// entry files.
#[derive(Debug, Clone)]
pub struct IndexDir {
    root: PathBuf,
}

impl IndexDir {
    /// Resolve the index directory from, in order of priority:
    /// 1. An explicit path
    /// 2. The WORDMESH_INDEX_DIR environment variable
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("WORDMESH_INDEX_DIR") {
            PathBuf::from(val)
        } else {
            return Err(Error::Config(
                "no index directory given and WORDMESH_INDEX_DIR is not set"
                    .into(),
            ));
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::IndexDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats_db(&self) -> PathBuf {
        self.root.join("stats.redb")
    }

    pub fn entries_dir(&self) -> Result<PathBuf> {
        let path = self.root.join("entries");
        std::fs::create_dir_all(&path)
            .map_err(|_| Error::IndexDir(path.clone()))?;
        Ok(path)
    }
}
