//! File-backed storage medium: one JSON file per blob key

use std::path::{Path, PathBuf};

use crate::storage::{StorageError, StorageMedium};

/// Stores each blob as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageMedium for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.blob_path(key)).ok()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.blob_path(key), value)?;
        Ok(())
    }
}
