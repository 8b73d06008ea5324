// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON document storage on the local filesystem.
//!
//! Each entity lives in its own `{id}.json` file. Writes go through a
//! temporary file and a rename so readers never observe a partial document.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::StoragePaths;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Entity not found. Carries the entity label, e.g. `"Project"`.
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Storage not initialized")]
    NotInitialized,
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone)]
pub struct JsonStorage {
    paths: StoragePaths,
    initialized: bool,
}

impl JsonStorage {
    /// Does NOT create the directory layout. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Create and initialize storage rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let mut storage = Self::new(StoragePaths::new(root));
        storage.initialize()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Create the directory layout. Idempotent.
    pub fn initialize(&mut self) -> StorageResult<()> {
        for dir in self.paths.all_dirs() {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Write-read-delete probe used by the health endpoint.
    pub fn health_check(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let probe = self.paths.root().join(".health_check");
        let data = b"health_check_data";

        fs::write(&probe, data)?;
        let read_back = fs::read(&probe)?;
        fs::remove_file(&probe)?;

        if read_back != data {
            return Err(StorageError::Io(io::Error::other("health check data mismatch")));
        }

        Ok(())
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let file = File::open(path.as_ref())?;
        let value = serde_json::from_reader(BufReader::new(file))?;
        Ok(value)
    }

    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Unique per writer, so concurrent saves of one entity never share a temp file.
        let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    /// List the stems of every `*.{extension}` file in `dir`.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StorageResult<Vec<String>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != extension) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Read every document in `dir`, skipping unreadable files.
    pub fn read_all<T: DeserializeOwned>(&self, dir: impl AsRef<Path>) -> StorageResult<Vec<T>> {
        let dir = dir.as_ref();
        let mut items = Vec::new();
        for id in self.list_files(dir, "json")? {
            match self.read_json(dir.join(format!("{id}.json"))) {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!(file = %id, error = %e, "skipping unreadable document"),
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        id: String,
        value: i32,
    }

    fn test_storage() -> (JsonStorage, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = JsonStorage::open(dir.path()).expect("Failed to initialize");
        (storage, dir)
    }

    #[test]
    fn initialize_creates_directories() {
        let (storage, _dir) = test_storage();

        assert!(storage.is_initialized());
        assert!(storage.paths().users_dir().exists());
        assert!(storage.paths().projects_dir().exists());
        assert!(storage.paths().tasks_dir().exists());
    }

    #[test]
    fn write_and_read_json() {
        let (storage, _dir) = test_storage();
        let data = TestData {
            id: "test-1".to_string(),
            value: 42,
        };

        let path = storage.paths().projects_dir().join("test-1.json");
        storage.write_json(&path, &data).unwrap();

        let read: TestData = storage.read_json(&path).unwrap();
        assert_eq!(read, data);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn uninitialized_storage_refuses_io() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(StoragePaths::new(dir.path()));

        let result: StorageResult<TestData> = storage.read_json(dir.path().join("x.json"));
        assert!(matches!(result, Err(StorageError::NotInitialized)));
        assert!(matches!(storage.health_check(), Err(StorageError::NotInitialized)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let (storage, _dir) = test_storage();
        let result: StorageResult<TestData> =
            storage.read_json(storage.paths().project("missing"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn read_all_skips_foreign_and_corrupt_files() {
        let (storage, _dir) = test_storage();
        let tasks = storage.paths().tasks_dir();

        storage
            .write_json(tasks.join("a.json"), &TestData { id: "a".into(), value: 1 })
            .unwrap();
        fs::write(tasks.join("b.json"), b"{ not json").unwrap();
        fs::write(tasks.join("notes.txt"), b"ignored").unwrap();

        let items: Vec<TestData> = storage.read_all(&tasks).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
    }

    #[test]
    fn health_check_passes_on_writable_root() {
        let (storage, _dir) = test_storage();
        storage.health_check().unwrap();
    }

    #[test]
    fn concurrent_writes_to_one_document_all_succeed() {
        let (storage, _dir) = test_storage();
        let path = storage.paths().projects_dir().join("shared.json");

        std::thread::scope(|scope| {
            for writer in 0..8 {
                let (storage, path) = (&storage, &path);
                scope.spawn(move || {
                    for round in 0..25 {
                        let data = TestData {
                            id: "shared".to_string(),
                            value: writer * 100 + round,
                        };
                        storage.write_json(path, &data).unwrap();
                    }
                });
            }
        });

        let stored: TestData = storage.read_json(&path).unwrap();
        assert_eq!(stored.id, "shared");

        let leftovers = fs::read_dir(storage.paths().projects_dir())
            .unwrap()
            .filter(|entry| {
                entry.as_ref().unwrap().path().extension().is_some_and(|ext| ext == "tmp")
            })
            .count();
        assert_eq!(leftovers, 0);
    }
}
