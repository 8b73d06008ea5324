// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{list_live, load_live, SoftDelete};
use crate::storage::{JsonStorage, StorageError, StorageResult};

const LABEL: &str = "Project";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct StoredProject {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
    /// Owning user.
    pub users_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete for StoredProject {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

pub struct ProjectRepository<'a> {
    storage: &'a JsonStorage,
}

impl<'a> ProjectRepository<'a> {
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self { storage }
    }

    pub fn get(&self, project_id: &str) -> StorageResult<StoredProject> {
        load_live(
            self.storage,
            project_id,
            &self.storage.paths().project(project_id),
            LABEL,
        )
    }

    pub fn exists(&self, project_id: &str) -> bool {
        self.get(project_id).is_ok()
    }

    pub fn list(&self) -> StorageResult<Vec<StoredProject>> {
        list_live(self.storage, &self.storage.paths().projects_dir())
    }

    pub fn create(&self, project: &StoredProject) -> StorageResult<()> {
        let path = self.storage.paths().project(&project.id);
        if self.storage.exists(&path) {
            return Err(StorageError::AlreadyExists(format!("{LABEL} {}", project.id)));
        }
        self.storage.write_json(path, project)
    }

    pub fn update(&self, project: &StoredProject) -> StorageResult<()> {
        self.get(&project.id)?;
        self.storage
            .write_json(self.storage.paths().project(&project.id), project)
    }

    /// Soft delete: stamps `deleted_at` and keeps the document.
    pub fn delete(&self, project_id: &str) -> StorageResult<()> {
        let mut project = self.get(project_id)?;
        project.deleted_at = Some(Utc::now());
        self.storage
            .write_json(self.storage.paths().project(project_id), &project)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::repository::new_id;
    use tempfile::TempDir;

    pub(crate) fn sample_project(name: &str, owner: &str) -> StoredProject {
        let now = Utc::now();
        StoredProject {
            id: new_id(),
            name: name.to_string(),
            description: Some("A project".to_string()),
            private: Some(false),
            status: Some(1),
            users_id: owner.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn create_get_update() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::open(dir.path()).unwrap();
        let repo = ProjectRepository::new(&storage);

        let mut project = sample_project("Apollo", "owner");
        repo.create(&project).unwrap();
        assert_eq!(repo.get(&project.id).unwrap(), project);

        project.name = "Artemis".to_string();
        repo.update(&project).unwrap();
        assert_eq!(repo.get(&project.id).unwrap().name, "Artemis");
    }

    #[test]
    fn delete_hides_project() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::open(dir.path()).unwrap();
        let repo = ProjectRepository::new(&storage);

        let project = sample_project("Apollo", "owner");
        repo.create(&project).unwrap();
        repo.delete(&project.id).unwrap();

        assert!(matches!(repo.get(&project.id), Err(StorageError::NotFound(_))));
        assert!(repo.list().unwrap().is_empty());
        assert!(storage.exists(storage.paths().project(&project.id)));
        assert!(matches!(repo.delete(&project.id), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn update_of_missing_project_fails() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::open(dir.path()).unwrap();
        let repo = ProjectRepository::new(&storage);

        let project = sample_project("Ghost", "owner");
        assert!(matches!(repo.update(&project), Err(StorageError::NotFound(_))));
    }
}
