// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Task repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{list_live, load_live, SoftDelete};
use crate::storage::{JsonStorage, StorageError, StorageResult};

const LABEL: &str = "Task";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct StoredTask {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
    /// Project this task belongs to.
    pub projects_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete for StoredTask {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Criteria accepted by `GET /api/tasks`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TaskFilter {
    /// Only tasks of this project.
    pub projects_id: Option<String>,
}

impl TaskFilter {
    fn matches(&self, task: &StoredTask) -> bool {
        self.projects_id
            .as_deref()
            .is_none_or(|project| task.projects_id == project)
    }
}

pub struct TaskRepository<'a> {
    storage: &'a JsonStorage,
}

impl<'a> TaskRepository<'a> {
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self { storage }
    }

    pub fn get(&self, task_id: &str) -> StorageResult<StoredTask> {
        load_live(self.storage, task_id, &self.storage.paths().task(task_id), LABEL)
    }

    pub fn list(&self, filter: &TaskFilter) -> StorageResult<Vec<StoredTask>> {
        Ok(list_live(self.storage, &self.storage.paths().tasks_dir())?
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect())
    }

    pub fn create(&self, task: &StoredTask) -> StorageResult<()> {
        let path = self.storage.paths().task(&task.id);
        if self.storage.exists(&path) {
            return Err(StorageError::AlreadyExists(format!("{LABEL} {}", task.id)));
        }
        self.storage.write_json(path, task)
    }

    pub fn update(&self, task: &StoredTask) -> StorageResult<()> {
        self.get(&task.id)?;
        self.storage.write_json(self.storage.paths().task(&task.id), task)
    }

    /// Soft delete: stamps `deleted_at` and keeps the document.
    pub fn delete(&self, task_id: &str) -> StorageResult<()> {
        let mut task = self.get(task_id)?;
        task.deleted_at = Some(Utc::now());
        self.storage.write_json(self.storage.paths().task(task_id), &task)
    }
}
