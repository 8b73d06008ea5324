// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to JSON storage.
//!
//! Each repository provides CRUD operations for one entity type. Deletion is
//! soft: the document keeps a `deleted_at` timestamp and disappears from
//! every read path.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{JsonStorage, StorageError, StorageResult};

pub mod projects;
pub mod tasks;
pub mod users;

pub use projects::{ProjectRepository, StoredProject};
pub use tasks::{StoredTask, TaskFilter, TaskRepository};
pub use users::{PublicUser, StoredUser, UserField, UserRepository};

/// Entities that are hidden rather than removed on delete.
pub trait SoftDelete {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn is_live(&self) -> bool {
        self.deleted_at().is_none()
    }
}

/// Entity ids are UUIDs. Anything else cannot name a document and is
/// rejected before it reaches a filesystem path.
pub fn is_valid_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Load a live entity, mapping every kind of absence to `NotFound(label)`.
fn load_live<T>(storage: &JsonStorage, id: &str, path: &Path, label: &str) -> StorageResult<T>
where
    T: SoftDelete + DeserializeOwned,
{
    if !is_valid_id(id) || !storage.exists(path) {
        return Err(StorageError::NotFound(label.to_string()));
    }

    let entity: T = storage.read_json(path)?;
    if entity.is_live() {
        Ok(entity)
    } else {
        Err(StorageError::NotFound(label.to_string()))
    }
}

fn list_live<T>(storage: &JsonStorage, dir: &Path) -> StorageResult<Vec<T>>
where
    T: SoftDelete + DeserializeOwned,
{
    Ok(storage
        .read_all::<T>(dir)?
        .into_iter()
        .filter(|item| item.is_live())
        .collect())
}
