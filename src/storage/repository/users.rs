// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Stored users carry an opaque password hash. Only [`PublicUser`] ever
//! leaves the server.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{list_live, load_live, SoftDelete};
use crate::storage::{JsonStorage, StorageError, StorageResult};

const LABEL: &str = "User";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: String,
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    /// Stored lowercased.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete for StoredUser {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Public projection of a user (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&StoredUser> for PublicUser {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            birthday: user.birthday,
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<StoredUser> for PublicUser {
    fn from(user: StoredUser) -> Self {
        Self::from(&user)
    }
}

/// Unique fields a user can be looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Username,
    Email,
}

impl UserField {
    fn matches(self, user: &StoredUser, value: &str) -> bool {
        match self {
            UserField::Username => user.username == value,
            UserField::Email => user.email.eq_ignore_ascii_case(value.trim()),
        }
    }
}

pub struct UserRepository<'a> {
    storage: &'a JsonStorage,
}

impl<'a> UserRepository<'a> {
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self { storage }
    }

    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        load_live(self.storage, user_id, &self.storage.paths().user(user_id), LABEL)
    }

    pub fn exists(&self, user_id: &str) -> bool {
        self.get(user_id).is_ok()
    }

    /// List all live users.
    pub fn list(&self) -> StorageResult<Vec<StoredUser>> {
        list_live(self.storage, &self.storage.paths().users_dir())
    }

    /// Find exactly one live user whose `field` equals `value`.
    pub fn find_by_field(&self, field: UserField, value: &str) -> StorageResult<StoredUser> {
        self.list()?
            .into_iter()
            .find(|user| field.matches(user, value))
            .ok_or_else(|| StorageError::NotFound(LABEL.to_string()))
    }

    pub fn find_by_email(&self, email: &str) -> StorageResult<StoredUser> {
        self.find_by_field(UserField::Email, email)
    }

    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        let path = self.storage.paths().user(&user.id);
        if self.storage.exists(&path) {
            return Err(StorageError::AlreadyExists(format!("{LABEL} {}", user.id)));
        }
        self.storage.write_json(path, user)
    }

    pub fn update(&self, user: &StoredUser) -> StorageResult<()> {
        self.get(&user.id)?;
        self.storage.write_json(self.storage.paths().user(&user.id), user)
    }
}
