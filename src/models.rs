// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API, with their validation.
//!
//! Validation collects every failing field before rejecting, so a single
//! `InvalidBodyError` lists all problems at once:
//!
//! ```json
//! { "name": "InvalidBodyError", "message": "Error in field of user",
//!   "errors": [{ "field": "username", "message": "String length is not in this range" }] }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{ApiError, FieldError},
    storage::{StoredProject, StoredTask},
};

pub const USERNAME_LEN: (usize, usize) = (3, 45);
pub const PERSON_NAME_LEN: (usize, usize) = (1, 20);
pub const EMAIL_MAX_LEN: usize = 100;
pub const PASSWORD_LEN: (usize, usize) = (1, 100);
pub const ENTITY_NAME_LEN: (usize, usize) = (1, 45);

const LENGTH_MESSAGE: &str = "String length is not in this range";
const DATE_MESSAGE: &str = "Provided date does not match with validated formats";
const EMAIL_MESSAGE: &str = "Type of field should be an email.";

/// Dates produced by a zero or negative epoch offset on the client side.
const REJECTED_BIRTHDAYS: [(i32, u32, u32); 2] = [(1969, 12, 31), (1970, 1, 1)];

// =============================================================================
// Validation
// =============================================================================

/// Accumulates field errors for one request body.
#[derive(Debug, Default)]
struct Validation {
    errors: Vec<FieldError>,
}

impl Validation {
    fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
    }

    fn length(&mut self, field: &str, value: &str, (min, max): (usize, usize)) {
        let len = value.chars().count();
        self.check((min..=max).contains(&len), field, LENGTH_MESSAGE);
    }

    fn optional_length(&mut self, field: &str, value: Option<&str>, range: (usize, usize)) {
        if let Some(value) = value {
            self.length(field, value, range);
        }
    }

    fn email(&mut self, field: &str, value: &str) {
        self.check(
            value.len() <= EMAIL_MAX_LEN && is_email(value),
            field,
            EMAIL_MESSAGE,
        );
    }

    fn birthday(&mut self, field: &str, value: Option<NaiveDate>) {
        let rejected = value.is_some_and(|date| {
            REJECTED_BIRTHDAYS
                .iter()
                .any(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d) == Some(date))
        });
        self.check(!rejected, field, DATE_MESSAGE);
    }

    fn finish(self, entity: &str) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::invalid_body(
                format!("Error in field of {entity}"),
                self.errors,
            ))
        }
    }
}

/// Minimal address shape check: `local@domain.tld`, no whitespace.
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

// =============================================================================
// Auth Models
// =============================================================================

/// Registration payload for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default, rename = "firstName")]
    pub first_name: String,
    #[serde(default, rename = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validation::default();
        v.length("username", &self.username, USERNAME_LEN);
        v.length("firstName", &self.first_name, PERSON_NAME_LEN);
        v.length("lastName", &self.last_name, PERSON_NAME_LEN);
        v.birthday("birthday", self.birthday);
        v.email("email", self.email.trim());
        v.length("password", &self.password, PASSWORD_LEN);
        v.finish("user")
    }
}

/// Credentials for `POST /api/auth/create`.
///
/// Missing fields deserialize as empty strings and fail as an ordinary bad
/// login.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed session token, sent back as `Authorization: Bearer <token>`.
    pub token: String,
}

// =============================================================================
// User Models
// =============================================================================

/// Partial update of a user. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validation::default();
        v.optional_length("username", self.username.as_deref(), USERNAME_LEN);
        v.optional_length("firstName", self.first_name.as_deref(), PERSON_NAME_LEN);
        v.optional_length("lastName", self.last_name.as_deref(), PERSON_NAME_LEN);
        v.birthday("birthday", self.birthday);
        if let Some(email) = &self.email {
            v.email("email", email.trim());
        }
        v.optional_length("password", self.password.as_deref(), PASSWORD_LEN);
        v.finish("user")
    }
}

// =============================================================================
// Project Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub private: Option<bool>,
    pub status: Option<u8>,
    /// Owner. Defaults to the session user.
    pub users_id: Option<String>,
}

impl CreateProjectRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validation::default();
        v.length("name", &self.name, ENTITY_NAME_LEN);
        v.finish("project")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub private: Option<bool>,
    pub status: Option<u8>,
}

impl UpdateProjectRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validation::default();
        v.optional_length("name", self.name.as_deref(), ENTITY_NAME_LEN);
        v.finish("project")
    }

    /// Copy every present field onto `project`.
    pub fn apply(self, project: &mut StoredProject) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if self.description.is_some() {
            project.description = self.description;
        }
        if self.private.is_some() {
            project.private = self.private;
        }
        if self.status.is_some() {
            project.status = self.status;
        }
    }
}

// =============================================================================
// Task Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub status: Option<u8>,
    #[serde(default)]
    pub projects_id: String,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validation::default();
        v.length("name", &self.name, ENTITY_NAME_LEN);
        v.finish("task")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<u8>,
    /// Move the task to another project.
    pub projects_id: Option<String>,
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validation::default();
        v.optional_length("name", self.name.as_deref(), ENTITY_NAME_LEN);
        v.finish("task")
    }

    pub fn apply(self, task: &mut StoredTask) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if self.description.is_some() {
            task.description = self.description;
        }
        if self.status.is_some() {
            task.status = self.status;
        }
        if let Some(projects_id) = self.projects_id {
            task.projects_id = projects_id;
        }
    }
}
