// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! File-backed JSON persistence for users, projects and tasks.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   users/{user_id}.json
//!   projects/{project_id}.json
//!   tasks/{task_id}.json
//! ```

pub mod fs;
pub mod paths;
pub mod repository;

pub use fs::{JsonStorage, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    ProjectRepository, PublicUser, StoredProject, StoredTask, StoredUser, TaskFilter,
    TaskRepository, UserField, UserRepository,
};
