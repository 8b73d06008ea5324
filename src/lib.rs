// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Taskboard - users, projects and tasks behind a bearer-token gate
//!
//! A JSON REST API whose sessions are stateless HS256 tokens. Every `/api`
//! request outside a small allow-list must carry a valid, unexpired token.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, authorization gate and credential checks
//! - `config` - Environment configuration
//! - `error` - Error taxonomy and its HTTP translation
//! - `storage` - JSON file storage with soft delete

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
