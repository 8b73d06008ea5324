// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state handed to every handler and to the gate.

use std::sync::Arc;

use crate::{
    auth::{Argon2Passwords, AuthGate, TimeToLive, TokenCodec},
    config::AuthConfig,
    storage::JsonStorage,
};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<JsonStorage>,
    pub tokens: Arc<TokenCodec>,
    pub gate: Arc<AuthGate>,
    pub passwords: Arc<Argon2Passwords>,
    /// TTL of tokens issued on login.
    pub session_ttl: TimeToLive,
}

impl AppState {
    pub fn new(storage: JsonStorage, auth: &AuthConfig) -> Self {
        let tokens = Arc::new(TokenCodec::new(auth));
        let gate = Arc::new(AuthGate::new(tokens.clone(), auth.public_paths.clone()));

        Self {
            storage: Arc::new(storage),
            tokens,
            gate,
            passwords: Arc::new(Argon2Passwords::new()),
            session_ttl: auth.session_ttl.clone(),
        }
    }

    pub fn storage(&self) -> &JsonStorage {
        &self.storage
    }
}

#[cfg(test)]
pub(crate) const TEST_SECRET: &[u8] = b"test-secret-test-secret-test-secret!";

/// State over a fresh temporary data directory. Keep the `TempDir` alive for
/// as long as the state is used.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = JsonStorage::open(dir.path()).unwrap();
    (AppState::new(storage, &AuthConfig::new(TEST_SECRET.to_vec())), dir)
}
