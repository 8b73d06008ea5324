// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session claims and the authenticated user attached to requests.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::token::VerifiedToken;

/// Payload of a session token issued by `POST /api/auth/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Id of the user the session belongs to.
    pub id: String,
}

impl SessionClaims {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self { id: user_id.into() }
    }
}

/// Authenticated user information extracted from a verified session token.
///
/// The gate stores exactly one of these in the request extensions of every
/// authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user id (the token's `id` claim)
    pub user_id: String,

    /// Issue time (Unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,

    /// Expiration (Unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl From<VerifiedToken<SessionClaims>> for AuthenticatedUser {
    fn from(token: VerifiedToken<SessionClaims>) -> Self {
        Self {
            user_id: token.claims.id,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
        }
    }
}
