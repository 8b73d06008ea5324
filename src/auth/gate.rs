// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization gate.
//!
//! Every request under the gated router goes through [`authorize`]:
//!
//! 1. Paths starting with an allow-listed prefix pass untouched, without a
//!    session and without touching the token codec.
//! 2. Otherwise the bearer token is decoded and the resulting
//!    [`AuthenticatedUser`] is stored in the request extensions.
//! 3. Decode failures are reclassified: bad or missing tokens become
//!    `UnauthorizedError`, expired ones `SessionExpiredError`. Anything else
//!    propagates as an internal error.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::{
    claims::{AuthenticatedUser, SessionClaims},
    token::{TokenCodec, TokenError},
};
use crate::{error::ApiError, state::AppState};

/// Outcome of a successful gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Allow-listed path; no session attached.
    Public,
    Authenticated(AuthenticatedUser),
}

#[derive(Debug)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    allow_list: Vec<String>,
}

impl AuthGate {
    pub fn new<I, S>(codec: Arc<TokenCodec>, allow_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codec,
            allow_list: allow_list.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allow_list(&self) -> &[String] {
        &self.allow_list
    }

    /// Prefix match against the allow-list.
    pub fn is_public(&self, path: &str) -> bool {
        self.allow_list
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Decide whether a request for `path` with the given `Authorization`
    /// header value may proceed.
    pub async fn check(
        &self,
        path: &str,
        authorization: Option<&str>,
    ) -> Result<GateDecision, ApiError> {
        if self.is_public(path) {
            return Ok(GateDecision::Public);
        }

        match self
            .codec
            .decode_from_authorization_header::<SessionClaims>(authorization)
            .await
        {
            Ok(Some(token)) => Ok(GateDecision::Authenticated(token.into())),
            Ok(None) | Err(TokenError::SignatureInvalid) => Err(ApiError::unauthorized()),
            Err(TokenError::Expired { expired_at }) => Err(ApiError::session_expired(expired_at)),
            Err(other) => Err(ApiError::internal(other)),
        }
    }
}

/// Axum middleware enforcing the gate on every request it wraps.
pub async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // A non-ASCII header cannot hold a bearer token; treat it as absent.
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let decision = state
        .gate
        .check(request.uri().path(), authorization)
        .await
        .inspect_err(|e| {
            tracing::debug!(path = %request.uri().path(), reason = e.name(), "request rejected by gate");
        })?;

    if let GateDecision::Authenticated(user) = decision {
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}
