// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API error taxonomy and the boundary translation into HTTP responses.
//!
//! Every failure a handler or the authorization gate can surface is one of
//! the variants below. Clients branch on the stable `name` field of the JSON
//! body; anything that is not part of the taxonomy becomes an empty 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::StorageError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed or badly signed session token.
    #[error("{0}")]
    Unauthorized(String),
    /// Correctly signed session token past its expiration.
    #[error("{message}")]
    SessionExpired { message: String, expired_at: i64 },
    /// Unknown email or wrong password. Deliberately undifferentiated.
    #[error("{0}")]
    InvalidLogin(String),
    /// Request body failed validation.
    #[error("{message}")]
    InvalidBody {
        message: String,
        errors: Vec<FieldError>,
    },
    #[error("{0}")]
    NotFound(String),
    /// Anything outside the taxonomy. Never disclosed to the caller.
    #[error("internal error: {0}")]
    Internal(#[source] BoxError),
}

/// JSON body for typed failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(default, rename = "expiredAt", skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<i64>,
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized("Authorization token is missing or invalid".to_string())
    }

    pub fn session_expired(expired_at: i64) -> Self {
        Self::SessionExpired {
            message: "Authorization token expired".to_string(),
            expired_at,
        }
    }

    pub fn invalid_login() -> Self {
        Self::InvalidLogin("Email or Password is incorrect".to_string())
    }

    pub fn invalid_body(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self::InvalidBody {
            message: message.into(),
            errors,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(error: impl Into<BoxError>) -> Self {
        Self::Internal(error.into())
    }

    /// Stable wire name of this failure.
    pub fn name(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UnauthorizedError",
            ApiError::SessionExpired { .. } => "SessionExpiredError",
            ApiError::InvalidLogin(_) => "InvalidLoginError",
            ApiError::InvalidBody { .. } => "InvalidBodyError",
            ApiError::NotFound(_) => "NotFoundResource",
            ApiError::Internal(_) => "InternalError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_)
            | ApiError::SessionExpired { .. }
            | ApiError::InvalidLogin(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidBody { .. } => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client, `None` for undisclosed failures.
    pub fn body(&self) -> Option<ErrorBody> {
        let (errors, expired_at) = match self {
            ApiError::Internal(_) => return None,
            ApiError::InvalidBody { errors, .. } => (Some(errors.clone()), None),
            ApiError::SessionExpired { expired_at, .. } => (None, Some(*expired_at)),
            _ => (None, None),
        };

        Some(ErrorBody {
            name: self.name().to_string(),
            message: self.to_string(),
            errors,
            expired_at,
        })
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(entity) => ApiError::NotFound(format!("{entity} is not found")),
            other => ApiError::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.body() {
            Some(body) => {
                tracing::debug!(name = %body.name, status = %status, "request failed");
                (status, Json(body)).into_response()
            }
            None => {
                tracing::error!(error = %self, source = ?std::error::Error::source(&self), "unhandled error");
                status.into_response()
            }
        }
    }
}
