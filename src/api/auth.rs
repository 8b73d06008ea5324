// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login and session resolution.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use super::extract::JsonBody;
use crate::{
    auth::{run_blocking, Auth, CredentialVerifier, SessionClaims},
    error::{ApiError, ErrorBody, FieldError},
    models::{LoginRequest, RegisterRequest, TokenResponse},
    state::AppState,
    storage::{repository::new_id, PublicUser, StorageError, StoredUser, UserField, UserRepository},
};

/// Fail with a field error when another live user already holds `value`.
pub(crate) fn ensure_unique(
    repo: &UserRepository<'_>,
    field: UserField,
    value: &str,
    except_id: Option<&str>,
) -> Result<(), ApiError> {
    match repo.find_by_field(field, value) {
        Ok(existing) if Some(existing.id.as_str()) != except_id => {
            let (name, message) = match field {
                UserField::Username => ("username", "Username is already on use"),
                UserField::Email => ("email", "Email is already on use"),
            };
            Err(ApiError::invalid_body(
                message,
                vec![FieldError::new(name, "User already exists")],
            ))
        }
        Ok(_) | Err(StorageError::NotFound(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = PublicUser),
        (status = 409, description = "Invalid field or username taken", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    request.validate()?;

    let repo = UserRepository::new(state.storage());
    let email = request.email.trim().to_lowercase();
    ensure_unique(&repo, UserField::Username, &request.username, None)?;
    ensure_unique(&repo, UserField::Email, &email, None)?;

    let passwords = state.passwords.clone();
    let password = request.password;
    let password_hash = run_blocking(move || passwords.hash(&password)).await?;

    let now = Utc::now();
    let user = StoredUser {
        id: new_id(),
        username: request.username,
        first_name: request.first_name,
        last_name: request.last_name,
        birthday: request.birthday,
        email,
        password_hash,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    repo.create(&user)?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

/// Exchange email and password for a session token.
#[utoipa::path(
    post,
    path = "/api/auth/create",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token", body = TokenResponse),
        (status = 401, description = "Email or password is incorrect", body = ErrorBody)
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = {
        let state = state.clone();
        run_blocking(move || {
            CredentialVerifier::new(UserRepository::new(state.storage()), &*state.passwords)
                .verify_login(&request.email, &request.password)
        })
        .await?
    };

    let token = state
        .tokens
        .encode(&SessionClaims::for_user(&user.id), Some(state.session_ttl.clone()))
        .await
        .map_err(ApiError::internal)?;

    tracing::info!(user_id = %user.id, "session created");
    Ok(Json(TokenResponse { token }))
}

/// Return the user owning the current session.
#[utoipa::path(
    get,
    path = "/api/auth/resolve",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session user", body = PublicUser),
        (status = 401, description = "Missing, invalid or expired session", body = ErrorBody),
        (status = 404, description = "Session user no longer exists", body = ErrorBody)
    )
)]
pub async fn resolve(
    Auth(session): Auth,
    State(state): State<AppState>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = UserRepository::new(state.storage()).get(&session.user_id)?;
    Ok(Json(PublicUser::from(user)))
}
