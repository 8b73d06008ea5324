// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User API endpoints.
//!
//! Any session may read users. A user may only modify their own record.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::{auth::ensure_unique, extract::JsonBody};
use crate::{
    auth::{run_blocking, Auth},
    error::{ApiError, ErrorBody},
    models::UpdateUserRequest,
    state::AppState,
    storage::{PublicUser, UserField, UserRepository},
};

/// List all users.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All live users", body = [PublicUser]),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn list_users(
    Auth(_session): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = UserRepository::new(state.storage()).list()?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

/// Get a single user.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = PublicUser),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_user(
    Auth(_session): Auth,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = UserRepository::new(state.storage()).get(&user_id)?;
    Ok(Json(PublicUser::from(user)))
}

/// Update the session user's own record.
#[utoipa::path(
    patch,
    path = "/api/users/{user_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = PublicUser),
        (status = 401, description = "Not authenticated or not the session user", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Invalid field or username taken", body = ErrorBody)
    )
)]
pub async fn update_user(
    Auth(session): Auth,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let repo = UserRepository::new(state.storage());
    let mut user = repo.get(&user_id)?;

    if user.id != session.user_id {
        tracing::warn!(
            session_user = %session.user_id,
            target_user = %user.id,
            "refused update of another user"
        );
        return Err(ApiError::unauthorized());
    }

    request.validate()?;

    if let Some(username) = request.username {
        ensure_unique(&repo, UserField::Username, &username, Some(&user.id))?;
        user.username = username;
    }
    if let Some(email) = request.email {
        let email = email.trim().to_lowercase();
        ensure_unique(&repo, UserField::Email, &email, Some(&user.id))?;
        user.email = email;
    }
    if let Some(first_name) = request.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = request.last_name {
        user.last_name = last_name;
    }
    if request.birthday.is_some() {
        user.birthday = request.birthday;
    }
    if let Some(password) = request.password {
        let passwords = state.passwords.clone();
        user.password_hash = run_blocking(move || passwords.hash(&password)).await?;
    }

    user.updated_at = Utc::now();
    repo.update(&user)?;

    tracing::info!(user_id = %user.id, "user updated");
    Ok(Json(PublicUser::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{AuthenticatedUser, PasswordVerifier},
        state::test_state,
        storage::{repository::users::tests::sample_user, StoredUser},
    };

    fn session_for(user: &StoredUser) -> Auth {
        Auth(AuthenticatedUser {
            user_id: user.id.clone(),
            issued_at: None,
            expires_at: None,
        })
    }

    fn seed(state: &AppState, username: &str, email: &str) -> StoredUser {
        let user = sample_user(username, email);
        UserRepository::new(state.storage()).create(&user).unwrap();
        user
    }

    #[tokio::test]
    async fn list_and_get_never_expose_hashes() {
        let (state, _dir) = test_state();
        let ada = seed(&state, "ada", "ada@example.com");
        seed(&state, "alan", "alan@example.com");

        let Json(users) = list_users(session_for(&ada), State(state.clone())).await.unwrap();
        assert_eq!(users.len(), 2);

        let Json(user) = get_user(session_for(&ada), State(state), Path(ada.id.clone()))
            .await
            .unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ada");
    }

    #[tokio::test]
    async fn update_own_record_rehashes_password() {
        let (state, _dir) = test_state();
        let ada = seed(&state, "ada", "ada@example.com");

        let Json(updated) = update_user(
            session_for(&ada),
            State(state.clone()),
            Path(ada.id.clone()),
            JsonBody(UpdateUserRequest {
                first_name: Some("Augusta".to_string()),
                password: Some("new-password".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.last_name, ada.last_name);
        assert!(updated.updated_at >= ada.updated_at);

        let stored = UserRepository::new(state.storage()).get(&ada.id).unwrap();
        assert!(state.passwords.verify("new-password", &stored.password_hash));
    }

    #[tokio::test]
    async fn update_of_another_user_is_unauthorized() {
        let (state, _dir) = test_state();
        let ada = seed(&state, "ada", "ada@example.com");
        let alan = seed(&state, "alan", "alan@example.com");

        let err = update_user(
            session_for(&alan),
            State(state),
            Path(ada.id.clone()),
            JsonBody(UpdateUserRequest::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn update_to_taken_username_is_rejected() {
        let (state, _dir) = test_state();
        let ada = seed(&state, "ada", "ada@example.com");
        seed(&state, "alan", "alan@example.com");

        let err = update_user(
            session_for(&ada),
            State(state),
            Path(ada.id.clone()),
            JsonBody(UpdateUserRequest {
                username: Some("alan".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.name(), "InvalidBodyError");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (state, _dir) = test_state();
        let ada = seed(&state, "ada", "ada@example.com");

        let err = get_user(session_for(&ada), State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
