// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project API endpoints.
//!
//! Private projects are invisible to everyone but their owner. Only the
//! owner may modify or delete a project.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::extract::JsonBody;
use crate::{
    auth::{Auth, AuthenticatedUser},
    error::{ApiError, ErrorBody, FieldError},
    models::{CreateProjectRequest, UpdateProjectRequest},
    state::AppState,
    storage::{
        repository::new_id, ProjectRepository, StorageError, StorageResult, StoredProject,
        UserRepository,
    },
};

pub(crate) fn is_visible(project: &StoredProject, session: &AuthenticatedUser) -> bool {
    project.private != Some(true) || project.users_id == session.user_id
}

/// Load a project the session is allowed to see.
pub(crate) fn load_visible(
    repo: &ProjectRepository<'_>,
    project_id: &str,
    session: &AuthenticatedUser,
) -> StorageResult<StoredProject> {
    let project = repo.get(project_id)?;
    if is_visible(&project, session) {
        Ok(project)
    } else {
        Err(StorageError::NotFound("Project".to_string()))
    }
}

fn load_owned(
    repo: &ProjectRepository<'_>,
    project_id: &str,
    session: &AuthenticatedUser,
) -> Result<StoredProject, ApiError> {
    let project = load_visible(repo, project_id, session)?;
    if project.users_id != session.user_id {
        tracing::warn!(
            session_user = %session.user_id,
            project_id = %project.id,
            "refused modification of a project owned by another user"
        );
        return Err(ApiError::unauthorized());
    }
    Ok(project)
}

/// Create a project, owned by the session user unless `users_id` is given.
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = StoredProject),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 409, description = "Invalid field", body = ErrorBody)
    )
)]
pub async fn create_project(
    Auth(session): Auth,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateProjectRequest>,
) -> Result<(StatusCode, Json<StoredProject>), ApiError> {
    request.validate()?;

    let owner = request.users_id.unwrap_or_else(|| session.user_id.clone());
    if !UserRepository::new(state.storage()).exists(&owner) {
        return Err(ApiError::invalid_body(
            "Error in field of project",
            vec![FieldError::new("users_id", "User does not exist")],
        ));
    }

    let now = Utc::now();
    let project = StoredProject {
        id: new_id(),
        name: request.name,
        description: request.description,
        private: request.private,
        status: request.status,
        users_id: owner,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    ProjectRepository::new(state.storage()).create(&project)?;

    tracing::info!(project_id = %project.id, owner = %project.users_id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// List projects visible to the session user.
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visible projects", body = [StoredProject]),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn list_projects(
    Auth(session): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredProject>>, ApiError> {
    let projects: Vec<StoredProject> = ProjectRepository::new(state.storage())
        .list()?
        .into_iter()
        .filter(|project| is_visible(project, &session))
        .collect();
    Ok(Json(projects))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("project_id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = StoredProject),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Project not found", body = ErrorBody)
    )
)]
pub async fn get_project(
    Auth(session): Auth,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<StoredProject>, ApiError> {
    let repo = ProjectRepository::new(state.storage());
    Ok(Json(load_visible(&repo, &project_id, &session)?))
}

#[utoipa::path(
    patch,
    path = "/api/projects/{project_id}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("project_id" = String, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = StoredProject),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorBody),
        (status = 404, description = "Project not found", body = ErrorBody),
        (status = 409, description = "Invalid field", body = ErrorBody)
    )
)]
pub async fn update_project(
    Auth(session): Auth,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    JsonBody(request): JsonBody<UpdateProjectRequest>,
) -> Result<Json<StoredProject>, ApiError> {
    let repo = ProjectRepository::new(state.storage());
    let mut project = load_owned(&repo, &project_id, &session)?;

    request.validate()?;
    request.apply(&mut project);
    project.updated_at = Utc::now();
    repo.update(&project)?;

    tracing::info!(project_id = %project.id, "project updated");
    Ok(Json(project))
}

/// Soft-delete a project.
#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("project_id" = String, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorBody),
        (status = 404, description = "Project not found", body = ErrorBody)
    )
)]
pub async fn delete_project(
    Auth(session): Auth,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let repo = ProjectRepository::new(state.storage());
    let project = load_owned(&repo, &project_id, &session)?;
    repo.delete(&project.id)?;

    tracing::info!(project_id = %project.id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}
