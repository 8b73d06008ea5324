// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Task API endpoints.
//!
//! A task is reachable only through a project the session can see.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::{extract::JsonBody, projects};
use crate::{
    auth::{Auth, AuthenticatedUser},
    error::{ApiError, ErrorBody, FieldError},
    models::{CreateTaskRequest, UpdateTaskRequest},
    state::AppState,
    storage::{
        repository::new_id, JsonStorage, ProjectRepository, StorageError, StoredTask, TaskFilter,
        TaskRepository,
    },
};

/// Reject a body whose `projects_id` does not name a visible project.
fn ensure_project(
    storage: &JsonStorage,
    project_id: &str,
    session: &AuthenticatedUser,
) -> Result<(), ApiError> {
    match projects::load_visible(&ProjectRepository::new(storage), project_id, session) {
        Ok(_) => Ok(()),
        Err(StorageError::NotFound(_)) => Err(ApiError::invalid_body(
            "Error in field of task",
            vec![FieldError::new("projects_id", "Project does not exist")],
        )),
        Err(e) => Err(e.into()),
    }
}

/// Load a task whose project the session can see.
fn load_task(
    storage: &JsonStorage,
    task_id: &str,
    session: &AuthenticatedUser,
) -> Result<StoredTask, ApiError> {
    let task = TaskRepository::new(storage).get(task_id)?;
    match projects::load_visible(&ProjectRepository::new(storage), &task.projects_id, session) {
        Ok(_) => Ok(task),
        Err(StorageError::NotFound(_)) => Err(ApiError::not_found("Task is not found")),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = StoredTask),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 409, description = "Invalid field or unknown project", body = ErrorBody)
    )
)]
pub async fn create_task(
    Auth(session): Auth,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateTaskRequest>,
) -> Result<(StatusCode, Json<StoredTask>), ApiError> {
    request.validate()?;
    ensure_project(state.storage(), &request.projects_id, &session)?;

    let now = Utc::now();
    let task = StoredTask {
        id: new_id(),
        name: request.name,
        description: request.description,
        status: request.status,
        projects_id: request.projects_id,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    TaskRepository::new(state.storage()).create(&task)?;

    tracing::info!(task_id = %task.id, project_id = %task.projects_id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// List tasks, optionally restricted to one project.
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(TaskFilter),
    responses(
        (status = 200, description = "Visible tasks", body = [StoredTask]),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn list_tasks(
    Auth(session): Auth,
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<StoredTask>>, ApiError> {
    let visible: Vec<String> = ProjectRepository::new(state.storage())
        .list()?
        .into_iter()
        .filter(|project| projects::is_visible(project, &session))
        .map(|project| project.id)
        .collect();

    let tasks: Vec<StoredTask> = TaskRepository::new(state.storage())
        .list(&filter)?
        .into_iter()
        .filter(|task| visible.contains(&task.projects_id))
        .collect();
    Ok(Json(tasks))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(("task_id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task", body = StoredTask),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody)
    )
)]
pub async fn get_task(
    Auth(session): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<StoredTask>, ApiError> {
    Ok(Json(load_task(state.storage(), &task_id, &session)?))
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{task_id}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(("task_id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = StoredTask),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody),
        (status = 409, description = "Invalid field or unknown project", body = ErrorBody)
    )
)]
pub async fn update_task(
    Auth(session): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    JsonBody(request): JsonBody<UpdateTaskRequest>,
) -> Result<Json<StoredTask>, ApiError> {
    let mut task = load_task(state.storage(), &task_id, &session)?;

    request.validate()?;
    if let Some(project_id) = &request.projects_id {
        ensure_project(state.storage(), project_id, &session)?;
    }

    request.apply(&mut task);
    task.updated_at = Utc::now();
    TaskRepository::new(state.storage()).update(&task)?;

    tracing::info!(task_id = %task.id, "task updated");
    Ok(Json(task))
}

/// Soft-delete a task.
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(("task_id" = String, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody)
    )
)]
pub async fn delete_task(
    Auth(session): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let task = load_task(state.storage(), &task_id, &session)?;
    TaskRepository::new(state.storage()).delete(&task.id)?;

    tracing::info!(task_id = %task.id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::projects::tests::{seed_project, seed_user, session_for},
        state::test_state,
    };

    async fn seed_task(state: &AppState, session: Auth, project_id: &str, name: &str) -> StoredTask {
        let (_, Json(task)) = create_task(
            session,
            State(state.clone()),
            JsonBody(CreateTaskRequest {
                name: name.to_string(),
                projects_id: project_id.to_string(),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        task
    }

    #[tokio::test]
    async fn create_with_unknown_project_is_invalid_body() {
        let (state, _dir) = test_state();
        let ada = seed_user(&state, "ada");

        let err = create_task(
            session_for(&ada),
            State(state),
            JsonBody(CreateTaskRequest {
                name: "write docs".to_string(),
                projects_id: new_id(),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(matches!(err, ApiError::InvalidBody { ref errors, .. } if errors[0].field == "projects_id"));
    }

    #[tokio::test]
    async fn list_filters_by_project() {
        let (state, _dir) = test_state();
        let ada = seed_user(&state, "ada");
        let first = seed_project(&state, &ada, "first", false).await;
        let second = seed_project(&state, &ada, "second", false).await;

        seed_task(&state, session_for(&ada), &first.id, "a").await;
        seed_task(&state, session_for(&ada), &first.id, "b").await;
        seed_task(&state, session_for(&ada), &second.id, "c").await;

        let Json(all) = list_tasks(session_for(&ada), State(state.clone()), Query(TaskFilter::default()))
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let Json(only_second) = list_tasks(
            session_for(&ada),
            State(state),
            Query(TaskFilter {
                projects_id: Some(second.id.clone()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(only_second.len(), 1);
        assert_eq!(only_second[0].name, "c");
    }

    #[tokio::test]
    async fn tasks_of_private_projects_are_hidden() {
        let (state, _dir) = test_state();
        let ada = seed_user(&state, "ada");
        let alan = seed_user(&state, "alan");
        let secret = seed_project(&state, &ada, "secret", true).await;
        let task = seed_task(&state, session_for(&ada), &secret.id, "hidden").await;

        let Json(for_alan) = list_tasks(session_for(&alan), State(state.clone()), Query(TaskFilter::default()))
            .await
            .unwrap();
        assert!(for_alan.is_empty());

        let err = get_task(session_for(&alan), State(state), Path(task.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let (state, _dir) = test_state();
        let ada = seed_user(&state, "ada");
        let project = seed_project(&state, &ada, "engine", false).await;
        let task = seed_task(&state, session_for(&ada), &project.id, "draft").await;

        let Json(updated) = update_task(
            session_for(&ada),
            State(state.clone()),
            Path(task.id.clone()),
            JsonBody(UpdateTaskRequest {
                status: Some(1),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.status, Some(1));
        assert_eq!(updated.name, "draft");

        let status = delete_task(session_for(&ada), State(state.clone()), Path(task.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_task(session_for(&ada), State(state), Path(task.id))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn moving_to_unknown_project_is_rejected() {
        let (state, _dir) = test_state();
        let ada = seed_user(&state, "ada");
        let project = seed_project(&state, &ada, "engine", false).await;
        let task = seed_task(&state, session_for(&ada), &project.id, "draft").await;

        let err = update_task(
            session_for(&ada),
            State(state),
            Path(task.id),
            JsonBody(UpdateTaskRequest {
                projects_id: Some("nope".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.name(), "InvalidBodyError");
    }
}
