// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP routing.
//!
//! Everything under `/api` sits behind the authorization gate. `/health` and
//! the Swagger UI at `/docs` are outside it.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::authorize,
    error::{ErrorBody, FieldError},
    models::{
        CreateProjectRequest, CreateTaskRequest, LoginRequest, RegisterRequest, TokenResponse,
        UpdateProjectRequest, UpdateTaskRequest, UpdateUserRequest,
    },
    state::AppState,
    storage::{PublicUser, StoredProject, StoredTask},
};

pub mod auth;
pub mod extract;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/create", post(auth::create_session))
        .route("/api/auth/resolve", get(auth::resolve))
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/{user_id}",
            get(users::get_user).patch(users::update_user),
        )
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/projects/{project_id}",
            get(projects::get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{task_id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .layer(middleware::from_fn_with_state(state.clone(), authorize));

    Router::new()
        .merge(api_routes)
        .route("/health", get(health::health))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Registers the `bearer_auth` scheme referenced by gated endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::create_session,
        auth::resolve,
        users::list_users,
        users::get_user,
        users::update_user,
        projects::create_project,
        projects::list_projects,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        tasks::create_task,
        tasks::list_tasks,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task,
        health::health
    ),
    components(
        schemas(
            ErrorBody,
            FieldError,
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            PublicUser,
            UpdateUserRequest,
            StoredProject,
            CreateProjectRequest,
            UpdateProjectRequest,
            StoredTask,
            CreateTaskRequest,
            UpdateTaskRequest,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and session tokens"),
        (name = "Users", description = "User accounts"),
        (name = "Projects", description = "Projects owned by users"),
        (name = "Tasks", description = "Tasks belonging to projects"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;
