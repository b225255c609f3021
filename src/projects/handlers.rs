use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{services::present, session::AuthUser},
    dto::MessageResponse,
    error::{AppError, AppJson},
    state::AppState,
};

use super::dto::{CreateProjectRequest, ProjectListResponse, ProjectResponse, UpdateProjectRequest};
use super::services::{delete_owned, load_owned, parse_project_id, update_owned};

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.id))]
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateProjectRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ProjectResponse>), AppError> {
    let Some(title) = present(payload.title) else {
        return Err(AppError::validation("project title is required"));
    };
    let description = payload
        .description
        .map(|d| d.trim().to_string())
        .unwrap_or_default();

    let project = state
        .projects
        .create(user.0.id, &title, &description)
        .await?;
    info!(project_id = %project.id, "project created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/projects/{}", project.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((
        StatusCode::CREATED,
        headers,
        Json(ProjectResponse {
            message: Some("project created"),
            project,
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn list_projects(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProjectListResponse>, AppError> {
    let projects = state.projects.list_by_owner(user.0.id).await?;
    Ok(Json(ProjectListResponse { projects }))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn get_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>, AppError> {
    let id = parse_project_id(&id)?;
    let project = load_owned(state.projects.as_ref(), id, user.0.id).await?;
    Ok(Json(ProjectResponse {
        message: None,
        project,
    }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.id))]
pub async fn update_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let id = parse_project_id(&id)?;
    let project = update_owned(state.projects.as_ref(), id, user.0.id, payload).await?;
    Ok(Json(ProjectResponse {
        message: Some("project updated"),
        project,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_project_id(&id)?;
    delete_owned(state.projects.as_ref(), id, user.0.id).await?;
    info!(project_id = %id, "project deleted");
    Ok(Json(MessageResponse {
        message: "project deleted",
    }))
}
