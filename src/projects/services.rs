use uuid::Uuid;

use crate::auth::services::present;
use crate::error::AppError;
use crate::projects::{dto::UpdateProjectRequest, repo::ProjectRepo, repo_types::Project};

pub fn parse_project_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::validation("invalid project id"))
}

fn not_found() -> AppError {
    AppError::NotFound("project not found".into())
}

/// Loads a project for `owner`. A project owned by someone else is reported
/// exactly like a missing one.
pub async fn load_owned(
    projects: &dyn ProjectRepo,
    id: Uuid,
    owner: Uuid,
) -> Result<Project, AppError> {
    match projects.find_by_id(id).await? {
        Some(p) if p.user_id == owner => Ok(p),
        _ => Err(not_found()),
    }
}

/// Title and description after applying `changes` to `current`. A blank title
/// keeps the current one; a supplied description is trimmed and may be empty.
pub fn merge_changes(current: &Project, changes: UpdateProjectRequest) -> (String, String) {
    let title = present(changes.title).unwrap_or_else(|| current.title.clone());
    let description = match changes.description {
        Some(d) => d.trim().to_string(),
        None => current.description.clone(),
    };
    (title, description)
}

pub async fn update_owned(
    projects: &dyn ProjectRepo,
    id: Uuid,
    owner: Uuid,
    changes: UpdateProjectRequest,
) -> Result<Project, AppError> {
    let current = load_owned(projects, id, owner).await?;
    let (title, description) = merge_changes(&current, changes);
    projects
        .update(id, &title, &description)
        .await?
        .ok_or_else(not_found)
}

pub async fn delete_owned(
    projects: &dyn ProjectRepo,
    id: Uuid,
    owner: Uuid,
) -> Result<(), AppError> {
    load_owned(projects, id, owner).await?;
    if projects.delete(id).await? {
        Ok(())
    } else {
        Err(not_found())
    }
}
