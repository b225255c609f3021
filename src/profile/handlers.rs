use axum::{extract::State, routing::get, Json, Router};
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::{
    auth::{
        repo_types::ProfileChanges,
        services::present,
        session::{self, AuthUser, SessionUser},
    },
    error::{AppError, AppJson},
    state::AppState,
};

use super::dto::{ProfileResponse, UpdateProfileRequest};

const MAX_AGE: i32 = 150;

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

fn validate(req: UpdateProfileRequest) -> Result<ProfileChanges, AppError> {
    if let Some(age) = req.age {
        if !(0..=MAX_AGE).contains(&age) {
            return Err(AppError::validation("age must be between 0 and 150"));
        }
    }
    Ok(ProfileChanges {
        name: present(req.name),
        username: present(req.username),
        age: req.age,
        gender: present(req.gender),
        theme: present(req.theme),
    })
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let found = state.users.find_by_id(user.0.id).await?;
    let profile = found.ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(Json(ProfileResponse {
        user: profile.into(),
    }))
}

#[instrument(skip(state, user, session, payload), fields(user_id = %user.0.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let changes = validate(payload)?;
    let updated = state
        .users
        .update_profile(user.0.id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    session::refresh(&session, SessionUser::from(&updated)).await?;
    info!("profile updated");
    Ok(Json(ProfileResponse {
        user: updated.into(),
    }))
}
