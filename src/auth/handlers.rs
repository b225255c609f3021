use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse},
        rate_limit::ClientKey,
        services,
        session::{self, AuthUser, SessionUser},
    },
    dto::MessageResponse,
    error::{AppError, AppJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = services::register(state.users.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "registration successful, you can now log in",
            user: user.into(),
        }),
    ))
}

/// The limiter runs before the body is even looked at, so a malformed request
/// still counts as an attempt.
#[instrument(skip(state, session, payload, client))]
pub async fn login(
    State(state): State<AppState>,
    client: ClientKey,
    session: Session,
    payload: Result<AppJson<LoginRequest>, AppError>,
) -> Result<Json<LoginResponse>, AppError> {
    if let Err(retry_after) = state.login_limiter.check(&client.0) {
        warn!(client = %client.0, "login rate limit exceeded");
        return Err(AppError::RateLimited { retry_after });
    }
    let AppJson(payload) = payload?;

    let user = services::authenticate(state.users.as_ref(), payload).await?;
    let snapshot = SessionUser::from(&user);
    let ttl = time::Duration::minutes(state.config.session.ttl_minutes);
    session::establish(&session, snapshot.clone(), ttl).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "login successful",
        user: snapshot,
    }))
}

pub async fn logout(
    AuthUser(user): AuthUser,
    session: Session,
) -> Result<Json<MessageResponse>, AppError> {
    session::destroy(&session).await?;
    info!(user_id = %user.id, "user logged out");
    Ok(Json(MessageResponse {
        message: "logout successful",
    }))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse { user })
}
