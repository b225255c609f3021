use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::db::RepoError;

/// Every failure a handler can return. The HTTP status is derived from the
/// variant alone, see [`AppError::status`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Authentication(String),

    #[error("too many login attempts, retry in {} minutes", retry_minutes(.retry_after))]
    RateLimited { retry_after: Duration },

    #[error("{0}")]
    NotFound(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

fn retry_minutes(d: &Duration) -> u64 {
    d.as_secs().div_ceil(60).max(1)
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthenticated() -> Self {
        Self::Authentication("authentication required".into())
    }

    pub fn invalid_credentials() -> Self {
        Self::Authentication("invalid credentials".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(e) => {
                error!(error = %format!("{e:#}"), "request failed");
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
            AppError::RateLimited { retry_after } => {
                let secs = retry_after.as_secs().max(1);
                let mut res = (
                    status,
                    Json(json!({ "error": self.to_string(), "retry_after_secs": secs })),
                )
                    .into_response();
                res.headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                res
            }
            _ => (status, Json(json!({ "error": self.to_string() }))).into_response(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(_) => {
                AppError::Conflict("email or username already in use".into())
            }
            RepoError::Other(e) => AppError::Internal(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Internal(anyhow::anyhow!("session store: {e}"))
    }
}

/// `Json` extractor whose rejection is an [`AppError`], so malformed bodies get
/// the same `{"error": ...}` shape as every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
