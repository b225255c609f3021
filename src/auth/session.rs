use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tower_sessions::{Expiry, Session};
use tracing::debug;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::error::AppError;

pub const SESSION_USER_KEY: &str = "user";
/// Unix timestamp after which the session is no longer honoured.
pub const SESSION_DEADLINE_KEY: &str = "expires_at";

/// Minimal user snapshot kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
}

impl From<&User> for SessionUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            username: u.username.clone(),
        }
    }
}

/// Resolves the authenticated user from the session cookie; rejects with 401 otherwise.
pub struct AuthUser(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;

        let Some(user) = session.get::<SessionUser>(SESSION_USER_KEY).await? else {
            return Err(AppError::unauthenticated());
        };
        match deadline(&session).await? {
            Some(at) if at <= OffsetDateTime::now_utc() => {
                debug!(user_id = %user.id, "session past its deadline");
                Err(AppError::unauthenticated())
            }
            _ => Ok(AuthUser(user)),
        }
    }
}

async fn deadline(session: &Session) -> Result<Option<OffsetDateTime>, AppError> {
    let Some(ts) = session.get::<i64>(SESSION_DEADLINE_KEY).await? else {
        return Ok(None);
    };
    let at = OffsetDateTime::from_unix_timestamp(ts)
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
    Ok(Some(at))
}

/// Binds `user` to a fresh session id that expires `ttl` after now, whatever the
/// later activity.
pub async fn establish(
    session: &Session,
    user: SessionUser,
    ttl: time::Duration,
) -> Result<(), AppError> {
    let expires_at = OffsetDateTime::now_utc() + ttl;
    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, &user).await?;
    session
        .insert(SESSION_DEADLINE_KEY, expires_at.unix_timestamp())
        .await?;
    session.set_expiry(Some(Expiry::AtDateTime(expires_at)));
    debug!(user_id = %user.id, "session established");
    Ok(())
}

/// Replaces the user snapshot without moving the deadline set by [`establish`].
/// Any write re-saves the record, so the expiry is pinned again first.
pub async fn refresh(session: &Session, user: SessionUser) -> Result<(), AppError> {
    if let Some(at) = deadline(session).await? {
        session.set_expiry(Some(Expiry::AtDateTime(at)));
    }
    session.insert(SESSION_USER_KEY, &user).await?;
    debug!(user_id = %user.id, "session snapshot refreshed");
    Ok(())
}

/// Deletes the session record; the layer then clears the cookie.
pub async fn destroy(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}
