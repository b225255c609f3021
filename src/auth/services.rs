use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{
    dto::{LoginRequest, RegisterRequest},
    password::{hash_password_off_thread, policy_violations, verify_password_off_thread},
    repo::UserRepo,
    repo_types::{NewUser, User},
};
use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First free username among `base`, `base1`, `base2`, ...
async fn free_username(users: &dyn UserRepo, base: &str) -> Result<String, AppError> {
    let mut candidate = base.to_string();
    let mut counter: u64 = 1;
    while users.username_exists(&candidate).await? {
        candidate = format!("{base}{counter}");
        counter += 1;
    }
    Ok(candidate)
}

pub async fn register(users: &dyn UserRepo, req: RegisterRequest) -> Result<User, AppError> {
    let nom = present(req.nom);
    let prenom = present(req.prenom);
    let email = present(req.email).map(|e| e.to_lowercase());
    let password = present(req.password);

    let (Some(nom), Some(prenom), Some(email), Some(password)) = (nom, prenom, email, password)
    else {
        return Err(AppError::validation(
            "nom, prenom, email and password are required",
        ));
    };

    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::validation("invalid email"));
    }

    let missing = policy_violations(&password);
    if !missing.is_empty() {
        warn!("password rejected by policy");
        return Err(AppError::Validation(format!(
            "password too weak: it must contain {}",
            missing.join(", ")
        )));
    }

    let username = match present(req.username) {
        Some(u) => u,
        None => {
            let base = email.split('@').next().unwrap_or_default();
            free_username(users, base).await?
        }
    };

    if users.email_or_username_exists(&email, &username).await? {
        warn!(%email, %username, "email or username already registered");
        return Err(AppError::Conflict(
            "email or username already in use".into(),
        ));
    }

    let password_hash = hash_password_off_thread(password).await?;
    let user = users
        .create(NewUser {
            name: format!("{prenom} {nom}"),
            username,
            email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Checks credentials. Unknown email and wrong password fail identically.
pub async fn authenticate(users: &dyn UserRepo, req: LoginRequest) -> Result<User, AppError> {
    let email = present(req.email).map(|e| e.to_lowercase());
    let password = present(req.password);
    let (Some(email), Some(password)) = (email, password) else {
        return Err(AppError::validation("email and password are required"));
    };

    let user = users.find_by_email(&email).await?;
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let matched = verify_password_off_thread(password, stored_hash).await?;

    match user {
        Some(user) if matched => Ok(user),
        Some(user) => {
            warn!(user_id = %user.id, "login invalid password");
            Err(AppError::invalid_credentials())
        }
        None => {
            warn!(%email, "login unknown email");
            Err(AppError::invalid_credentials())
        }
    }
}
