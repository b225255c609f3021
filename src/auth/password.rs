use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    /// Verified against when the email is unknown, so both login failures cost one
    /// Argon2 run.
    static ref DUMMY_HASH: String = hash_password("plume-dummy-Passw0rd!").unwrap_or_default();
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Runs `f` on the blocking pool; Argon2 must not stall the async workers.
pub async fn run_blocking<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("password task failed: {e}"))?
}

pub async fn hash_password_off_thread(plain: String) -> anyhow::Result<String> {
    run_blocking(move || hash_password(&plain)).await
}

/// `false` when `hash` is `None`; the work done is the same either way.
pub async fn verify_password_off_thread(
    plain: String,
    hash: Option<String>,
) -> anyhow::Result<bool> {
    run_blocking(move || match hash {
        Some(hash) => verify_password(&plain, &hash),
        None => {
            let _ = verify_password(&plain, &DUMMY_HASH);
            Ok(false)
        }
    })
    .await
}

/// Requirements of the password policy that `plain` does not meet, in a fixed order.
/// Symbols are anything other than an ASCII letter or digit (underscore included).
pub fn policy_violations(plain: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if plain.chars().count() < MIN_PASSWORD_LEN {
        missing.push("at least 8 characters");
    }
    if !plain.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("a lowercase letter");
    }
    if !plain.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("an uppercase letter");
    }
    if !plain.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a digit");
    }
    if !plain.chars().any(|c| !c.is_ascii_alphanumeric()) {
        missing.push("a symbol");
    }
    missing
}
