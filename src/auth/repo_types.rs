use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,                // lower-cased, never changes
    pub password_hash: String,        // Argon2 PHC string
    pub is_active: bool,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub theme: Option<String>,
    pub photo: Option<String>,        // public path of the uploaded picture
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Everything needed to insert a user; the id and timestamps are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial profile update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub theme: Option<String>,
}
