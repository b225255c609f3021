use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::RepoError;
use crate::projects::repo_types::Project;

#[async_trait]
pub trait ProjectRepo: Send + Sync {
    async fn create(
        &self,
        owner: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Project, RepoError>;

    /// Projects of `owner`, newest first; equal timestamps keep reverse insertion order.
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Project>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, RepoError>;

    /// Overwrites title and description. `None` when the row is gone.
    async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Option<Project>, RepoError>;

    /// `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[derive(Clone)]
pub struct PgProjectRepo {
    db: PgPool,
}

impl PgProjectRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProjectRepo for PgProjectRepo {
    async fn create(
        &self,
        owner: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Project, RepoError> {
        let now = OffsetDateTime::now_utc();
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (id, user_id, title, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, user_id, title, description, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(title)
        .bind(description)
        .bind(now)
        .fetch_one(&self.db)
        .await?;
        Ok(project)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Project>, RepoError> {
        let rows = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, user_id, title, description, created_at, updated_at
            FROM projects
            WHERE user_id = $1
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, RepoError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, user_id, title, description, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(project)
    }

    async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Option<Project>, RepoError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
               SET title = $2, description = $3, updated_at = now()
             WHERE id = $1
            RETURNING id, user_id, title, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .fetch_optional(&self.db)
        .await?;
        Ok(project)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
