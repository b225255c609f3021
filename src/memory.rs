//! In-memory repositories backing the tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{
    repo::UserRepo,
    repo_types::{NewUser, ProfileChanges, User},
};
use crate::db::RepoError;
use crate::projects::{repo::ProjectRepo, repo_types::Project};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    /// Paired with an insertion counter standing in for the `seq` column.
    projects: Vec<(u64, Project)>,
    next_seq: u64,
}

#[derive(Default)]
pub struct InMemoryRepo {
    tables: Mutex<Tables>,
    conflict_on_next_create: AtomicBool,
}

impl InMemoryRepo {
    /// Makes the next user insert fail as if a concurrent request had just taken
    /// the username.
    pub fn fail_next_create_with_conflict(&self) {
        self.conflict_on_next_create.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepo for InMemoryRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.lock();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.lock();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepoError> {
        let tables = self.tables.lock();
        Ok(tables.users.iter().any(|u| u.username == username))
    }

    async fn email_or_username_exists(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, RepoError> {
        let tables = self.tables.lock();
        Ok(tables
            .users
            .iter()
            .any(|u| u.email == email || u.username == username))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        if self.conflict_on_next_create.swap(false, Ordering::SeqCst) {
            return Err(RepoError::Conflict("users_username_key".into()));
        }
        let mut tables = self.tables.lock();
        if tables.users.iter().any(|u| u.email == new_user.email) {
            return Err(RepoError::Conflict("users_email_key".into()));
        }
        if tables.users.iter().any(|u| u.username == new_user.username) {
            return Err(RepoError::Conflict("users_username_key".into()));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_active: true,
            age: None,
            gender: None,
            theme: None,
            photo: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<User>, RepoError> {
        let mut tables = self.tables.lock();
        if let Some(username) = &changes.username {
            if tables
                .users
                .iter()
                .any(|u| u.id != id && &u.username == username)
            {
                return Err(RepoError::Conflict("users_username_key".into()));
            }
        }
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(age) = changes.age {
            user.age = Some(age);
        }
        if let Some(gender) = changes.gender {
            user.gender = Some(gender);
        }
        if let Some(theme) = changes.theme {
            user.theme = Some(theme);
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

#[async_trait]
impl ProjectRepo for InMemoryRepo {
    async fn create(
        &self,
        owner: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Project, RepoError> {
        let now = OffsetDateTime::now_utc();
        let project = Project {
            id: Uuid::new_v4(),
            user_id: owner,
            title: title.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.lock();
        tables.next_seq += 1;
        let seq = tables.next_seq;
        tables.projects.push((seq, project.clone()));
        Ok(project)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Project>, RepoError> {
        let tables = self.tables.lock();
        let mut rows: Vec<&(u64, Project)> = tables
            .projects
            .iter()
            .filter(|(_, p)| p.user_id == owner)
            .collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq_b.cmp(seq_a))
        });
        Ok(rows.into_iter().map(|(_, p)| p.clone()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, RepoError> {
        let tables = self.tables.lock();
        Ok(tables
            .projects
            .iter()
            .find(|(_, p)| p.id == id)
            .map(|(_, p)| p.clone()))
    }

    async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Option<Project>, RepoError> {
        let mut tables = self.tables.lock();
        let Some((_, project)) = tables.projects.iter_mut().find(|(_, p)| p.id == id) else {
            return Ok(None);
        };
        project.title = title.to_string();
        project.description = description.to_string();
        project.updated_at = OffsetDateTime::now_utc();
        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.lock();
        let before = tables.projects.len();
        tables.projects.retain(|(_, p)| p.id != id);
        Ok(tables.projects.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn equal_timestamps_list_newest_insert_first() {
        let repo = InMemoryRepo::default();
        let owner = Uuid::new_v4();
        for title in ["one", "two", "three"] {
            ProjectRepo::create(&repo, owner, title, "").await.unwrap();
        }
        let frozen = OffsetDateTime::now_utc();
        for (_, p) in repo.tables.lock().projects.iter_mut() {
            p.created_at = frozen;
        }

        let titles: Vec<String> = repo
            .list_by_owner(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["three", "two", "one"]);
    }
}
