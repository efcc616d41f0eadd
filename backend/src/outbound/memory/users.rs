use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Table;
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserId};

/// Account store with a unique email index enforced on write.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(table: &Table<User>, email: &str, except: Option<UserId>) -> bool {
    table
        .rows
        .values()
        .any(|user| user.email == email && Some(user.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        let mut table = self.table.write().await;
        if email_taken(&table, &user.email, None) {
            return Err(UserPersistenceError::duplicate_email(user.email));
        }
        let id = UserId::new(table.allocate_id());
        let stored = User {
            id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            document: user.document,
            password_hash: user.password_hash,
        };
        table.rows.insert(id.get(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.table.read().await.rows.get(&id.get()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|user| user.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut table = self.table.write().await;
        if email_taken(&table, &user.email, Some(user.id)) {
            return Err(UserPersistenceError::duplicate_email(user.email.clone()));
        }
        Ok(table.replace(user.id.get(), user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.table.write().await.rows.remove(&id.get()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana".to_owned(),
            email: email.to_owned(),
            role: "client".to_owned(),
            phone: String::new(),
            document: String::new(),
            password_hash: "hash".to_owned(),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_not_reused() {
        let repo = InMemoryUserRepository::new();
        let first = repo.insert(new_user("a@example.com")).await.expect("insert");
        repo.delete(first.id).await.expect("delete");
        let second = repo.insert(new_user("b@example.com")).await.expect("insert");

        assert_eq!(first.id, UserId::new(1));
        assert_eq!(second.id, UserId::new(2));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert(new_user("a@example.com")).await.expect("insert");

        let error = repo
            .insert(new_user("a@example.com"))
            .await
            .expect_err("duplicate");

        assert!(matches!(error, UserPersistenceError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn update_of_missing_row_reports_false() {
        let repo = InMemoryUserRepository::new();
        let mut ghost = repo.insert(new_user("a@example.com")).await.expect("insert");
        repo.delete(ghost.id).await.expect("delete");
        ghost.name = "Ghost".to_owned();

        assert!(!repo.update(&ghost).await.expect("update"));
    }
}
