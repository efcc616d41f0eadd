//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Another account already uses the email.
        DuplicateEmail { email: String } => "email {email} is already registered",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Store of user accounts keyed by integer id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account and return it with its assigned id.
    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by normalised email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError>;

    /// All accounts ordered by id.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Replace a stored account. Returns `false` when it no longer exists.
    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// Remove an account. Returns `false` when it did not exist.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;
}
