//! User account use-cases: registration, login and owner-guarded edits.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::ports::{
    LoginService, PasswordHashError, PasswordHasher, UserPersistenceError, UserRepository,
};
use super::{
    Error, Identity, LoginCredentials, Registration, UserChanges, UserId, UserProfile, ensure_owner,
};

/// Account service backing the users service routes.
#[derive(Clone)]
pub struct UserAccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserAccountService {
    /// Create a service over the given store and hasher.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::DuplicateEmail { email } => {
                Error::conflict("email is already registered")
                    .with_details(json!({ "field": "email", "value": email }))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(error.to_string())
    }

    fn not_found(id: UserId) -> Error {
        Error::not_found(format!("user {id} not found"))
    }

    async fn ensure_email_free(&self, email: &str, except: Option<UserId>) -> Result<(), Error> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(Self::map_user_error)?;
        match existing {
            Some(user) if Some(user.id) != except => Err(Self::map_user_error(
                UserPersistenceError::duplicate_email(email),
            )),
            _ => Ok(()),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    /// Returns a conflict when the email is taken.
    pub async fn register(&self, registration: Registration) -> Result<UserProfile, Error> {
        self.ensure_email_free(registration.email(), None).await?;
        let hash = self
            .hasher
            .hash(registration.password())
            .map_err(Self::map_hash_error)?;
        let user = self
            .users
            .insert(registration.into_new_user(hash))
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %user.id, "user registered");
        Ok(user.profile())
    }

    /// Public record of one account.
    ///
    /// # Errors
    /// Returns not-found when the account does not exist.
    pub async fn get(&self, id: UserId) -> Result<UserProfile, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)?
            .map(|user| user.profile())
            .ok_or_else(|| Self::not_found(id))
    }

    /// Public records of every account.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list(&self) -> Result<Vec<UserProfile>, Error> {
        let users = self.users.list().await.map_err(Self::map_user_error)?;
        Ok(users.iter().map(|user| user.profile()).collect())
    }

    /// Apply `changes` to account `id` on behalf of `requester`.
    ///
    /// # Errors
    /// Returns not-found, forbidden for anyone but the account holder, or a
    /// conflict when the new email is taken.
    pub async fn update(
        &self,
        requester: UserId,
        id: UserId,
        changes: UserChanges,
    ) -> Result<UserProfile, Error> {
        let mut user = self
            .users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Self::not_found(id))?;
        ensure_owner(user.id, requester)?;
        if let Some(email) = changes.email() {
            self.ensure_email_free(email, Some(user.id)).await?;
        }

        changes.apply(&mut user);
        if !self
            .users
            .update(&user)
            .await
            .map_err(Self::map_user_error)?
        {
            return Err(Self::not_found(id));
        }
        Ok(user.profile())
    }

    /// Delete account `id` on behalf of `requester`.
    ///
    /// # Errors
    /// Returns not-found or forbidden.
    pub async fn delete(&self, requester: UserId, id: UserId) -> Result<(), Error> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Self::not_found(id))?;
        ensure_owner(user.id, requester)?;
        if !self
            .users
            .delete(id)
            .await
            .map_err(Self::map_user_error)?
        {
            return Err(Self::not_found(id));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl LoginService for UserAccountService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Identity, Error> {
        let invalid = || Error::unauthorized("invalid email or password");
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Self::map_user_error)?
        else {
            return Err(invalid());
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .map_err(Self::map_hash_error)?;
        if matches { Ok(user.identity()) } else { Err(invalid()) }
    }
}
