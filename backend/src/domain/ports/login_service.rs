//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to check credentials without knowing the backing
//! store, which keeps HTTP handler tests free of persistence wiring.

use async_trait::async_trait;

use crate::domain::{Error, Identity, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the identity to embed in a token.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Identity, Error>;
}
