//! Port for resolving a ticket owner's public record from the users service.
//!
//! The caller's bearer token is forwarded as-is; the users service makes its
//! own authorization decision. Adapters hold the token for one outbound call
//! only.

use async_trait::async_trait;

use crate::domain::{BearerToken, UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Ways an author lookup can fail. Callers treat them alike and return
    /// the ticket without an author.
    pub enum PeerFetchError {
        /// The users service did not answer within the timeout.
        Timeout { message: String } => "users service timed out: {message}",
        /// Connection or protocol failure before a status was received.
        Transport { message: String } => "users service unreachable: {message}",
        /// The users service answered with a non-200 status.
        NonOk { status: u16 } => "users service answered with status {status}",
        /// The body was not a user profile.
        Decode { message: String } => "users service payload could not be decoded: {message}",
    }
}

impl PeerFetchError {
    /// Stable label for structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
            Self::NonOk { .. } => "non_ok",
            Self::Decode { .. } => "decode",
        }
    }
}

/// Resolves user profiles on behalf of an authenticated caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorDirectory: Send + Sync {
    /// Fetch the public record of `owner`, presenting `bearer`.
    async fn fetch_author(
        &self,
        bearer: &BearerToken,
        owner: UserId,
    ) -> Result<UserProfile, PeerFetchError>;
}
