//! Port abstraction for comment persistence adapters.
use async_trait::async_trait;

use crate::domain::{Comment, CommentId, NewComment, TicketId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by comment repository adapters.
    pub enum CommentPersistenceError {
        /// Query or mutation failed during execution.
        Query { message: String } => "comment repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Persist a new comment and return it with its assigned id.
    async fn insert(&self, comment: NewComment) -> Result<Comment, CommentPersistenceError>;

    /// Fetch a comment by identifier.
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, CommentPersistenceError>;

    /// Comments on one ticket, oldest first.
    async fn list_by_ticket(
        &self,
        ticket_id: TicketId,
    ) -> Result<Vec<Comment>, CommentPersistenceError>;

    /// Comments written by one user, oldest first.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Comment>, CommentPersistenceError>;

    /// Replace a stored comment. Returns `false` when it no longer exists.
    async fn update(&self, comment: &Comment) -> Result<bool, CommentPersistenceError>;

    /// Remove a comment. Returns `false` when it did not exist.
    async fn delete(&self, id: CommentId) -> Result<bool, CommentPersistenceError>;

    /// Remove every comment of a ticket and return how many were removed.
    async fn delete_by_ticket(&self, ticket_id: TicketId) -> Result<usize, CommentPersistenceError>;
}
