//! Comment use-cases. Comments hang off an existing ticket and only their
//! author may edit or remove them.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{
    CommentPersistenceError, CommentRepository, TicketPersistenceError, TicketRepository,
};
use super::{Comment, CommentBody, CommentId, Error, NewComment, TicketId, UserId, ensure_owner};

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    tickets: Arc<dyn TicketRepository>,
    clock: Arc<dyn Clock>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        tickets: Arc<dyn TicketRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            comments,
            tickets,
            clock,
        }
    }

    fn map_comment_error(error: CommentPersistenceError) -> Error {
        match error {
            CommentPersistenceError::Query { message } => {
                Error::internal(format!("comment repository error: {message}"))
            }
        }
    }

    fn map_ticket_error(error: TicketPersistenceError) -> Error {
        match error {
            TicketPersistenceError::Query { message } => {
                Error::internal(format!("ticket repository error: {message}"))
            }
        }
    }

    fn not_found(id: CommentId) -> Error {
        Error::not_found(format!("comment {id} not found"))
    }

    async fn ensure_ticket_exists(&self, ticket_id: TicketId) -> Result<(), Error> {
        self.tickets
            .find_by_id(ticket_id)
            .await
            .map_err(Self::map_ticket_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("ticket {ticket_id} not found")))
    }

    async fn fetch(&self, id: CommentId) -> Result<Comment, Error> {
        self.comments
            .find_by_id(id)
            .await
            .map_err(Self::map_comment_error)?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Attach a comment by `owner` to ticket `ticket_id`.
    ///
    /// # Errors
    /// Returns not-found when the ticket does not exist.
    pub async fn add(
        &self,
        owner: UserId,
        ticket_id: TicketId,
        body: CommentBody,
    ) -> Result<Comment, Error> {
        self.ensure_ticket_exists(ticket_id).await?;
        let comment = self
            .comments
            .insert(NewComment {
                ticket_id,
                owner,
                body,
                created_at: self.clock.utc(),
            })
            .await
            .map_err(Self::map_comment_error)?;
        info!(comment_id = %comment.id, ticket_id = %ticket_id, "comment added");
        Ok(comment)
    }

    /// Comments on one ticket.
    ///
    /// # Errors
    /// Returns not-found when the ticket does not exist.
    pub async fn list_for_ticket(&self, ticket_id: TicketId) -> Result<Vec<Comment>, Error> {
        self.ensure_ticket_exists(ticket_id).await?;
        self.comments
            .list_by_ticket(ticket_id)
            .await
            .map_err(Self::map_comment_error)
    }

    /// Comments written by `owner`.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list_for_user(&self, owner: UserId) -> Result<Vec<Comment>, Error> {
        self.comments
            .list_by_owner(owner)
            .await
            .map_err(Self::map_comment_error)
    }

    /// Replace the body of comment `id` on behalf of `requester`.
    ///
    /// # Errors
    /// Returns not-found or forbidden.
    pub async fn update(
        &self,
        requester: UserId,
        id: CommentId,
        body: CommentBody,
    ) -> Result<Comment, Error> {
        let mut comment = self.fetch(id).await?;
        ensure_owner(comment.owner, requester)?;
        comment.body = body.into_inner();
        comment.updated_at = self.clock.utc();
        if !self
            .comments
            .update(&comment)
            .await
            .map_err(Self::map_comment_error)?
        {
            return Err(Self::not_found(id));
        }
        Ok(comment)
    }

    /// Remove comment `id` on behalf of `requester`.
    ///
    /// # Errors
    /// Returns not-found or forbidden.
    pub async fn delete(&self, requester: UserId, id: CommentId) -> Result<(), Error> {
        let comment = self.fetch(id).await?;
        ensure_owner(comment.owner, requester)?;
        if !self
            .comments
            .delete(id)
            .await
            .map_err(Self::map_comment_error)?
        {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
