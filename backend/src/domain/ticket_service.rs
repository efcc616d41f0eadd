//! Ticket use-cases.
//!
//! Every mutation follows fetch, [`ensure_owner`], then write, so a denied
//! request never reaches the store. Author enrichment goes through the
//! [`AuthorDirectory`] port and can only add to a response, never fail it.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{
    AuthorDirectory, CommentPersistenceError, CommentRepository, TicketPersistenceError,
    TicketRepository,
};
use super::{
    BearerToken, Error, NewTicket, Ticket, TicketDraft, TicketId, TicketStatus, TicketUpdate,
    UserId, UserProfile, ensure_owner,
};

/// A ticket together with the outcome of resolving its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredTicket {
    pub ticket: Ticket,
    pub author: Option<UserProfile>,
    pub author_error: Option<String>,
}

/// Ticket service backing the tickets service routes.
#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketRepository>,
    comments: Arc<dyn CommentRepository>,
    authors: Arc<dyn AuthorDirectory>,
    clock: Arc<dyn Clock>,
}

impl TicketService {
    /// Create a service over the given ports.
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        comments: Arc<dyn CommentRepository>,
        authors: Arc<dyn AuthorDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tickets,
            comments,
            authors,
            clock,
        }
    }

    fn map_ticket_error(error: TicketPersistenceError) -> Error {
        match error {
            TicketPersistenceError::Query { message } => {
                Error::internal(format!("ticket repository error: {message}"))
            }
        }
    }

    fn map_comment_error(error: CommentPersistenceError) -> Error {
        match error {
            CommentPersistenceError::Query { message } => {
                Error::internal(format!("comment repository error: {message}"))
            }
        }
    }

    fn not_found(id: TicketId) -> Error {
        Error::not_found(format!("ticket {id} not found"))
    }

    async fn fetch(&self, id: TicketId) -> Result<Ticket, Error> {
        self.tickets
            .find_by_id(id)
            .await
            .map_err(Self::map_ticket_error)?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn store(&self, ticket: Ticket) -> Result<Ticket, Error> {
        if self
            .tickets
            .update(&ticket)
            .await
            .map_err(Self::map_ticket_error)?
        {
            Ok(ticket)
        } else {
            Err(Self::not_found(ticket.id))
        }
    }

    /// Persist a new ticket owned by `owner`. A successful return is the
    /// commit point for the creation notification.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn create(&self, owner: UserId, draft: TicketDraft) -> Result<Ticket, Error> {
        let ticket = self
            .tickets
            .insert(NewTicket {
                owner,
                draft,
                opened_at: self.clock.utc(),
            })
            .await
            .map_err(Self::map_ticket_error)?;
        info!(ticket_id = %ticket.id, owner = %owner, "ticket created");
        Ok(ticket)
    }

    /// Every ticket.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list(&self) -> Result<Vec<Ticket>, Error> {
        self.tickets.list().await.map_err(Self::map_ticket_error)
    }

    /// Tickets owned by `owner`.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list_mine(&self, owner: UserId) -> Result<Vec<Ticket>, Error> {
        self.tickets
            .list_by_owner(owner)
            .await
            .map_err(Self::map_ticket_error)
    }

    /// One ticket.
    ///
    /// # Errors
    /// Returns not-found when absent.
    pub async fn get(&self, id: TicketId) -> Result<Ticket, Error> {
        self.fetch(id).await
    }

    /// Apply `update` to ticket `id` on behalf of `requester`.
    ///
    /// # Errors
    /// Returns not-found or forbidden.
    pub async fn update(
        &self,
        requester: UserId,
        id: TicketId,
        update: TicketUpdate,
    ) -> Result<Ticket, Error> {
        let mut ticket = self.fetch(id).await?;
        ensure_owner(ticket.owner, requester)?;
        update.apply(&mut ticket, self.clock.utc());
        self.store(ticket).await
    }

    /// Move ticket `id` to `status` on behalf of `requester`.
    ///
    /// # Errors
    /// Returns not-found or forbidden.
    pub async fn set_status(
        &self,
        requester: UserId,
        id: TicketId,
        status: TicketStatus,
    ) -> Result<Ticket, Error> {
        let mut ticket = self.fetch(id).await?;
        ensure_owner(ticket.owner, requester)?;
        ticket.set_status(status, self.clock.utc());
        let ticket = self.store(ticket).await?;
        info!(ticket_id = %id, status = %status, "ticket status changed");
        Ok(ticket)
    }

    /// Delete ticket `id` and its comments on behalf of `requester`.
    ///
    /// # Errors
    /// Returns not-found or forbidden.
    pub async fn delete(&self, requester: UserId, id: TicketId) -> Result<(), Error> {
        let ticket = self.fetch(id).await?;
        ensure_owner(ticket.owner, requester)?;
        if !self
            .tickets
            .delete(id)
            .await
            .map_err(Self::map_ticket_error)?
        {
            return Err(Self::not_found(id));
        }
        let removed = self
            .comments
            .delete_by_ticket(id)
            .await
            .map_err(Self::map_comment_error)?;
        info!(ticket_id = %id, comments_removed = removed, "ticket deleted");
        Ok(())
    }

    /// Resolve the author of `ticket` with the caller's token.
    ///
    /// Lookup failures are folded into [`AuthoredTicket::author_error`].
    pub async fn with_author(&self, bearer: &BearerToken, ticket: Ticket) -> AuthoredTicket {
        match self.authors.fetch_author(bearer, ticket.owner).await {
            Ok(author) => AuthoredTicket {
                ticket,
                author: Some(author),
                author_error: None,
            },
            Err(error) => AuthoredTicket {
                ticket,
                author: None,
                author_error: Some(error.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    //! Ownership and enrichment behaviour with mocked ports.
    use super::*;
    use crate::domain::ports::{
        MockAuthorDirectory, MockCommentRepository, MockTicketRepository, PeerFetchError,
    };
    use crate::domain::{ErrorCode, TicketPriority};
    use crate::test_support::MutableClock;
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};

    const OWNER: UserId = UserId::new(42);
    const INTRUDER: UserId = UserId::new(7);

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    fn stored(id: TicketId) -> Ticket {
        NewTicket {
            owner: OWNER,
            draft: TicketDraft::try_new("Printer jammed", "Tray 2").expect("valid"),
            opened_at: now(),
        }
        .into_ticket(id)
    }

    struct Ports {
        tickets: MockTicketRepository,
        comments: MockCommentRepository,
        authors: MockAuthorDirectory,
    }

    impl Ports {
        fn into_service(self) -> TicketService {
            TicketService::new(
                Arc::new(self.tickets),
                Arc::new(self.comments),
                Arc::new(self.authors),
                Arc::new(MutableClock::new(now())),
            )
        }
    }

    #[fixture]
    fn ports() -> Ports {
        let mut tickets = MockTicketRepository::new();
        tickets
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id))));
        Ports {
            tickets,
            comments: MockCommentRepository::new(),
            authors: MockAuthorDirectory::new(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn non_owner_update_is_forbidden_without_writes(mut ports: Ports) {
        ports.tickets.expect_update().never();
        let update = TicketUpdate {
            title: Some("hijacked".to_owned()),
            ..TicketUpdate::default()
        };

        let error = ports
            .into_service()
            .update(INTRUDER, TicketId::new(1), update)
            .await
            .expect_err("forbidden");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn non_owner_status_change_is_forbidden_without_writes(mut ports: Ports) {
        ports.tickets.expect_update().never();

        let error = ports
            .into_service()
            .set_status(INTRUDER, TicketId::new(1), TicketStatus::Closed)
            .await
            .expect_err("forbidden");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn non_owner_delete_is_forbidden_without_writes(mut ports: Ports) {
        ports.tickets.expect_delete().never();
        ports.comments.expect_delete_by_ticket().never();

        let error = ports
            .into_service()
            .delete(INTRUDER, TicketId::new(1))
            .await
            .expect_err("forbidden");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn owner_closing_stamps_closed_at(mut ports: Ports) {
        ports
            .tickets
            .expect_update()
            .withf(|ticket| ticket.status == TicketStatus::Closed && ticket.closed_at.is_some())
            .times(1)
            .returning(|_| Ok(true));

        let ticket = ports
            .into_service()
            .set_status(OWNER, TicketId::new(1), TicketStatus::Closed)
            .await
            .expect("closed");

        assert_eq!(ticket.closed_at, Some(now()));
    }

    #[rstest]
    #[tokio::test]
    async fn owner_delete_cascades_to_comments(mut ports: Ports) {
        ports.tickets.expect_delete().times(1).returning(|_| Ok(true));
        ports
            .comments
            .expect_delete_by_ticket()
            .times(1)
            .returning(|_| Ok(3));

        ports
            .into_service()
            .delete(OWNER, TicketId::new(1))
            .await
            .expect("deleted");
    }

    #[rstest]
    #[tokio::test]
    async fn create_takes_owner_from_the_caller() {
        let mut tickets = MockTicketRepository::new();
        tickets
            .expect_insert()
            .withf(|new_ticket| new_ticket.owner == OWNER)
            .returning(|new_ticket| Ok(new_ticket.into_ticket(TicketId::new(5))));
        let service = Ports {
            tickets,
            comments: MockCommentRepository::new(),
            authors: MockAuthorDirectory::new(),
        }
        .into_service();
        let mut draft = TicketDraft::try_new("VPN down", "").expect("valid");
        draft.priority = TicketPriority::High;

        let ticket = service.create(OWNER, draft).await.expect("created");

        assert_eq!(ticket.id, TicketId::new(5));
        assert_eq!(ticket.owner, OWNER);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.opened_at, now());
    }

    #[rstest]
    #[tokio::test]
    async fn author_failure_is_reported_not_raised(mut ports: Ports) {
        ports
            .authors
            .expect_fetch_author()
            .returning(|_, _| Err(PeerFetchError::non_ok(503_u16)));
        let service = ports.into_service();

        let authored = service
            .with_author(&BearerToken::new("token"), stored(TicketId::new(1)))
            .await;

        assert!(authored.author.is_none());
        assert_eq!(
            authored.author_error.as_deref(),
            Some("users service answered with status 503")
        );
        assert_eq!(authored.ticket.id, TicketId::new(1));
    }

    #[rstest]
    #[tokio::test]
    async fn author_lookup_forwards_the_caller_token(mut ports: Ports) {
        ports
            .authors
            .expect_fetch_author()
            .withf(|bearer, owner| bearer.expose() == "caller-token" && *owner == OWNER)
            .returning(|_, owner| {
                Ok(UserProfile {
                    id: owner,
                    name: "Ana".to_owned(),
                    email: "ana@example.com".to_owned(),
                    role: "client".to_owned(),
                    phone: String::new(),
                })
            });
        let service = ports.into_service();

        let authored = service
            .with_author(&BearerToken::new("caller-token"), stored(TicketId::new(1)))
            .await;

        assert_eq!(authored.author.map(|author| author.id), Some(OWNER));
        assert!(authored.author_error.is_none());
    }
}
