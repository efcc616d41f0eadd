//! Port abstraction for ticket persistence adapters.
use async_trait::async_trait;

use crate::domain::{NewTicket, Ticket, TicketId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by ticket repository adapters.
    pub enum TicketPersistenceError {
        /// Query or mutation failed during execution.
        Query { message: String } => "ticket repository query failed: {message}",
    }
}

/// Store of tickets keyed by integer id.
///
/// A successful [`TicketRepository::insert`] is the commit point after which
/// the creation notification may be enqueued.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Persist a new ticket and return it with its assigned id.
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, TicketPersistenceError>;

    /// Fetch a ticket by identifier.
    async fn find_by_id(&self, id: TicketId) -> Result<Option<Ticket>, TicketPersistenceError>;

    /// All tickets ordered by id.
    async fn list(&self) -> Result<Vec<Ticket>, TicketPersistenceError>;

    /// Tickets owned by `owner`, ordered by id.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Ticket>, TicketPersistenceError>;

    /// Replace a stored ticket. Returns `false` when it no longer exists.
    async fn update(&self, ticket: &Ticket) -> Result<bool, TicketPersistenceError>;

    /// Remove a ticket. Returns `false` when it did not exist.
    async fn delete(&self, id: TicketId) -> Result<bool, TicketPersistenceError>;
}
