use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Table;
use crate::domain::ports::{TicketPersistenceError, TicketRepository};
use crate::domain::{NewTicket, Ticket, TicketId, UserId};

#[derive(Debug, Default)]
pub struct InMemoryTicketRepository {
    table: RwLock<Table<Ticket>>,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, TicketPersistenceError> {
        let mut table = self.table.write().await;
        let id = TicketId::new(table.allocate_id());
        let stored = ticket.into_ticket(id);
        table.rows.insert(id.get(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: TicketId) -> Result<Option<Ticket>, TicketPersistenceError> {
        Ok(self.table.read().await.rows.get(&id.get()).cloned())
    }

    async fn list(&self) -> Result<Vec<Ticket>, TicketPersistenceError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Ticket>, TicketPersistenceError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|ticket| ticket.owner == owner)
            .cloned()
            .collect())
    }

    async fn update(&self, ticket: &Ticket) -> Result<bool, TicketPersistenceError> {
        Ok(self
            .table
            .write()
            .await
            .replace(ticket.id.get(), ticket.clone()))
    }

    async fn delete(&self, id: TicketId) -> Result<bool, TicketPersistenceError> {
        Ok(self.table.write().await.rows.remove(&id.get()).is_some())
    }
}
