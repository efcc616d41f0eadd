use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Table;
use crate::domain::ports::{CommentPersistenceError, CommentRepository};
use crate::domain::{Comment, CommentId, NewComment, TicketId, UserId};

#[derive(Debug, Default)]
pub struct InMemoryCommentRepository {
    table: RwLock<Table<Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn insert(&self, comment: NewComment) -> Result<Comment, CommentPersistenceError> {
        let mut table = self.table.write().await;
        let id = CommentId::new(table.allocate_id());
        let stored = comment.into_comment(id);
        table.rows.insert(id.get(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, CommentPersistenceError> {
        Ok(self.table.read().await.rows.get(&id.get()).cloned())
    }

    async fn list_by_ticket(
        &self,
        ticket_id: TicketId,
    ) -> Result<Vec<Comment>, CommentPersistenceError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|comment| comment.ticket_id == ticket_id)
            .cloned()
            .collect())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Comment>, CommentPersistenceError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|comment| comment.owner == owner)
            .cloned()
            .collect())
    }

    async fn update(&self, comment: &Comment) -> Result<bool, CommentPersistenceError> {
        Ok(self
            .table
            .write()
            .await
            .replace(comment.id.get(), comment.clone()))
    }

    async fn delete(&self, id: CommentId) -> Result<bool, CommentPersistenceError> {
        Ok(self.table.write().await.rows.remove(&id.get()).is_some())
    }

    async fn delete_by_ticket(&self, ticket_id: TicketId) -> Result<usize, CommentPersistenceError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|_, comment| comment.ticket_id != ticket_id);
        Ok(before - table.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommentBody;
    use chrono::DateTime;

    fn new_comment(ticket: i64) -> NewComment {
        NewComment {
            ticket_id: TicketId::new(ticket),
            owner: UserId::new(42),
            body: CommentBody::try_new("rebooted").expect("valid"),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
        }
    }

    #[tokio::test]
    async fn delete_by_ticket_removes_only_that_ticket() {
        let repo = InMemoryCommentRepository::new();
        repo.insert(new_comment(1)).await.expect("insert");
        repo.insert(new_comment(1)).await.expect("insert");
        repo.insert(new_comment(2)).await.expect("insert");

        let removed = repo.delete_by_ticket(TicketId::new(1)).await.expect("cascade");

        assert_eq!(removed, 2);
        assert!(repo
            .list_by_ticket(TicketId::new(1))
            .await
            .expect("list")
            .is_empty());
        assert_eq!(
            repo.list_by_ticket(TicketId::new(2)).await.expect("list").len(),
            1
        );
    }
}
