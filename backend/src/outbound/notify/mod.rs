//! Ticket notifier adapters.

mod webhook;

pub use webhook::WebhookTicketNotifier;

use async_trait::async_trait;
use tracing::info;

use crate::domain::NotificationJob;
use crate::domain::ports::{NotifyError, TicketNotifier};

/// Notifier that emits one structured log event per created ticket.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTicketNotifier;

#[async_trait]
impl TicketNotifier for LoggingTicketNotifier {
    async fn ticket_created(&self, job: &NotificationJob) -> Result<(), NotifyError> {
        info!(
            ticket_id = %job.ticket_id,
            trace_id = job.trace_id.map(|id| id.to_string()).as_deref(),
            "ticket created"
        );
        Ok(())
    }
}
