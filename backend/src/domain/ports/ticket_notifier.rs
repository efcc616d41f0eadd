//! Port invoked by notification workers once per created ticket.
use async_trait::async_trait;

use crate::domain::NotificationJob;

use super::define_port_error;

define_port_error! {
    /// Delivery failures. Logged by the worker and never retried.
    pub enum NotifyError {
        /// The sink rejected or could not receive the notification.
        Delivery { message: String } => "notification delivery failed: {message}",
    }
}

/// Delivers ticket-created notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketNotifier: Send + Sync {
    /// Deliver one notification. Called at most once per job.
    async fn ticket_created(&self, job: &NotificationJob) -> Result<(), NotifyError>;
}
