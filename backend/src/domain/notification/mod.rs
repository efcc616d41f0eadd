//! Post-creation ticket notifications.
//!
//! A [`NotificationJob`] is produced once per committed ticket creation and
//! consumed at most once by a [`NotificationDispatcher`] worker. There is no
//! retry state: failed deliveries are logged and dropped.

mod dispatcher;

pub use dispatcher::{
    DispatcherConfig, DispatcherConfigError, NotificationDispatcher, QueueError, ShutdownReport,
};

use super::{TicketId, TraceId};

/// Work item handed to notification workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationJob {
    /// Ticket whose creation is being announced.
    pub ticket_id: TicketId,
    /// Trace id of the request that created the ticket, if any.
    pub trace_id: Option<TraceId>,
}

impl NotificationJob {
    /// Build a job for `ticket_id`, capturing the trace id in scope.
    #[must_use]
    pub fn for_ticket(ticket_id: TicketId) -> Self {
        Self {
            ticket_id,
            trace_id: TraceId::current(),
        }
    }
}
