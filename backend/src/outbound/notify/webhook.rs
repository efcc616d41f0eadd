//! Webhook notifier: POSTs `{"ticketId": id}` to a configured URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::domain::ports::{NotifyError, TicketNotifier};
use crate::domain::{NotificationJob, TRACE_ID_HEADER, TicketId};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TicketCreatedPayload {
    ticket_id: TicketId,
}

pub struct WebhookTicketNotifier {
    client: Client,
    url: Url,
}

impl WebhookTicketNotifier {
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl TicketNotifier for WebhookTicketNotifier {
    async fn ticket_created(&self, job: &NotificationJob) -> Result<(), NotifyError> {
        let mut request = self.client.post(self.url.clone()).json(&TicketCreatedPayload {
            ticket_id: job.ticket_id,
        });
        if let Some(trace_id) = job.trace_id {
            request = request.header(TRACE_ID_HEADER, trace_id.to_string());
        }
        let response = request
            .send()
            .await
            .map_err(|error| NotifyError::delivery(error.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::delivery(format!(
                "webhook answered with status {}",
                status.as_u16()
            )))
        }
    }
}
