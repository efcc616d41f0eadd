//! Tickets service entry-point: tickets, comments and creation notifications.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use helpdesk::domain::TokenCodec;
use helpdesk::domain::ports::TicketNotifier;
use helpdesk::inbound::http::health::HealthState;
use helpdesk::outbound::memory::{InMemoryCommentRepository, InMemoryTicketRepository};
use helpdesk::outbound::notify::{LoggingTicketNotifier, WebhookTicketNotifier};
use helpdesk::outbound::peer::HttpAuthorDirectory;
use helpdesk::server::{TicketsServerConfig, create_tickets_server};
use helpdesk::settings::{HelpdeskSettings, TICKETS_DEFAULT_BIND};
use helpdesk::telemetry;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::info;

fn build_notifier(settings: &HelpdeskSettings) -> Result<Arc<dyn TicketNotifier>> {
    match settings.notify_webhook_url()? {
        Some(url) => {
            info!(%url, "ticket notifications go to webhook");
            Ok(Arc::new(
                WebhookTicketNotifier::new(url, settings.peer_timeout())
                    .wrap_err("build webhook client")?,
            ))
        }
        None => Ok(Arc::new(LoggingTicketNotifier)),
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = HelpdeskSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("load configuration: {err}"))?;
    let _telemetry = telemetry::init("tickets-service", settings.log_dir.as_deref())
        .wrap_err("initialise logging")?;

    let clock = Arc::new(DefaultClock);
    let codec = TokenCodec::from_secret(&settings.jwt_secret()?, settings.token_ttl(), clock.clone())?;
    let authors = HttpAuthorDirectory::new(settings.users_service_url()?, settings.peer_timeout())?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_tickets_server(
        health_state,
        TicketsServerConfig {
            bind_addr: settings.bind_addr(TICKETS_DEFAULT_BIND)?,
            codec: Arc::new(codec),
            tickets: Arc::new(InMemoryTicketRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            authors: Arc::new(authors),
            notifier: build_notifier(&settings)?,
            dispatcher: settings.dispatcher(),
            clock,
        },
    )?;

    let report = server.run(settings.shutdown_grace()).await?;
    info!(
        drained = report.drained,
        aborted = report.aborted,
        "tickets service stopped"
    );
    Ok(())
}
