//! Tickets service assembly, including the notification pool lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::Clock;
use tracing::{info, warn};

use crate::Trace;
use crate::domain::ports::{AuthorDirectory, CommentRepository, TicketNotifier, TicketRepository};
use crate::domain::{
    CommentService, DispatcherConfig, NotificationDispatcher, ShutdownReport, TicketService,
    TokenCodec,
};
use crate::inbound::http::health::{HealthState, live, ready, status};
use crate::inbound::http::state::TicketsState;
use crate::inbound::http::tickets;

use super::{json_config, path_config};

/// Everything the tickets service needs to start.
pub struct TicketsServerConfig {
    pub bind_addr: SocketAddr,
    pub codec: Arc<TokenCodec>,
    pub tickets: Arc<dyn TicketRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub authors: Arc<dyn AuthorDirectory>,
    pub notifier: Arc<dyn TicketNotifier>,
    pub dispatcher: DispatcherConfig,
    pub clock: Arc<dyn Clock>,
}

/// A bound tickets service and the notification pool it feeds.
pub struct TicketsServer {
    server: Server,
    local_addr: SocketAddr,
    dispatcher: Arc<NotificationDispatcher>,
    health_state: web::Data<HealthState>,
}

impl TicketsServer {
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle for stopping the HTTP server from another task.
    #[must_use]
    pub fn handle(&self) -> ServerHandle {
        self.server.handle()
    }

    #[must_use]
    pub fn dispatcher(&self) -> Arc<NotificationDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Serve until the server stops, then mark the service unhealthy and
    /// drain the notification pool within `grace`.
    ///
    /// # Errors
    /// Propagates the server's I/O error. The pool is drained either way.
    pub async fn run(self, grace: Duration) -> std::io::Result<ShutdownReport> {
        let Self {
            server,
            dispatcher,
            health_state,
            ..
        } = self;
        let served = server.await;
        health_state.mark_unhealthy();
        let report = dispatcher.shutdown(grace).await;
        if report.aborted > 0 {
            warn!(
                drained = report.drained,
                aborted = report.aborted,
                "notification workers aborted after grace period"
            );
        } else {
            info!(drained = report.drained, "notification pool drained");
        }
        served.map(|()| report)
    }
}

/// Build the tickets service application.
pub fn build_tickets_app(
    health_state: web::Data<HealthState>,
    state: web::Data<TicketsState>,
    codec: Arc<TokenCodec>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(state)
        .app_data(json_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(status)
        .service(ready)
        .service(live)
        .configure(tickets::configure(codec))
}

/// Start the notification pool and bind the tickets service.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
/// Returns [`std::io::Error`] for an invalid dispatcher configuration or
/// when binding the socket fails.
pub fn create_tickets_server(
    health_state: web::Data<HealthState>,
    config: TicketsServerConfig,
) -> std::io::Result<TicketsServer> {
    let TicketsServerConfig {
        bind_addr,
        codec,
        tickets,
        comments,
        authors,
        notifier,
        dispatcher,
        clock,
    } = config;
    let dispatcher = Arc::new(
        NotificationDispatcher::start(dispatcher, notifier)
            .map_err(|err| std::io::Error::other(format!("notification pool: {err}")))?,
    );
    let state = web::Data::new(TicketsState {
        tickets: TicketService::new(
            Arc::clone(&tickets),
            Arc::clone(&comments),
            authors,
            Arc::clone(&clock),
        ),
        comments: CommentService::new(comments, tickets, clock),
        dispatcher: Arc::clone(&dispatcher),
    });

    let server_health_state = health_state.clone();
    let http = HttpServer::new(move || {
        build_tickets_app(
            server_health_state.clone(),
            state.clone(),
            Arc::clone(&codec),
        )
    })
    .bind(bind_addr)?;
    let local_addr = http.addrs().first().copied().unwrap_or(bind_addr);
    let server = http.run();

    health_state.mark_ready();
    info!(%local_addr, "tickets service listening");
    Ok(TicketsServer {
        server,
        local_addr,
        dispatcher,
        health_state,
    })
}
