//! Users service assembly.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::Trace;
use crate::domain::ports::{PasswordHasher, UserRepository};
use crate::domain::{TokenCodec, UserAccountService};
use crate::inbound::http::health::{HealthState, live, ready, status};
use crate::inbound::http::state::UsersState;
use crate::inbound::http::users;

use super::{json_config, path_config};

/// Everything the users service needs to start.
pub struct UsersServerConfig {
    pub bind_addr: SocketAddr,
    pub codec: Arc<TokenCodec>,
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
}

/// A bound, not yet awaited, users service.
pub struct UsersServer {
    pub server: Server,
    pub local_addr: SocketAddr,
}

/// Build the users service application.
pub fn build_users_app(
    health_state: web::Data<HealthState>,
    state: web::Data<UsersState>,
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
        .configure(users::configure(codec))
}

/// Bind the users service.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_users_server(
    health_state: web::Data<HealthState>,
    config: UsersServerConfig,
) -> std::io::Result<UsersServer> {
    let UsersServerConfig {
        bind_addr,
        codec,
        users,
        hasher,
    } = config;
    let state = web::Data::new(UsersState::new(
        UserAccountService::new(users, hasher),
        Arc::clone(&codec),
    ));

    let server_health_state = health_state.clone();
    let http = HttpServer::new(move || {
        build_users_app(
            server_health_state.clone(),
            state.clone(),
            Arc::clone(&codec),
        )
    })
    .bind(bind_addr)?;
    let local_addr = http.addrs().first().copied().unwrap_or(bind_addr);
    let server = http.run();

    health_state.mark_ready();
    info!(%local_addr, "users service listening");
    Ok(UsersServer { server, local_addr })
}
