//! Users service entry-point: accounts, login and public user records.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use helpdesk::domain::TokenCodec;
use helpdesk::inbound::http::health::HealthState;
use helpdesk::outbound::memory::InMemoryUserRepository;
use helpdesk::outbound::password::Argon2PasswordHasher;
use helpdesk::server::{UsersServer, UsersServerConfig, create_users_server};
use helpdesk::settings::{HelpdeskSettings, USERS_DEFAULT_BIND};
use helpdesk::telemetry;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = HelpdeskSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("load configuration: {err}"))?;
    let _telemetry = telemetry::init("users-service", settings.log_dir.as_deref())
        .wrap_err("initialise logging")?;

    let codec = TokenCodec::from_secret(
        &settings.jwt_secret()?,
        settings.token_ttl(),
        Arc::new(DefaultClock),
    )?;

    let health_state = web::Data::new(HealthState::new());
    let UsersServer { server, .. } = create_users_server(
        health_state.clone(),
        UsersServerConfig {
            bind_addr: settings.bind_addr(USERS_DEFAULT_BIND)?,
            codec: Arc::new(codec),
            users: Arc::new(InMemoryUserRepository::new()),
            hasher: Arc::new(Argon2PasswordHasher::new()),
        },
    )?;

    server.await?;
    health_state.mark_unhealthy();
    info!("users service stopped");
    Ok(())
}
