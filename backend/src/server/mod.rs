//! Server construction and middleware wiring for both services.
//!
//! Each service gets an app builder (used directly by handler-level tests)
//! and a `create_*_server` function that binds a listener and returns the
//! running server together with its bound address.

mod tickets;
mod users;

pub use tickets::{TicketsServer, TicketsServerConfig, build_tickets_app, create_tickets_server};
pub use users::{UsersServer, UsersServerConfig, build_users_app, create_users_server};

use actix_web::web;

use crate::inbound::http::error::{json_error_handler, path_error_handler};

/// JSON extractor configuration rendering failures with the error envelope.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Path extractor configuration rendering failures with the error envelope.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error_handler)
}
