//! HTTP inbound adapter exposing the REST endpoints of both services.

pub mod comments;
pub mod error;
pub mod health;
pub mod identity;
pub mod schemas;
pub mod state;
pub mod tickets;
pub mod users;

pub use error::ApiResult;
