//! Request middleware.
//!
//! Purpose: define middleware components for request lifecycle concerns:
//! trace correlation and bearer-token authentication.

pub mod auth;
pub mod trace;

pub use auth::{AuthError, BearerAuth};
pub use trace::Trace;
