//! Help-desk backend library.
//!
//! Two binaries are built from this crate: the users service (accounts and
//! token issuance) and the tickets service (tickets, comments and the
//! post-creation notification pool). Both share the bearer-token pipeline,
//! the error envelope, and the tracing middleware defined here.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surfaces used by tooling.
pub use doc::{TicketsApiDoc, UsersApiDoc};
pub use domain::TraceId;
pub use middleware::Trace;
