//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: `tokio::sync::RwLock`-guarded stores for users, tickets and
//!   comments
//! - **peer**: reqwest client resolving ticket authors from the users service
//! - **notify**: ticket-created notifiers (structured log, webhook)
//! - **password**: Argon2id password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod memory;
pub mod notify;
pub mod password;
pub mod peer;
