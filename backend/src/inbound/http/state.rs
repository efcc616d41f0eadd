//! Shared HTTP adapter state.
//!
//! Handlers accept these bundles via `actix_web::web::Data` so they only
//! depend on domain services and ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::LoginService;
use crate::domain::{
    CommentService, NotificationDispatcher, TicketService, TokenCodec, UserAccountService,
};

/// Dependencies of the users service handlers.
#[derive(Clone)]
pub struct UsersState {
    pub accounts: UserAccountService,
    pub login: Arc<dyn LoginService>,
    pub codec: Arc<TokenCodec>,
}

impl UsersState {
    /// Use `accounts` for both account management and login.
    pub fn new(accounts: UserAccountService, codec: Arc<TokenCodec>) -> Self {
        Self {
            login: Arc::new(accounts.clone()),
            accounts,
            codec,
        }
    }
}

/// Dependencies of the tickets service handlers.
#[derive(Clone)]
pub struct TicketsState {
    pub tickets: TicketService,
    pub comments: CommentService,
    pub dispatcher: Arc<NotificationDispatcher>,
}
