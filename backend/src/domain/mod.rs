//! Domain primitives, services and ports.
//!
//! Purpose: define the identity pipeline (tokens, ownership, trace ids), the
//! help-desk aggregates (users, tickets, comments) and the notification
//! dispatcher. Nothing here knows about HTTP; inbound adapters translate
//! [`Error`] into responses and outbound adapters implement [`ports`].
//!
//! Public surface:
//! - [`TokenCodec`] issues and verifies bearer tokens.
//! - [`ensure_owner`] guards every mutation of an owned resource.
//! - [`UserAccountService`], [`TicketService`] and [`CommentService`] are the
//!   use-cases driven by the HTTP handlers.
//! - [`NotificationDispatcher`] runs post-creation notifications off the
//!   request path.

pub mod auth;
pub mod comment;
pub mod comment_service;
pub mod error;
pub mod identity;
pub mod notification;
pub mod ownership;
pub mod ports;
pub mod ticket;
pub mod ticket_service;
pub mod token;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::comment::{Comment, CommentBody, CommentId, CommentValidationError, NewComment};
pub use self::comment_service::CommentService;
pub use self::error::{Error, ErrorCode};
pub use self::identity::{Identity, UserId};
pub use self::notification::{
    DispatcherConfig, DispatcherConfigError, NotificationDispatcher, NotificationJob, QueueError,
    ShutdownReport,
};
pub use self::ownership::{AuthzError, authorize, ensure_owner};
pub use self::ticket::{
    NewTicket, Ticket, TicketDraft, TicketId, TicketPriority, TicketStatus, TicketUpdate,
    TicketValidationError, UnknownVariant,
};
pub use self::ticket_service::{AuthoredTicket, TicketService};
pub use self::token::{
    BearerToken, Claims, DEFAULT_TOKEN_TTL, SigningError, SigningKeyError, TOKEN_ISSUER,
    TokenCodec, TokenError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DEFAULT_ROLE, NewUser, Registration, RegistrationInput, User, UserChanges, UserProfile,
    UserValidationError,
};
pub use self::user_service::UserAccountService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use helpdesk::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
