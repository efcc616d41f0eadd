//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod author_directory;
mod comment_repository;
mod login_service;
mod password_hasher;
mod ticket_notifier;
mod ticket_repository;
mod user_repository;

#[cfg(test)]
pub use author_directory::MockAuthorDirectory;
pub use author_directory::{AuthorDirectory, PeerFetchError};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentPersistenceError, CommentRepository};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use ticket_notifier::MockTicketNotifier;
pub use ticket_notifier::{NotifyError, TicketNotifier};
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketPersistenceError, TicketRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
