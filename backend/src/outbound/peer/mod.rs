//! Adapters that call the users service on behalf of the tickets service.

mod http_author_directory;

pub use http_author_directory::{DEFAULT_PEER_TIMEOUT, HttpAuthorDirectory, PeerClientError};
