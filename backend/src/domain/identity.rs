//! Authenticated caller identity.
//!
//! An [`Identity`] is produced once at login from the persisted user record,
//! embedded into the bearer token, and handed back to handlers by the
//! authentication middleware. Nothing mutates it after construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Integer identifier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Identity of an authenticated caller.
///
/// ## Invariants
/// - The user id is the id of the account that logged in; it is never
///   defaulted or zero-filled by the pipeline.
///
/// # Examples
/// ```
/// use helpdesk::domain::{Identity, UserId};
///
/// let identity = Identity::new(UserId::new(42), "Ana", "ana@example.com");
/// assert_eq!(identity.user_id(), UserId::new(42));
/// assert_eq!(identity.name(), "Ana");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
    name: String,
    email: String,
}

impl Identity {
    /// Build an identity from persisted user attributes.
    pub fn new(user_id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Identifier of the authenticated user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Display name captured at login.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email captured at login.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}
