//! Comments attached to tickets.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TicketId, UserId};

/// Integer identifier of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(i64);

impl CommentId {
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

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted comment. Belongs to exactly one ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub ticket_id: TicketId,
    pub owner: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment body validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    /// Body was missing or blank.
    EmptyBody,
}

impl fmt::Display for CommentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "comment body must not be empty"),
        }
    }
}

impl std::error::Error for CommentValidationError {}

/// Non-blank comment text.
///
/// # Examples
/// ```
/// use helpdesk::domain::CommentBody;
///
/// assert!(CommentBody::try_new("  ").is_err());
/// assert_eq!(CommentBody::try_new(" rebooted ").unwrap().as_str(), "rebooted");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody(String);

impl CommentBody {
    /// Validate and trim the body.
    ///
    /// # Errors
    /// Returns [`CommentValidationError::EmptyBody`] for blank input.
    pub fn try_new(raw: &str) -> Result<Self, CommentValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CommentValidationError::EmptyBody);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Take the text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A comment ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub ticket_id: TicketId,
    pub owner: UserId,
    pub body: CommentBody,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    /// Materialise the stored record once the store has assigned an id.
    #[must_use]
    pub fn into_comment(self, id: CommentId) -> Comment {
        Comment {
            id,
            ticket_id: self.ticket_id,
            owner: self.owner,
            body: self.body.into_inner(),
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
