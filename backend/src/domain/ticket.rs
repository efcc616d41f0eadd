//! Help-desk tickets.
//!
//! The owner is fixed at creation from the caller's identity. Neither
//! [`TicketUpdate`] nor any other mutation path carries an owner field.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Integer identifier of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(i64);

impl TicketId {
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

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status or priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    field: &'static str,
    value: String,
}

impl UnknownVariant {
    /// Field the value was meant for.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Rejected input.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} `{}`", self.field, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(UnknownVariant {
                field: "status",
                value: s.to_owned(),
            }),
        }
    }
}

/// Urgency of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl FromStr for TicketPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(UnknownVariant {
                field: "priority",
                value: s.to_owned(),
            }),
        }
    }
}

/// Persisted ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub diagnosis: String,
    pub solution: String,
    pub priority: TicketPriority,
    pub opened_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub attachments: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
}

impl Ticket {
    /// Move to `status` at `now`. Closing stamps `closed_at`; leaving the
    /// closed state clears it.
    pub fn set_status(&mut self, status: TicketStatus, now: DateTime<Utc>) {
        self.closed_at = match status {
            TicketStatus::Closed if self.status == TicketStatus::Closed => {
                self.closed_at.or(Some(now))
            }
            TicketStatus::Closed => Some(now),
            _ => None,
        };
        self.status = status;
        self.updated_at = now;
    }
}

/// Validation errors raised when building drafts and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketValidationError {
    /// Title was missing or blank.
    EmptyTitle,
}

impl fmt::Display for TicketValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
        }
    }
}

impl std::error::Error for TicketValidationError {}

/// Validated contents of a new ticket, before ownership is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub attachments: Vec<String>,
    pub tags: Vec<String>,
    pub category_id: Option<i64>,
    pub assignee_id: Option<UserId>,
}

impl TicketDraft {
    /// Build a draft with the required title and description.
    ///
    /// # Errors
    /// Returns [`TicketValidationError::EmptyTitle`] for a blank title.
    pub fn try_new(title: &str, description: &str) -> Result<Self, TicketValidationError> {
        Ok(Self {
            title: non_blank_title(title)?,
            description: description.trim().to_owned(),
            priority: TicketPriority::default(),
            attachments: Vec::new(),
            tags: Vec::new(),
            category_id: None,
            assignee_id: None,
        })
    }
}

/// A draft bound to its owner and creation time, ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub owner: UserId,
    pub draft: TicketDraft,
    pub opened_at: DateTime<Utc>,
}

impl NewTicket {
    /// Materialise the stored record once the store has assigned an id.
    #[must_use]
    pub fn into_ticket(self, id: TicketId) -> Ticket {
        let TicketDraft {
            title,
            description,
            priority,
            attachments,
            tags,
            category_id,
            assignee_id,
        } = self.draft;
        Ticket {
            id,
            owner: self.owner,
            title,
            description,
            status: TicketStatus::Open,
            diagnosis: String::new(),
            solution: String::new(),
            priority,
            opened_at: self.opened_at,
            closed_at: None,
            updated_at: self.opened_at,
            attachments,
            tags,
            category_id,
            assignee_id,
        }
    }
}

/// Editable ticket fields. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub diagnosis: Option<String>,
    pub solution: Option<String>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub attachments: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub category_id: Option<i64>,
    pub assignee_id: Option<UserId>,
}

impl TicketUpdate {
    /// Check the fields that carry constraints.
    ///
    /// # Errors
    /// Returns [`TicketValidationError::EmptyTitle`] when a blank title is
    /// supplied.
    pub fn validate(mut self) -> Result<Self, TicketValidationError> {
        self.title = self.title.as_deref().map(non_blank_title).transpose()?;
        Ok(self)
    }

    /// Apply the update at `now`.
    pub fn apply(self, ticket: &mut Ticket, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            ticket.title = title;
        }
        if let Some(description) = self.description {
            ticket.description = description;
        }
        if let Some(diagnosis) = self.diagnosis {
            ticket.diagnosis = diagnosis;
        }
        if let Some(solution) = self.solution {
            ticket.solution = solution;
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        if let Some(attachments) = self.attachments {
            ticket.attachments = attachments;
        }
        if let Some(tags) = self.tags {
            ticket.tags = tags;
        }
        if let Some(category_id) = self.category_id {
            ticket.category_id = Some(category_id);
        }
        if let Some(assignee_id) = self.assignee_id {
            ticket.assignee_id = Some(assignee_id);
        }
        match self.status {
            Some(status) => ticket.set_status(status, now),
            None => ticket.updated_at = now,
        }
    }
}

fn non_blank_title(raw: &str) -> Result<String, TicketValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TicketValidationError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}
