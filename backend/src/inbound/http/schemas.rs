//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their JSON shape and live in the inbound adapter
//! layer where framework concerns belong.

use utoipa::ToSchema;

/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = ErrorCode, rename_all = "snake_case")]
pub enum ErrorCodeSchema {
    InvalidRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ServiceUnavailable,
    InternalError,
}

/// API error envelope.
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "forbidden")]
    code: ErrorCodeSchema,
    #[schema(example = "only the owner may modify this resource")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "6f1c2a9e-8a55-4c4e-9a3b-2f0d1e6b7c11")]
    trace_id: Option<String>,
    #[schema(value_type = Option<Object>)]
    details: Option<serde_json::Value>,
}

/// Public user record.
#[derive(ToSchema)]
#[schema(as = UserProfile)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserProfileSchema {
    #[schema(example = 42)]
    id: i64,
    #[schema(example = "Ana")]
    name: String,
    #[schema(example = "ana@example.com")]
    email: String,
    #[schema(example = "client")]
    role: String,
    phone: String,
}

/// Ticket workflow states.
#[derive(ToSchema)]
#[schema(as = TicketStatus, rename_all = "snake_case")]
pub enum TicketStatusSchema {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(ToSchema)]
#[schema(as = TicketPriority, rename_all = "snake_case")]
pub enum TicketPrioritySchema {
    Low,
    Medium,
    High,
    Urgent,
}

/// Ticket as returned by the tickets service. `author` and `authorError`
/// are only present on single-ticket responses.
#[derive(ToSchema)]
#[schema(as = Ticket, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct TicketSchema {
    id: i64,
    /// Id of the user who opened the ticket. Never changes.
    owner: i64,
    title: String,
    description: String,
    status: TicketStatusSchema,
    diagnosis: String,
    solution: String,
    priority: TicketPrioritySchema,
    #[schema(value_type = String, format = DateTime)]
    opened_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    closed_at: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
    attachments: Vec<String>,
    tags: Vec<String>,
    category_id: Option<i64>,
    assignee_id: Option<i64>,
    author: Option<UserProfileSchema>,
    /// Why the author could not be resolved.
    author_error: Option<String>,
}

#[derive(ToSchema)]
#[schema(as = Comment, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CommentSchema {
    id: i64,
    ticket_id: i64,
    owner: i64,
    body: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}
