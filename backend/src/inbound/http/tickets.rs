//! Tickets service handlers.
//!
//! ```text
//! POST   /tickets              {"title":"Printer jammed","description":"Tray 2"}
//! GET    /tickets
//! GET    /tickets/mine
//! GET    /tickets/{id}
//! PUT    /tickets/{id}
//! PATCH  /tickets/{id}/status  {"status":"closed"}
//! DELETE /tickets/{id}
//! ```
//!
//! The owner of a ticket always comes from the bearer token. Request bodies
//! have no owner field and any supplied one is ignored.

use std::sync::Arc;

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AuthoredTicket, Error, NotificationJob, Ticket, TicketDraft, TicketId, TicketPriority,
    TicketStatus, TicketUpdate, TokenCodec, UserId, UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::comments::{
    add_comment, delete_comment, list_ticket_comments, list_user_comments, update_comment,
};
use crate::inbound::http::identity::AuthenticatedCaller;
use crate::inbound::http::schemas::{ErrorSchema, TicketSchema};
use crate::inbound::http::state::TicketsState;
use crate::middleware::BearerAuth;

/// Body of `POST /tickets`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// One of `low`, `medium`, `high`, `urgent`. Defaults to `medium`.
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
}

impl TryFrom<CreateTicketRequest> for TicketDraft {
    type Error = Error;

    fn try_from(value: CreateTicketRequest) -> Result<Self, Self::Error> {
        let mut draft = Self::try_new(&value.title, &value.description)?;
        if let Some(priority) = value.priority.as_deref() {
            draft.priority = priority.parse::<TicketPriority>()?;
        }
        draft.attachments = value.attachments;
        draft.tags = value.tags;
        draft.category_id = value.category_id;
        draft.assignee_id = value.assignee_id.map(UserId::new);
        Ok(draft)
    }
}

/// Body of `PUT /tickets/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub attachments: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
}

impl TryFrom<UpdateTicketRequest> for TicketUpdate {
    type Error = Error;

    fn try_from(value: UpdateTicketRequest) -> Result<Self, Self::Error> {
        let update = Self {
            title: value.title,
            description: value.description,
            diagnosis: value.diagnosis,
            solution: value.solution,
            priority: value
                .priority
                .as_deref()
                .map(str::parse::<TicketPriority>)
                .transpose()?,
            status: value
                .status
                .as_deref()
                .map(str::parse::<TicketStatus>)
                .transpose()?,
            attachments: value.attachments,
            tags: value.tags,
            category_id: value.category_id,
            assignee_id: value.assignee_id.map(UserId::new),
        };
        Ok(update.validate()?)
    }
}

/// Body of `PATCH /tickets/{id}/status`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    /// One of `open`, `in_progress`, `resolved`, `closed`.
    pub status: String,
}

/// Ticket plus the result of resolving its author.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_error: Option<String>,
}

impl From<AuthoredTicket> for TicketView {
    fn from(value: AuthoredTicket) -> Self {
        Self {
            ticket: value.ticket,
            author: value.author,
            author_error: value.author_error,
        }
    }
}

/// Open a ticket owned by the caller.
///
/// The response carries the author record fetched from the users service
/// with the caller's token, or `authorError` when that lookup fails.
#[utoipa::path(
    post,
    path = "/tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "createTicket"
)]
#[post("")]
pub async fn create_ticket(
    state: web::Data<TicketsState>,
    caller: AuthenticatedCaller,
    payload: web::Json<CreateTicketRequest>,
) -> ApiResult<HttpResponse> {
    let draft = TicketDraft::try_from(payload.into_inner())?;
    let ticket = state.tickets.create(caller.user_id(), draft).await?;
    // Detached so a client disconnect after the commit cannot cancel it.
    state
        .dispatcher
        .spawn_enqueue(NotificationJob::for_ticket(ticket.id));
    let view = state.tickets.with_author(caller.bearer(), ticket).await;
    Ok(HttpResponse::Created().json(TicketView::from(view)))
}

/// Every ticket.
#[utoipa::path(
    get,
    path = "/tickets",
    responses(
        (status = 200, description = "Tickets", body = [TicketSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "listTickets"
)]
#[get("")]
pub async fn list_tickets(
    state: web::Data<TicketsState>,
    _caller: AuthenticatedCaller,
) -> ApiResult<web::Json<Vec<Ticket>>> {
    Ok(web::Json(state.tickets.list().await?))
}

/// Tickets owned by the caller.
#[utoipa::path(
    get,
    path = "/tickets/mine",
    responses(
        (status = 200, description = "Caller's tickets", body = [TicketSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "listMyTickets"
)]
#[get("/mine")]
pub async fn my_tickets(
    state: web::Data<TicketsState>,
    caller: AuthenticatedCaller,
) -> ApiResult<web::Json<Vec<Ticket>>> {
    Ok(web::Json(state.tickets.list_mine(caller.user_id()).await?))
}

/// One ticket, enriched with its author.
#[utoipa::path(
    get,
    path = "/tickets/{id}",
    params(("id" = i64, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket", body = TicketSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "getTicket"
)]
#[get("/{id}")]
pub async fn get_ticket(
    state: web::Data<TicketsState>,
    caller: AuthenticatedCaller,
    path: web::Path<i64>,
) -> ApiResult<web::Json<TicketView>> {
    let ticket = state.tickets.get(TicketId::new(path.into_inner())).await?;
    let view = state.tickets.with_author(caller.bearer(), ticket).await;
    Ok(web::Json(view.into()))
}

/// Edit a ticket the caller owns.
#[utoipa::path(
    put,
    path = "/tickets/{id}",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = UpdateTicketRequest,
    responses(
        (status = 200, description = "Updated ticket", body = TicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "updateTicket"
)]
#[put("/{id}")]
pub async fn update_ticket(
    state: web::Data<TicketsState>,
    caller: AuthenticatedCaller,
    path: web::Path<i64>,
    payload: web::Json<UpdateTicketRequest>,
) -> ApiResult<web::Json<Ticket>> {
    let update = TicketUpdate::try_from(payload.into_inner())?;
    let ticket = state
        .tickets
        .update(caller.user_id(), TicketId::new(path.into_inner()), update)
        .await?;
    Ok(web::Json(ticket))
}

/// Move a ticket the caller owns to another status.
#[utoipa::path(
    patch,
    path = "/tickets/{id}/status",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Updated ticket", body = TicketSchema),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "setTicketStatus"
)]
#[patch("/{id}/status")]
pub async fn set_ticket_status(
    state: web::Data<TicketsState>,
    caller: AuthenticatedCaller,
    path: web::Path<i64>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<web::Json<Ticket>> {
    let status = payload.status.parse::<TicketStatus>()?;
    let ticket = state
        .tickets
        .set_status(caller.user_id(), TicketId::new(path.into_inner()), status)
        .await?;
    Ok(web::Json(ticket))
}

/// Delete a ticket the caller owns, along with its comments.
#[utoipa::path(
    delete,
    path = "/tickets/{id}",
    params(("id" = i64, Path, description = "Ticket id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "deleteTicket"
)]
#[delete("/{id}")]
pub async fn delete_ticket(
    state: web::Data<TicketsState>,
    caller: AuthenticatedCaller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .tickets
        .delete(caller.user_id(), TicketId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mount the tickets service routes, all behind [`BearerAuth`].
pub fn configure(codec: Arc<TokenCodec>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let gate = BearerAuth::new(codec);
        cfg.service(
            web::scope("/tickets")
                .wrap(gate.clone())
                .service(create_ticket)
                .service(list_tickets)
                .service(my_tickets)
                .service(get_ticket)
                .service(update_ticket)
                .service(set_ticket_status)
                .service(delete_ticket)
                .service(add_comment)
                .service(list_ticket_comments),
        )
        .service(
            web::scope("/comments")
                .wrap(gate.clone())
                .service(update_comment)
                .service(delete_comment),
        )
        .service(
            web::scope("/users")
                .wrap(gate)
                .service(list_user_comments),
        );
    }
}
