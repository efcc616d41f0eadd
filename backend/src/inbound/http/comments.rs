//! Comment handlers mounted by the tickets service.
//!
//! ```text
//! POST   /tickets/{id}/comments  {"body":"Rebooted the printer"}
//! GET    /tickets/{id}/comments
//! GET    /users/{id}/comments
//! PUT    /comments/{id}          {"body":"..."}
//! DELETE /comments/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Comment, CommentBody, CommentId, TicketId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AuthenticatedCaller;
use crate::inbound::http::schemas::{CommentSchema, ErrorSchema};
use crate::inbound::http::state::TicketsState;

/// Body of comment create and update requests.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub body: String,
}

#[utoipa::path(
    post,
    path = "/tickets/{id}/comments",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "addComment"
)]
#[post("/{id}/comments")]
pub async fn add_comment(
    state: web::Data<TicketsState>,
    caller: AuthenticatedCaller,
    path: web::Path<i64>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let body = CommentBody::try_new(&payload.body)?;
    let comment = state
        .comments
        .add(caller.user_id(), TicketId::new(path.into_inner()), body)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[utoipa::path(
    get,
    path = "/tickets/{id}/comments",
    params(("id" = i64, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Comments on the ticket", body = [CommentSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "listTicketComments"
)]
#[get("/{id}/comments")]
pub async fn list_ticket_comments(
    state: web::Data<TicketsState>,
    _caller: AuthenticatedCaller,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<Comment>>> {
    let comments = state
        .comments
        .list_for_ticket(TicketId::new(path.into_inner()))
        .await?;
    Ok(web::Json(comments))
}

/// Comments authored by a user, across all tickets.
#[utoipa::path(
    get,
    path = "/users/{id}/comments",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Comments by the user", body = [CommentSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "listUserComments"
)]
#[get("/{id}/comments")]
pub async fn list_user_comments(
    state: web::Data<TicketsState>,
    _caller: AuthenticatedCaller,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<Comment>>> {
    let comments = state
        .comments
        .list_for_user(UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(comments))
}

#[utoipa::path(
    put,
    path = "/comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated comment", body = CommentSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "updateComment"
)]
#[put("/{id}")]
pub async fn update_comment(
    state: web::Data<TicketsState>,
    caller: AuthenticatedCaller,
    path: web::Path<i64>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<web::Json<Comment>> {
    let body = CommentBody::try_new(&payload.body)?;
    let comment = state
        .comments
        .update(caller.user_id(), CommentId::new(path.into_inner()), body)
        .await?;
    Ok(web::Json(comment))
}

#[utoipa::path(
    delete,
    path = "/comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/{id}")]
pub async fn delete_comment(
    state: web::Data<TicketsState>,
    caller: AuthenticatedCaller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .comments
        .delete(caller.user_id(), CommentId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
