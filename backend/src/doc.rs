//! OpenAPI documentation for both services.
//!
//! [`UsersApiDoc`] and [`TicketsApiDoc`] register the handlers of each
//! binary plus the schema wrappers from
//! [`crate::inbound::http::schemas`]. Both documents declare the bearer
//! security scheme; public operations opt out with `security([])`.
//! `openapi-dump` prints either document for external tooling.

use crate::inbound::http::comments::CommentRequest;
use crate::inbound::http::schemas::{
    CommentSchema, ErrorCodeSchema, ErrorSchema, TicketPrioritySchema, TicketSchema,
    TicketStatusSchema, UserProfileSchema,
};
use crate::inbound::http::tickets::{CreateTicketRequest, StatusRequest, UpdateTicketRequest};
use crate::inbound::http::users::{
    LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in both documents.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let scheme = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("HS256 token issued by POST /users/login."))
            .build();
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the users service.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Help-desk users service",
        description = "Account registration, login and public user records."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::me,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserProfileSchema,
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        UpdateUserRequest
    )),
    tags(
        (name = "users", description = "Accounts and tokens"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct UsersApiDoc;

/// OpenAPI document for the tickets service.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Help-desk tickets service",
        description = "Tickets and comments. Every operation requires a bearer token."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::list_tickets,
        crate::inbound::http::tickets::my_tickets,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::update_ticket,
        crate::inbound::http::tickets::set_ticket_status,
        crate::inbound::http::tickets::delete_ticket,
        crate::inbound::http::comments::add_comment,
        crate::inbound::http::comments::list_ticket_comments,
        crate::inbound::http::comments::list_user_comments,
        crate::inbound::http::comments::update_comment,
        crate::inbound::http::comments::delete_comment,
        crate::inbound::http::health::status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        TicketSchema,
        TicketStatusSchema,
        TicketPrioritySchema,
        CommentSchema,
        UserProfileSchema,
        ErrorSchema,
        ErrorCodeSchema,
        CreateTicketRequest,
        UpdateTicketRequest,
        StatusRequest,
        CommentRequest
    )),
    tags(
        (name = "tickets", description = "Ticket lifecycle"),
        (name = "comments", description = "Comments on tickets"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct TicketsApiDoc;
