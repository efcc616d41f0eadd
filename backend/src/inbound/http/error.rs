//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while letting Actix
//! handlers turn domain failures into the JSON envelope
//! `{"code", "message", "traceId"?, "details"?}` with a matching status.

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::{
    CommentValidationError, Error, ErrorCode, LoginValidationError, TRACE_ID_HEADER,
    TicketValidationError, UnknownVariant, UserValidationError,
};

pub use crate::domain::ApiResult;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = self.message(), trace_id = self.trace_id(), "internal error");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// Invalid-request error naming the offending field.
pub(crate) fn field_error(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

impl From<UserValidationError> for Error {
    fn from(value: UserValidationError) -> Self {
        let field = match value {
            UserValidationError::EmptyName => "name",
            UserValidationError::InvalidEmail => "email",
            UserValidationError::EmptyPassword => "password",
        };
        field_error(field, value.to_string())
    }
}

impl From<LoginValidationError> for Error {
    fn from(value: LoginValidationError) -> Self {
        let field = match value {
            LoginValidationError::EmptyEmail => "email",
            LoginValidationError::EmptyPassword => "password",
        };
        field_error(field, value.to_string())
    }
}

impl From<TicketValidationError> for Error {
    fn from(value: TicketValidationError) -> Self {
        match value {
            TicketValidationError::EmptyTitle => field_error("title", value.to_string()),
        }
    }
}

impl From<CommentValidationError> for Error {
    fn from(value: CommentValidationError) -> Self {
        match value {
            CommentValidationError::EmptyBody => field_error("body", value.to_string()),
        }
    }
}

impl From<UnknownVariant> for Error {
    fn from(value: UnknownVariant) -> Self {
        Error::invalid_request(value.to_string())
            .with_details(json!({ "field": value.field(), "value": value.value() }))
    }
}

/// Render malformed JSON bodies with the standard envelope.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}")).into()
}

/// Render unparsable path parameters with the standard envelope.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid path parameter: {err}")).into()
}
