//! Request-scoped caller identity.
//!
//! [`BearerAuth`](crate::middleware::BearerAuth) stores an
//! [`AuthenticatedCaller`] in the request extensions after verifying the
//! token; handlers take it as an extractor argument. The extension map is
//! keyed by type, so nothing else can overwrite or spoof the entry.

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::error;

use crate::domain::{BearerToken, Error, Identity, UserId};

/// Verified identity of the caller plus the token it presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    identity: Identity,
    bearer: BearerToken,
}

impl AuthenticatedCaller {
    pub fn new(identity: Identity, bearer: BearerToken) -> Self {
        Self { identity, bearer }
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.identity.user_id()
    }

    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Token to forward on calls made on the caller's behalf.
    #[must_use]
    pub const fn bearer(&self) -> &BearerToken {
        &self.bearer
    }
}

impl FromRequest for AuthenticatedCaller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let caller = req.extensions().get::<Self>().cloned();
        ready(caller.ok_or_else(|| {
            // A protected handler mounted without the bearer gate.
            error!(path = req.path(), "authenticated identity missing from request");
            Error::internal("authenticated identity missing from request context").into()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    async fn whoami(caller: AuthenticatedCaller) -> HttpResponse {
        HttpResponse::Ok().body(caller.user_id().to_string())
    }

    #[actix_web::test]
    async fn missing_identity_is_an_internal_error_not_a_zero_user() {
        let app = test::init_service(App::new().route("/", web::get().to(whoami))).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "internal_error");
    }

    #[actix_web::test]
    async fn bound_identity_is_extracted() {
        let app = test::init_service(App::new().route("/", web::get().to(whoami))).await;
        let req = test::TestRequest::get().uri("/").to_request();
        req.extensions_mut().insert(AuthenticatedCaller::new(
            Identity::new(UserId::new(42), "Ana", "ana@example.com"),
            BearerToken::new("token"),
        ));

        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "42");
    }
}
