//! Bearer-token gate for protected routes.
//!
//! Per request the gate either binds an [`AuthenticatedCaller`] and calls the
//! wrapped service, or answers 401 itself; the wrapped service is never
//! invoked for a rejected request. Rejections are logged at `info`.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{HttpMessage, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::info;

use crate::domain::{BearerToken, Error, TokenCodec, TokenError};
use crate::inbound::http::identity::AuthenticatedCaller;

/// Why a request was turned away by [`BearerAuth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header.
    #[error("authorization header is missing")]
    Missing,
    /// Header not of the form `Bearer <token>`, or an unreadable token.
    #[error("authorization header or token is malformed")]
    Malformed,
    /// Signature mismatch or a non-HS256 algorithm.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Token past its expiry.
    #[error("token has expired")]
    Expired,
}

impl AuthError {
    const fn reason(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Malformed => "malformed",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Malformed => Self::Malformed,
            TokenError::InvalidSignature => Self::InvalidSignature,
            TokenError::Expired => Self::Expired,
        }
    }
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        Error::unauthorized(value.to_string())
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// Exactly one space separates scheme and token; any other whitespace is
/// malformed.
fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;
    match raw.split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer")
                && !token.is_empty()
                && !token.contains(char::is_whitespace) =>
        {
            Ok(token)
        }
        _ => Err(AuthError::Malformed),
    }
}

fn authenticate(codec: &TokenCodec, headers: &HeaderMap) -> Result<AuthenticatedCaller, AuthError> {
    let token = bearer_from_headers(headers)?;
    let identity = codec.verify(token)?;
    Ok(AuthenticatedCaller::new(identity, BearerToken::new(token)))
}

/// Middleware factory verifying bearer tokens with a shared [`TokenCodec`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use actix_web::{App, web};
/// use helpdesk::domain::TokenCodec;
/// use helpdesk::middleware::BearerAuth;
/// use mockable::DefaultClock;
///
/// let codec = TokenCodec::new(b"secret", Duration::from_secs(60), Arc::new(DefaultClock))
///     .expect("secret is not blank");
/// let _app = App::new().service(web::scope("/tickets").wrap(BearerAuth::new(Arc::new(codec))));
/// ```
#[derive(Clone)]
pub struct BearerAuth {
    codec: Arc<TokenCodec>,
}

impl BearerAuth {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BearerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddleware {
            service,
            codec: Arc::clone(&self.codec),
        }))
    }
}

/// Service wrapper produced by [`BearerAuth`].
pub struct BearerAuthMiddleware<S> {
    service: S,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&self.codec, req.headers()) {
            Ok(caller) => {
                req.extensions_mut().insert(caller);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(rejection) => {
                info!(
                    reason = rejection.reason(),
                    method = %req.method(),
                    path = req.path(),
                    "request rejected by bearer gate"
                );
                let response = Error::from(rejection).error_response();
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
        }
    }
}
