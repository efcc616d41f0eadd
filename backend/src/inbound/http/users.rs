//! Users service handlers.
//!
//! ```text
//! POST   /users         {"name":"Ana","email":"ana@example.com","password":"..."}
//! POST   /users/login   {"email":"ana@example.com","password":"..."}
//! GET    /users/me
//! GET    /users
//! GET    /users/{id}
//! PUT    /users/{id}
//! DELETE /users/{id}
//! ```
//!
//! Registration and login are public. Everything else sits behind
//! [`BearerAuth`]; updates and deletes are further restricted to the account
//! holder.

use std::sync::Arc;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, Registration, RegistrationInput, TokenCodec,
    UserChanges, UserId, UserProfile, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AuthenticatedCaller;
use crate::inbound::http::schemas::{ErrorSchema, UserProfileSchema};
use crate::inbound::http::state::UsersState;
use crate::middleware::BearerAuth;

/// Registration body for `POST /users`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
}

impl TryFrom<&RegisterRequest> for Registration {
    type Error = UserValidationError;

    fn try_from(value: &RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_new(RegistrationInput {
            name: &value.name,
            email: &value.email,
            role: value.role.as_deref(),
            phone: value.phone.as_deref(),
            document: value.document.as_deref(),
            password: &value.password,
        })
    }
}

/// Login body for `POST /users/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Issued bearer token.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
}

/// Partial account update for `PUT /users/{id}`. Absent fields are kept.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
}

impl TryFrom<&UpdateUserRequest> for UserChanges {
    type Error = UserValidationError;

    fn try_from(value: &UpdateUserRequest) -> Result<Self, Self::Error> {
        Self::try_new(
            value.name.as_deref(),
            value.email.as_deref(),
            value.role.as_deref(),
            value.phone.as_deref(),
            value.document.as_deref(),
        )
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfileSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<UsersState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(&payload.into_inner())?;
    let profile = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// Exchange credentials for a bearer token.
///
/// Unknown emails and wrong passwords produce the same 401.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<UsersState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let identity = state.login.authenticate(&credentials).await?;
    let token = state
        .codec
        .issue(&identity)
        .map_err(|err| Error::internal(err.to_string()))?;
    info!(user_id = %identity.user_id(), "token issued");
    Ok(web::Json(LoginResponse { token }))
}

/// Public record of the caller.
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Caller profile", body = UserProfileSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<UsersState>,
    caller: AuthenticatedCaller,
) -> ApiResult<web::Json<UserProfile>> {
    Ok(web::Json(state.accounts.get(caller.user_id()).await?))
}

/// List public user records.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [UserProfileSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("")]
pub async fn list_users(
    state: web::Data<UsersState>,
    _caller: AuthenticatedCaller,
) -> ApiResult<web::Json<Vec<UserProfile>>> {
    Ok(web::Json(state.accounts.list().await?))
}

/// Public record of one user. This is the endpoint the tickets service
/// calls to resolve ticket authors.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserProfileSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<UsersState>,
    _caller: AuthenticatedCaller,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserProfile>> {
    Ok(web::Json(state.accounts.get(UserId::new(path.into_inner())).await?))
}

/// Update the caller's own account.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserProfileSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the account holder", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<UsersState>,
    caller: AuthenticatedCaller,
    path: web::Path<i64>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let changes = UserChanges::try_from(&payload.into_inner())?;
    let profile = state
        .accounts
        .update(caller.user_id(), UserId::new(path.into_inner()), changes)
        .await?;
    Ok(web::Json(profile))
}

/// Delete the caller's own account.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the account holder", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<UsersState>,
    caller: AuthenticatedCaller,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .accounts
        .delete(caller.user_id(), UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mount the users routes.
///
/// The public resources are registered ahead of the guarded scope so a
/// `POST /users` never reaches the bearer gate. Inside the scope `/me` is
/// registered before `/{id}`.
pub fn configure(codec: Arc<TokenCodec>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(register).service(login).service(
            web::scope("/users")
                .wrap(BearerAuth::new(codec))
                .service(me)
                .service(list_users)
                .service(get_user)
                .service(update_user)
                .service(delete_user),
        );
    }
}

#[cfg(test)]
mod tests;
