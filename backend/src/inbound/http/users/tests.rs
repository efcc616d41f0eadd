//! Tests for users service handlers.

use super::*;
use crate::domain::{TokenCodec, UserAccountService};
use crate::outbound::memory::InMemoryUserRepository;
use crate::test_support::PlainPasswordHasher;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};
use std::time::Duration;

fn codec() -> Arc<TokenCodec> {
    Arc::new(
        TokenCodec::new(
            b"users-handler-secret",
            Duration::from_secs(3600),
            Arc::new(DefaultClock),
        )
        .expect("secret is not blank"),
    )
}

fn state(codec: Arc<TokenCodec>) -> UsersState {
    let accounts = UserAccountService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(PlainPasswordHasher),
    );
    UsersState::new(accounts, codec)
}

macro_rules! test_app {
    () => {{
        let codec = codec();
        actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state(Arc::clone(&codec))))
                .configure(configure(codec)),
        )
        .await
    }};
}

async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
) -> Value {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/users")
            .set_json(json!({ "name": name, "email": email, "password": "pw" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    actix_test::read_body_json(res).await
}

async fn login_token(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
) -> String {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/users/login")
            .set_json(json!({ "email": email, "password": "pw" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    body["token"].as_str().expect("token string").to_owned()
}

#[actix_web::test]
async fn register_returns_public_profile_with_default_role() {
    let app = test_app!();

    let body = register_user(&app, "Ana", "ana@example.com").await;

    assert_eq!(body["id"], 1);
    assert_eq!(body["role"], "client");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[actix_web::test]
async fn duplicate_email_is_a_conflict() {
    let app = test_app!();
    register_user(&app, "Ana", "ana@example.com").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/users")
            .set_json(json!({ "name": "Imposter", "email": "ana@example.com", "password": "x" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn login_issues_a_token_for_the_account() {
    let codec = codec();
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state(Arc::clone(&codec))))
            .configure(configure(Arc::clone(&codec))),
    )
    .await;
    register_user(&app, "Ana", "ana@example.com").await;

    let token = login_token(&app, "ANA@example.com").await;

    let identity = codec.verify(&token).expect("issued token verifies");
    assert_eq!(identity.user_id(), UserId::new(1));
    assert_eq!(identity.email(), "ana@example.com");
}

#[rstest]
#[case(json!({ "email": "ana@example.com", "password": "wrong" }), StatusCode::UNAUTHORIZED)]
#[case(json!({ "email": "nobody@example.com", "password": "pw" }), StatusCode::UNAUTHORIZED)]
#[case(json!({ "email": "  ", "password": "pw" }), StatusCode::BAD_REQUEST)]
#[case(json!({ "email": "ana@example.com", "password": "" }), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn login_rejects_bad_credentials(#[case] payload: Value, #[case] expected: StatusCode) {
    let app = test_app!();
    register_user(&app, "Ana", "ana@example.com").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/users/login")
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let app = test_app!();

    for uri in ["/users", "/users/me", "/users/1"] {
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[actix_web::test]
async fn me_returns_the_caller() {
    let app = test_app!();
    register_user(&app, "Ana", "ana@example.com").await;
    register_user(&app, "Bo", "bo@example.com").await;
    let token = login_token(&app, "bo@example.com").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/users/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["name"], "Bo");
}

#[actix_web::test]
async fn updating_someone_else_is_forbidden() {
    let app = test_app!();
    register_user(&app, "Ana", "ana@example.com").await;
    register_user(&app, "Bo", "bo@example.com").await;
    let token = login_token(&app, "bo@example.com").await;
    let auth = ("Authorization", format!("Bearer {token}"));

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/users/1")
            .insert_header(auth.clone())
            .set_json(json!({ "name": "Hijacked" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/users/1")
            .insert_header(auth)
            .to_request(),
    )
    .await;
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["name"], "Ana");
}

#[actix_web::test]
async fn owner_can_update_and_delete_own_account() {
    let app = test_app!();
    register_user(&app, "Ana", "ana@example.com").await;
    let token = login_token(&app, "ana@example.com").await;
    let auth = ("Authorization", format!("Bearer {token}"));

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/users/1")
            .insert_header(auth.clone())
            .set_json(json!({ "phone": "555-0100" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["phone"], "555-0100");
    assert_eq!(body["name"], "Ana");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/users/1")
            .insert_header(auth.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/users/1")
            .insert_header(auth)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn blank_name_on_update_reports_the_field() {
    let app = test_app!();
    register_user(&app, "Ana", "ana@example.com").await;
    let token = login_token(&app, "ana@example.com").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/users/1")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "name": " " }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "name");
}
