//! Author enrichment through the users service: the caller's token and trace
//! id are forwarded, and a failing peer never fails the ticket request.

mod support;

use std::net::TcpListener;
use std::sync::Arc;
use std::time::{Duration, Instant};

use helpdesk::domain::{DispatcherConfig, TokenCodec};
use helpdesk::outbound::peer::HttpAuthorDirectory;
use helpdesk::test_support::{MutableClock, RecordingNotifier};
use serde_json::json;
use support::{
    StubUsersService, TicketsHarness, bearer_for, codec, post_json, spawn_tickets, spawn_users,
    start_time,
};
use url::Url;

fn tickets_against(
    users_url: &str,
    peer_timeout: Duration,
) -> (TicketsHarness, Arc<TokenCodec>, Arc<RecordingNotifier>) {
    let clock = Arc::new(MutableClock::new(start_time()));
    let codec = codec(Arc::clone(&clock));
    let notifier = Arc::new(RecordingNotifier::default());
    let authors = HttpAuthorDirectory::new(Url::parse(users_url).expect("url"), peer_timeout)
        .expect("peer client");
    let tickets = spawn_tickets(
        Arc::clone(&codec),
        clock,
        Arc::new(authors),
        notifier.clone(),
        DispatcherConfig::default(),
    );
    (tickets, codec, notifier)
}

#[actix_web::test]
async fn author_is_resolved_from_the_real_users_service() {
    let clock = Arc::new(MutableClock::new(start_time()));
    let codec = codec(Arc::clone(&clock));
    let users = spawn_users(Arc::clone(&codec));
    let notifier = Arc::new(RecordingNotifier::default());
    let authors = HttpAuthorDirectory::new(
        Url::parse(&users.base_url).expect("url"),
        Duration::from_secs(5),
    )
    .expect("peer client");
    let tickets = spawn_tickets(
        Arc::clone(&codec),
        clock,
        Arc::new(authors),
        notifier,
        DispatcherConfig::default(),
    );
    let client = reqwest::Client::new();

    post_json(
        &client,
        &format!("{}/users", users.base_url),
        None,
        &json!({ "name": "Ana", "email": "ana@example.com", "password": "pw" }),
    )
    .await;
    let (_, login) = post_json(
        &client,
        &format!("{}/users/login", users.base_url),
        None,
        &json!({ "email": "ana@example.com", "password": "pw" }),
    )
    .await;
    let auth = format!("Bearer {}", login["token"].as_str().expect("token"));

    let (status, ticket) = post_json(
        &client,
        &format!("{}/tickets", tickets.base_url),
        Some(&auth),
        &json!({ "title": "Laptop will not boot" }),
    )
    .await;

    assert_eq!(status, 201);
    assert_eq!(ticket["owner"], 1);
    assert_eq!(ticket["author"]["id"], 1);
    assert_eq!(ticket["author"]["name"], "Ana");
    assert!(ticket.get("authorError").is_none());
    tickets.stop().await;
    users.handle.stop(true).await;
}

#[actix_web::test]
async fn caller_token_and_trace_id_are_forwarded() {
    let stub = StubUsersService::spawn(Duration::ZERO);
    let (tickets, codec, _) = tickets_against(&stub.base_url, Duration::from_secs(5));
    let auth = bearer_for(&codec, 42);
    let trace_id = "5f0c8e2a-7b61-4d2a-a0f3-9e8d7c6b5a41";

    let response = reqwest::Client::new()
        .post(format!("{}/tickets", tickets.base_url))
        .header("Authorization", &auth)
        .header("trace-id", trace_id)
        .json(&json!({ "title": "forwarding" }))
        .send()
        .await
        .expect("request sent");
    assert_eq!(response.status().as_u16(), 201);

    let seen = stub.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/users/42");
    assert_eq!(seen[0].authorization.as_deref(), Some(auth.as_str()));
    assert_eq!(seen[0].trace_id.as_deref(), Some(trace_id));
    tickets.stop().await;
    stub.handle.stop(true).await;
}

#[actix_web::test]
async fn slow_peer_times_out_into_author_error() {
    let stub = StubUsersService::spawn(Duration::from_secs(3));
    let (tickets, codec, notifier) = tickets_against(&stub.base_url, Duration::from_millis(200));
    let started = Instant::now();

    let (status, ticket) = post_json(
        &reqwest::Client::new(),
        &format!("{}/tickets", tickets.base_url),
        Some(&bearer_for(&codec, 42)),
        &json!({ "title": "slow peer" }),
    )
    .await;

    assert_eq!(status, 201);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(ticket.get("author").is_none());
    assert!(
        ticket["authorError"]
            .as_str()
            .is_some_and(|message| message.contains("timed out"))
    );
    assert_eq!(notifier.wait_for(1, Duration::from_secs(2)).await.len(), 1);
    tickets.stop().await;
    stub.handle.stop(false).await;
}

#[actix_web::test]
async fn oversized_peer_payload_becomes_author_error() {
    let stub = StubUsersService::spawn(Duration::ZERO);
    let clock = Arc::new(MutableClock::new(start_time()));
    let codec = codec(Arc::clone(&clock));
    let authors = HttpAuthorDirectory::new(
        Url::parse(&stub.base_url).expect("url"),
        Duration::from_secs(1),
    )
    .expect("peer client")
    .with_body_limit(16);
    let tickets = spawn_tickets(
        Arc::clone(&codec),
        clock,
        Arc::new(authors),
        Arc::new(RecordingNotifier::default()),
        DispatcherConfig::default(),
    );

    let (status, ticket) = post_json(
        &reqwest::Client::new(),
        &format!("{}/tickets", tickets.base_url),
        Some(&bearer_for(&codec, 42)),
        &json!({ "title": "chatty peer" }),
    )
    .await;

    assert_eq!(status, 201);
    assert!(ticket.get("author").is_none());
    assert!(
        ticket["authorError"]
            .as_str()
            .is_some_and(|message| message.contains("exceeds 16 bytes"))
    );
    tickets.stop().await;
    stub.handle.stop(false).await;
}

#[actix_web::test]
async fn unreachable_peer_still_creates_the_ticket() {
    let closed_port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let (tickets, codec, notifier) = tickets_against(
        &format!("http://127.0.0.1:{closed_port}"),
        Duration::from_secs(1),
    );
    let client = reqwest::Client::new();
    let auth = bearer_for(&codec, 42);

    let (status, ticket) = post_json(
        &client,
        &format!("{}/tickets", tickets.base_url),
        Some(&auth),
        &json!({ "title": "offline peer" }),
    )
    .await;
    assert_eq!(status, 201);
    assert!(ticket["authorError"].is_string());

    let listed = client
        .get(format!("{}/tickets/mine", tickets.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("request sent")
        .json::<serde_json::Value>()
        .await
        .expect("json");
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(notifier.wait_for(1, Duration::from_secs(2)).await.len(), 1);
    tickets.stop().await;
}
