//! Shared harness for integration tests: real servers on ephemeral ports.
//!
//! Servers are spawned on the Actix runtime of the calling test, so tests
//! use `#[actix_web::test]` and drive them with `reqwest`.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use chrono::{DateTime, Utc};
use helpdesk::domain::ports::{AuthorDirectory, TicketNotifier};
use helpdesk::domain::{
    DispatcherConfig, Identity, NotificationDispatcher, ShutdownReport, TokenCodec, UserId,
};
use helpdesk::inbound::http::health::HealthState;
use helpdesk::outbound::memory::{
    InMemoryCommentRepository, InMemoryTicketRepository, InMemoryUserRepository,
};
use helpdesk::server::{
    TicketsServerConfig, UsersServer, UsersServerConfig, create_tickets_server,
    create_users_server,
};
use helpdesk::test_support::{MutableClock, PlainPasswordHasher};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

pub const SECRET: &[u8] = b"integration-test-secret";
pub const TOKEN_TTL: Duration = Duration::from_secs(3600);

pub fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

pub fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().expect("loopback address")
}

/// Codec driven by a clock the test controls.
pub fn codec(clock: Arc<MutableClock>) -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(SECRET, TOKEN_TTL, clock).expect("secret is not blank"))
}

/// `Authorization` header value for `user`.
pub fn bearer_for(codec: &TokenCodec, user: i64) -> String {
    let identity = Identity::new(UserId::new(user), format!("user {user}"), "u@example.com");
    format!("Bearer {}", codec.issue(&identity).expect("sign"))
}

/// Running users service.
pub struct UsersHarness {
    pub base_url: String,
    pub handle: ServerHandle,
}

pub fn spawn_users(codec: Arc<TokenCodec>) -> UsersHarness {
    let UsersServer { server, local_addr } = create_users_server(
        web::Data::new(HealthState::new()),
        UsersServerConfig {
            bind_addr: loopback(),
            codec,
            users: Arc::new(InMemoryUserRepository::new()),
            hasher: Arc::new(PlainPasswordHasher),
        },
    )
    .expect("users service binds");
    let handle = server.handle();
    actix_web::rt::spawn(server);
    UsersHarness {
        base_url: format!("http://{local_addr}"),
        handle,
    }
}

/// Running tickets service plus the task that drains it on stop.
pub struct TicketsHarness {
    pub base_url: String,
    pub handle: ServerHandle,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub health: web::Data<HealthState>,
    pub stopped: JoinHandle<io::Result<ShutdownReport>>,
}

impl TicketsHarness {
    /// Stop the HTTP server and wait for the pool to drain.
    pub async fn stop(self) -> ShutdownReport {
        self.handle.stop(true).await;
        self.stopped
            .await
            .expect("server task joins")
            .expect("server exits cleanly")
    }
}

pub fn spawn_tickets(
    codec: Arc<TokenCodec>,
    clock: Arc<MutableClock>,
    authors: Arc<dyn AuthorDirectory>,
    notifier: Arc<dyn TicketNotifier>,
    dispatcher: DispatcherConfig,
) -> TicketsHarness {
    let health = web::Data::new(HealthState::new());
    let server = create_tickets_server(
        health.clone(),
        TicketsServerConfig {
            bind_addr: loopback(),
            codec,
            tickets: Arc::new(InMemoryTicketRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            authors,
            notifier,
            dispatcher,
            clock,
        },
    )
    .expect("tickets service binds");
    let base_url = format!("http://{}", server.local_addr());
    let handle = server.handle();
    let dispatcher = server.dispatcher();
    let stopped = actix_web::rt::spawn(server.run(Duration::from_secs(2)));
    TicketsHarness {
        base_url,
        handle,
        dispatcher,
        health,
        stopped,
    }
}

/// Headers seen by [`StubUsersService`].
#[derive(Debug, Clone, Default)]
pub struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub trace_id: Option<String>,
}

/// Minimal stand-in for the users service that records what it receives.
pub struct StubUsersService {
    pub base_url: String,
    pub handle: ServerHandle,
    pub seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl StubUsersService {
    /// Answer `GET /users/{id}` with a profile after `delay`.
    pub fn spawn(delay: Duration) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let server = HttpServer::new(move || {
            let recorded = Arc::clone(&recorded);
            App::new().route(
                "/users/{id}",
                web::get().to(move |req: HttpRequest, path: web::Path<i64>| {
                    let recorded = Arc::clone(&recorded);
                    async move {
                        let header = |name: &str| {
                            req.headers()
                                .get(name)
                                .and_then(|value| value.to_str().ok())
                                .map(str::to_owned)
                        };
                        recorded.lock().expect("stub mutex").push(SeenRequest {
                            path: req.path().to_owned(),
                            authorization: header("authorization"),
                            trace_id: header("trace-id"),
                        });
                        tokio::time::sleep(delay).await;
                        let id = path.into_inner();
                        HttpResponse::Ok().json(json!({
                            "id": id,
                            "name": format!("user {id}"),
                            "email": "u@example.com",
                            "role": "client",
                            "phone": ""
                        }))
                    }
                }),
            )
        })
        .workers(1)
        .bind(loopback())
        .expect("stub binds");
        let addr = server.addrs().first().copied().expect("bound address");
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Self {
            base_url: format!("http://{addr}"),
            handle,
            seen,
        }
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("stub mutex").clone()
    }
}

/// POST `body` as JSON and return the status plus decoded body.
pub async fn post_json(
    client: &reqwest::Client,
    url: &str,
    auth: Option<&str>,
    body: &Value,
) -> (u16, Value) {
    let mut request = client.post(url).json(body);
    if let Some(auth) = auth {
        request = request.header("Authorization", auth);
    }
    decode(request.send().await.expect("request sent")).await
}

pub async fn decode(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = response.bytes().await.expect("body read");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}
