//! Shared test doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{
    AuthorDirectory, NotifyError, PasswordHashError, PasswordHasher, PeerFetchError,
    TicketNotifier,
};
use crate::domain::{BearerToken, NotificationJob, TicketId, UserId, UserProfile};

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}",)
            }
        };
        *self.lock_clock() += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Notifier that records every job it is handed.
#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<NotificationJob>>);

impl RecordingNotifier {
    /// Jobs delivered so far, in delivery order.
    pub fn jobs(&self) -> Vec<NotificationJob> {
        match self.0.lock() {
            Ok(jobs) => jobs.clone(),
            Err(_) => panic!("notifier mutex"),
        }
    }

    /// Ticket ids delivered so far, in delivery order.
    pub fn ticket_ids(&self) -> Vec<TicketId> {
        self.jobs().into_iter().map(|job| job.ticket_id).collect()
    }

    /// Poll until at least `count` jobs arrived or `timeout` elapses.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<NotificationJob> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let jobs = self.jobs();
            if jobs.len() >= count || tokio::time::Instant::now() >= deadline {
                return jobs;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl TicketNotifier for RecordingNotifier {
    async fn ticket_created(&self, job: &NotificationJob) -> Result<(), NotifyError> {
        match self.0.lock() {
            Ok(mut jobs) => jobs.push(*job),
            Err(_) => panic!("notifier mutex"),
        }
        Ok(())
    }
}

/// Author directory answering from a fixed list, or failing every call.
pub struct StaticAuthorDirectory {
    profiles: Vec<UserProfile>,
    failure: Option<PeerFetchError>,
    seen_tokens: Mutex<Vec<String>>,
}

impl StaticAuthorDirectory {
    pub fn with_profiles(profiles: Vec<UserProfile>) -> Arc<Self> {
        Arc::new(Self {
            profiles,
            failure: None,
            seen_tokens: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: PeerFetchError) -> Arc<Self> {
        Arc::new(Self {
            profiles: Vec::new(),
            failure: Some(error),
            seen_tokens: Mutex::new(Vec::new()),
        })
    }

    /// Raw bearer tokens presented so far.
    pub fn seen_tokens(&self) -> Vec<String> {
        match self.seen_tokens.lock() {
            Ok(tokens) => tokens.clone(),
            Err(_) => panic!("directory mutex"),
        }
    }
}

#[async_trait]
impl AuthorDirectory for StaticAuthorDirectory {
    async fn fetch_author(
        &self,
        bearer: &BearerToken,
        owner: UserId,
    ) -> Result<UserProfile, PeerFetchError> {
        match self.seen_tokens.lock() {
            Ok(mut tokens) => tokens.push(bearer.expose().to_owned()),
            Err(_) => panic!("directory mutex"),
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.profiles
            .iter()
            .find(|profile| profile.id == owner)
            .cloned()
            .ok_or_else(|| PeerFetchError::non_ok(404_u16))
    }
}

/// Reversible hasher for tests that do not want to pay for Argon2.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPasswordHasher;

impl PasswordHasher for PlainPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        hash.strip_prefix("plain:")
            .map(|stored| stored == password)
            .ok_or_else(|| PasswordHashError::hash("not a plain hash"))
    }
}
