//! Service configuration loaded via OrthoConfig.
//!
//! Both binaries read the same `HELPDESK_*` namespace. Values come from, in
//! increasing precedence, config files, environment variables and CLI flags.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::DispatcherConfig;

const DEFAULT_TOKEN_TTL_MINUTES: u64 = 60;
const DEFAULT_USERS_SERVICE_URL: &str = "http://users-service:8082";
const DEFAULT_PEER_TIMEOUT_SECS: u64 = 5;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

/// Default listen address of the users service.
pub const USERS_DEFAULT_BIND: &str = "0.0.0.0:8082";
/// Default listen address of the tickets service.
pub const TICKETS_DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Configuration problems detected after loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("HELPDESK_JWT_SECRET must be set to a non-blank value")]
    MissingJwtSecret,
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Settings shared by the users and tickets services.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HELPDESK")]
pub struct HelpdeskSettings {
    /// HMAC secret used to sign and verify bearer tokens.
    pub jwt_secret: Option<String>,
    /// Token lifetime in minutes.
    #[ortho_config(default = 60)]
    pub token_ttl_minutes: u64,
    /// Listen address; each binary has its own default.
    pub bind_addr: Option<String>,
    /// Base URL of the users service, used by the tickets service.
    pub users_service_url: Option<String>,
    #[ortho_config(default = 5)]
    pub peer_timeout_secs: u64,
    /// Total notification queue capacity.
    pub queue_capacity: Option<usize>,
    /// Number of notification workers.
    pub worker_count: Option<usize>,
    /// How long a ticket creation waits for queue space before dropping the
    /// notification.
    pub enqueue_timeout_ms: Option<u64>,
    /// Drain window for the notification pool on shutdown.
    #[ortho_config(default = 10)]
    pub shutdown_grace_secs: u64,
    /// When set, notifications are POSTed here instead of logged.
    pub notify_webhook_url: Option<String>,
    /// When set, logs are also written to a daily file in this directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for HelpdeskSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            bind_addr: None,
            users_service_url: None,
            peer_timeout_secs: DEFAULT_PEER_TIMEOUT_SECS,
            queue_capacity: None,
            worker_count: None,
            enqueue_timeout_ms: None,
            shutdown_grace_secs: DEFAULT_SHUTDOWN_GRACE_SECS,
            notify_webhook_url: None,
            log_dir: None,
        }
    }
}

impl HelpdeskSettings {
    /// Token signing secret.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingJwtSecret`] when the secret is absent
    /// or blank. There is no built-in fallback.
    pub fn jwt_secret(&self) -> Result<Zeroizing<String>, SettingsError> {
        self.jwt_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .map(|secret| Zeroizing::new(secret.to_owned()))
            .ok_or(SettingsError::MissingJwtSecret)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_minutes.saturating_mul(60))
    }

    /// Listen address, falling back to `default` (e.g. [`USERS_DEFAULT_BIND`]).
    ///
    /// # Errors
    /// Returns [`SettingsError::Invalid`] for an unparsable address.
    pub fn bind_addr(&self, default: &str) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(default);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
            key: "bind_addr",
            message: format!("{raw}: {err}"),
        })
    }

    /// # Errors
    /// Returns [`SettingsError::Invalid`] for an unparsable URL.
    pub fn users_service_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "users_service_url",
            self.users_service_url
                .as_deref()
                .unwrap_or(DEFAULT_USERS_SERVICE_URL),
        )
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_timeout_secs)
    }

    /// Dispatcher sizing, with unset values taken from
    /// [`DispatcherConfig::default`].
    pub fn dispatcher(&self) -> DispatcherConfig {
        let defaults = DispatcherConfig::default();
        DispatcherConfig {
            queue_capacity: self.queue_capacity.unwrap_or(defaults.queue_capacity),
            worker_count: self.worker_count.unwrap_or(defaults.worker_count),
            enqueue_timeout: self
                .enqueue_timeout_ms
                .map_or(defaults.enqueue_timeout, Duration::from_millis),
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// # Errors
    /// Returns [`SettingsError::Invalid`] for an unparsable URL.
    pub fn notify_webhook_url(&self) -> Result<Option<Url>, SettingsError> {
        self.notify_webhook_url
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_url("notify_webhook_url", raw))
            .transpose()
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|err| SettingsError::Invalid {
        key,
        message: format!("{raw}: {err}"),
    })
}
