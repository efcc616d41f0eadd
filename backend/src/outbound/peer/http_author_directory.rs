//! Reqwest-backed author lookup against the users service.
//!
//! The caller's bearer token is forwarded verbatim together with the current
//! trace id. The token lives only as long as the borrowed [`BearerToken`];
//! logs carry its fingerprint instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, warn};

use crate::domain::ports::{AuthorDirectory, PeerFetchError};
use crate::domain::{BearerToken, TRACE_ID_HEADER, TraceId, UserId, UserProfile};

/// Default timeout for one author lookup.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest profile body read from the users service.
pub const MAX_PEER_BODY_BYTES: usize = 64 * 1024;

/// Errors raised while building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum PeerClientError {
    /// The base URL cannot carry path segments.
    #[error("users service URL {0} cannot be used as a base URL")]
    InvalidBaseUrl(Url),
    /// reqwest rejected the client configuration.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Author directory that GETs `{base}/users/{id}`.
pub struct HttpAuthorDirectory {
    client: Client,
    base_url: Url,
    body_limit: usize,
}

impl HttpAuthorDirectory {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    /// Returns [`PeerClientError`] when the URL cannot be a base or the
    /// client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, PeerClientError> {
        if base_url.cannot_be_a_base() {
            return Err(PeerClientError::InvalidBaseUrl(base_url));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            body_limit: MAX_PEER_BODY_BYTES,
        })
    }

    /// Override the response body cap (default [`MAX_PEER_BODY_BYTES`]).
    #[must_use]
    pub const fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    fn user_url(&self, owner: UserId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("users")
                .push(&owner.to_string());
        }
        url
    }

    async fn request(
        &self,
        bearer: &BearerToken,
        owner: UserId,
    ) -> Result<UserProfile, PeerFetchError> {
        let mut request = self
            .client
            .get(self.user_url(owner))
            .header(AUTHORIZATION, format!("Bearer {}", bearer.expose()))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(trace_id) = TraceId::current() {
            request = request.header(TRACE_ID_HEADER, trace_id.to_string());
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(PeerFetchError::non_ok(status.as_u16()));
        }
        let body = read_capped(response, self.body_limit).await?;
        parse_profile(&body)
    }
}

#[async_trait]
impl AuthorDirectory for HttpAuthorDirectory {
    async fn fetch_author(
        &self,
        bearer: &BearerToken,
        owner: UserId,
    ) -> Result<UserProfile, PeerFetchError> {
        let outcome = self.request(bearer, owner).await;
        match &outcome {
            Ok(_) => debug!(owner = %owner, "author resolved"),
            Err(error) => warn!(
                owner = %owner,
                kind = error.kind(),
                token_fingerprint = %bearer.fingerprint(),
                %error,
                "author lookup failed"
            ),
        }
        outcome
    }
}

/// Read the body, giving up once it grows past `limit` bytes.
async fn read_capped(mut response: Response, limit: usize) -> Result<Vec<u8>, PeerFetchError> {
    let too_large = || PeerFetchError::decode(format!("user payload exceeds {limit} bytes"));
    let declared = response.content_length().unwrap_or(0);
    if !usize::try_from(declared).is_ok_and(|declared| declared <= limit) {
        return Err(too_large());
    }

    let mut body = Vec::with_capacity(usize::try_from(declared).unwrap_or(0));
    while let Some(chunk) = response.chunk().await.map_err(map_transport_error)? {
        if body.len().saturating_add(chunk.len()) > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn parse_profile(body: &[u8]) -> Result<UserProfile, PeerFetchError> {
    serde_json::from_slice(body)
        .map_err(|error| PeerFetchError::decode(format!("invalid user payload: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> PeerFetchError {
    if error.is_timeout() {
        PeerFetchError::timeout(error.to_string())
    } else if error.is_decode() {
        PeerFetchError::decode(error.to_string())
    } else {
        PeerFetchError::transport(error.to_string())
    }
}
