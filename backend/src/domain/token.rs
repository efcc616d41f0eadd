//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the caller [`Identity`] plus
//! `{iat, exp, iss}`. There is no server-side record and no revocation list:
//! a token stays valid until `exp`, checked against the injected clock.
//!
//! Verification order:
//! 1. shape (three dot-separated segments, decodable header) else `Malformed`;
//! 2. header `alg` pinned to `HS256` before any signature work, else
//!    `InvalidSignature` (this rejects `none`);
//! 3. signature, then claims and issuer;
//! 4. expiry as `now >= exp`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{Identity, UserId};

/// Issuer stamped into, and required from, every token.
pub const TOKEN_ISSUER: &str = "help-desk-api";

/// Token lifetime used when configuration does not override it.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

const PINNED_ALGORITHM: &str = "HS256";
const FINGERPRINT_LEN: usize = 12;

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Reasons a presented token is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not a well-formed token, or claims that cannot be trusted.
    #[error("token is malformed")]
    Malformed,
    /// Signature mismatch or an algorithm other than HS256.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The token is past its expiry.
    #[error("token has expired")]
    Expired,
}

/// Startup fault raised when the signing secret is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SigningKeyError {
    /// The secret was empty or whitespace only.
    #[error("token signing secret must not be blank")]
    Blank,
}

/// Failure to produce a signed token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to sign token: {message}")]
pub struct SigningError {
    message: String,
}

/// Raw bearer credential as presented by the caller.
///
/// Kept only for the lifetime of one request so it can be forwarded to the
/// users service unmodified. `Debug` prints a fingerprint, never the token.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// The token exactly as presented.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Short SHA-256 fingerprint for correlating log lines.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut encoded = hex::encode(digest);
        encoded.truncate(FINGERPRINT_LEN);
        encoded
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&self.fingerprint()).finish()
    }
}

/// Signs and verifies identity tokens.
///
/// Stateless apart from the key material, so one instance is shared by
/// every request handler.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use helpdesk::domain::{Identity, TokenCodec, UserId};
/// use mockable::DefaultClock;
///
/// let codec = TokenCodec::new(b"not-a-real-secret", Duration::from_secs(3600), Arc::new(DefaultClock))
///     .expect("secret is not blank");
/// let identity = Identity::new(UserId::new(42), "Ana", "ana@example.com");
/// let token = codec.issue(&identity).expect("sign");
/// assert_eq!(codec.verify(&token).expect("verify"), identity);
/// ```
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Build a codec from an injected secret.
    ///
    /// # Errors
    /// Returns [`SigningKeyError::Blank`] when the secret is empty or
    /// whitespace only.
    pub fn new(
        secret: &[u8],
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SigningKeyError> {
        if secret.iter().all(u8::is_ascii_whitespace) {
            return Err(SigningKeyError::Blank);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock instead.
        validation.validate_exp = false;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
            clock,
        })
    }

    /// Build a codec from a zeroizing secret string.
    ///
    /// # Errors
    /// See [`TokenCodec::new`].
    pub fn from_secret(
        secret: &Zeroizing<String>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SigningKeyError> {
        Self::new(secret.as_bytes(), ttl, clock)
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub const fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a signed token for `identity`.
    ///
    /// # Errors
    /// Returns [`SigningError`] when the claims cannot be encoded.
    pub fn issue(&self, identity: &Identity) -> Result<String, SigningError> {
        let iat = self.clock.utc().timestamp();
        let claims = Claims {
            user_id: identity.user_id().get(),
            name: identity.name().to_owned(),
            email: identity.email().to_owned(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
            iss: TOKEN_ISSUER.to_owned(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |error| SigningError {
                message: error.to_string(),
            },
        )
    }

    /// Verify `token` and return the identity it carries.
    ///
    /// # Errors
    /// Returns the first [`TokenError`] encountered in the order described
    /// in the module documentation.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let header = header_segment(token)?;
        if header_algorithm(header)? != PINNED_ALGORITHM {
            return Err(TokenError::InvalidSignature);
        }

        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|error| map_decode_error(&error))?
            .claims;

        if self.clock.utc().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(Identity::new(
            UserId::new(claims.user_id),
            claims.name,
            claims.email,
        ))
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

fn header_segment(token: &str) -> Result<&str, TokenError> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        // An empty signature segment is left to the algorithm check.
        (Some(header), Some(claims), Some(_), None) if !header.is_empty() && !claims.is_empty() => {
            Ok(header)
        }
        _ => Err(TokenError::Malformed),
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

fn header_algorithm(segment: &str) -> Result<String, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    let header: RawHeader = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;
    Ok(header.alg)
}

fn map_decode_error(error: &jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for token issuance and verification.
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::DateTime;
    use rstest::{fixture, rstest};

    const SECRET: &[u8] = b"unit-test-signing-secret";
    const START: i64 = 1_700_000_000;

    struct Harness {
        clock: Arc<MutableClock>,
        codec: TokenCodec,
    }

    #[fixture]
    fn harness() -> Harness {
        let now = DateTime::from_timestamp(START, 0).expect("valid timestamp");
        let clock = Arc::new(MutableClock::new(now));
        let codec = TokenCodec::new(SECRET, DEFAULT_TOKEN_TTL, clock.clone())
            .expect("secret is not blank");
        Harness { clock, codec }
    }

    fn ana() -> Identity {
        Identity::new(UserId::new(42), "Ana", "ana@example.com")
    }

    fn decode_payload(token: &str) -> serde_json::Value {
        let payload = token.split('.').nth(1).expect("payload segment");
        let bytes = URL_SAFE_NO_PAD.decode(payload).expect("base64 payload");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    fn forge(header: &Header, claims: &Claims, secret: &[u8]) -> String {
        jsonwebtoken::encode(header, claims, &EncodingKey::from_secret(secret)).expect("encode")
    }

    fn claims_for(identity: &Identity, iss: &str) -> Claims {
        Claims {
            user_id: identity.user_id().get(),
            name: identity.name().to_owned(),
            email: identity.email().to_owned(),
            iat: START,
            exp: START + 3600,
            iss: iss.to_owned(),
        }
    }

    #[rstest]
    fn issued_token_round_trips(harness: Harness) {
        let token = harness.codec.issue(&ana()).expect("issue");
        let identity = harness.codec.verify(&token).expect("verify");
        assert_eq!(identity, ana());
    }

    #[rstest]
    fn issued_claims_use_wire_names_and_default_lifetime(harness: Harness) {
        let token = harness.codec.issue(&ana()).expect("issue");
        let payload = decode_payload(&token);
        assert_eq!(payload["userID"], 42);
        assert_eq!(payload["nome"], "Ana");
        assert_eq!(payload["email"], "ana@example.com");
        assert_eq!(payload["iss"], TOKEN_ISSUER);
        assert_eq!(payload["iat"], START);
        assert_eq!(payload["exp"], START + 3600);
    }

    #[rstest]
    fn token_is_valid_until_the_last_second(harness: Harness) {
        let token = harness.codec.issue(&ana()).expect("issue");
        harness.clock.advance_seconds(3599);
        assert!(harness.codec.verify(&token).is_ok());
    }

    #[rstest]
    #[case(3600)]
    #[case(7200)]
    fn token_expires_at_exp(harness: Harness, #[case] elapsed: i64) {
        let token = harness.codec.issue(&ana()).expect("issue");
        harness.clock.advance_seconds(elapsed);
        assert_eq!(harness.codec.verify(&token), Err(TokenError::Expired));
    }

    #[rstest]
    fn unsigned_none_token_is_rejected_as_invalid_signature(harness: Harness) {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = serde_json::to_vec(&claims_for(&ana(), TOKEN_ISSUER)).expect("claims");
        let payload = URL_SAFE_NO_PAD.encode(claims);
        let forged = format!("{header}.{payload}.");
        assert_eq!(
            harness.codec.verify(&forged),
            Err(TokenError::InvalidSignature)
        );
    }

    #[rstest]
    #[case(Algorithm::HS384)]
    #[case(Algorithm::HS512)]
    fn other_hmac_algorithms_are_rejected(harness: Harness, #[case] alg: Algorithm) {
        let forged = forge(
            &Header::new(alg),
            &claims_for(&ana(), TOKEN_ISSUER),
            SECRET,
        );
        assert_eq!(
            harness.codec.verify(&forged),
            Err(TokenError::InvalidSignature)
        );
    }

    #[rstest]
    fn foreign_secret_is_rejected(harness: Harness) {
        let forged = forge(
            &Header::new(Algorithm::HS256),
            &claims_for(&ana(), TOKEN_ISSUER),
            b"someone-else",
        );
        assert_eq!(
            harness.codec.verify(&forged),
            Err(TokenError::InvalidSignature)
        );
    }

    #[rstest]
    fn tampered_payload_is_rejected(harness: Harness) {
        let token = harness.codec.issue(&ana()).expect("issue");
        let mut parts: Vec<&str> = token.split('.').collect();
        let mut elevated = claims_for(&ana(), TOKEN_ISSUER);
        elevated.user_id = 1;
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&elevated).expect("claims"));
        parts[1] = payload.as_str();
        assert_eq!(
            harness.codec.verify(&parts.join(".")),
            Err(TokenError::InvalidSignature)
        );
    }

    #[rstest]
    fn foreign_issuer_is_malformed(harness: Harness) {
        let forged = forge(
            &Header::new(Algorithm::HS256),
            &claims_for(&ana(), "someone-else"),
            SECRET,
        );
        assert_eq!(harness.codec.verify(&forged), Err(TokenError::Malformed));
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("a.b")]
    #[case("a.b.c.d")]
    #[case(".payload.sig")]
    #[case("!!!.payload.sig")]
    #[case("bm90LWpzb24.payload.sig")]
    fn malformed_shapes_are_rejected(harness: Harness, #[case] token: &str) {
        assert_eq!(harness.codec.verify(token), Err(TokenError::Malformed));
    }

    #[test]
    fn bearer_debug_shows_fingerprint_only() {
        let bearer = BearerToken::new("secret-token-value");
        let rendered = format!("{bearer:?}");
        assert!(!rendered.contains("secret-token-value"));
        assert!(rendered.contains(&bearer.fingerprint()));
        assert_eq!(bearer.fingerprint().len(), FINGERPRINT_LEN);
    }

    #[rstest]
    #[case(&b""[..])]
    #[case(&b"   "[..])]
    #[case(&b"\n\t"[..])]
    fn blank_secret_is_a_startup_fault(#[case] secret: &[u8]) {
        let clock = Arc::new(MutableClock::new(chrono::Utc::now()));
        let result = TokenCodec::new(secret, DEFAULT_TOKEN_TTL, clock);
        assert!(matches!(result, Err(SigningKeyError::Blank)));
    }
}
