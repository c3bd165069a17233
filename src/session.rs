//! # Session Lookup
//!
//! Sessions are issued by the external auth service. Clients present the
//! session token signed as `<token>.<signature>`, where the signature is the
//! standard base64 HMAC-SHA256 of the token under the shared auth secret. The
//! value arrives in the `<prefix>.session_token` cookie (or its `__Secure-`
//! variant), possibly percent-encoded, or as a bearer token.
//!
//! A missing, malformed, forged or expired token means "no session"; it is
//! never an error.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::{AppConfig, ConfigError, MIN_AUTH_SECRET_LEN};
use crate::error::RepositoryError;
use crate::models::{session, user};
use crate::repositories::SessionRepository;

type HmacSha256 = Hmac<Sha256>;

/// Path prefix owned by the auth service; session lookup is skipped there.
pub const AUTH_PATH_PREFIX: &str = "/api/auth/";

/// An authenticated session and the user it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub session: session::Model,
    pub user: user::Model,
}

impl AuthSession {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// Source of the authenticated session for a request.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session_for(&self, headers: &HeaderMap) -> Result<Option<AuthSession>, RepositoryError>;
}

/// Reads and verifies signed session tokens from request headers.
#[derive(Clone)]
pub struct SessionTokenReader {
    secret: Arc<[u8]>,
    cookie_names: [String; 2],
}

impl std::fmt::Debug for SessionTokenReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenReader")
            .field("secret", &"<redacted>")
            .field("cookie_names", &self.cookie_names)
            .finish()
    }
}

impl SessionTokenReader {
    pub fn new(secret: &[u8], cookie_prefix: &str) -> Result<Self, ConfigError> {
        if secret.len() < MIN_AUTH_SECRET_LEN {
            return Err(ConfigError::AuthSecretTooShort {
                length: secret.len(),
            });
        }

        Ok(Self {
            secret: Arc::from(secret),
            cookie_names: [
                format!("__Secure-{cookie_prefix}.session_token"),
                format!("{cookie_prefix}.session_token"),
            ],
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let secret = config
            .auth_secret_bytes()
            .ok_or(ConfigError::MissingAuthSecret)?;
        Self::new(secret, &config.session_cookie_prefix)
    }

    /// Verified, unsigned session token carried by the request, if any.
    ///
    /// Cookies take precedence over the `Authorization` header.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        self.cookie_value(headers)
            .or_else(|| bearer_value(headers))
            .and_then(|raw| self.verify(&raw))
    }

    /// Signs `token` the way the auth service does.
    pub fn sign(&self, token: &str) -> String {
        let signature = base64::engine::general_purpose::STANDARD.encode(self.mac(token));
        format!("{token}.{signature}")
    }

    /// Checks a `<token>.<signature>` value, returning the token on success.
    pub fn verify(&self, value: &str) -> Option<String> {
        let decoded = urlencoding::decode(value).ok()?;
        let (token, signature) = decoded.rsplit_once('.')?;
        if token.is_empty() {
            return None;
        }

        let provided = base64::engine::general_purpose::STANDARD
            .decode(signature)
            .ok()?;
        let expected = self.mac(token);
        if expected.is_empty() {
            return None;
        }

        if subtle::ConstantTimeEq::ct_eq(&expected[..], &provided[..]).into() {
            Some(token.to_string())
        } else {
            None
        }
    }

    fn mac(&self, token: &str) -> Vec<u8> {
        // HMAC accepts keys of any length.
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => return Vec::new(),
        };
        mac.update(token.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    fn cookie_value(&self, headers: &HeaderMap) -> Option<String> {
        let jar = CookieJar::from_headers(headers);
        self.cookie_names.iter().find_map(|name| {
            jar.get(name)
                .map(|cookie| cookie.value_trimmed())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
    }
}

fn bearer_value(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// [`SessionProvider`] backed by the session table.
#[derive(Debug, Clone)]
pub struct DatabaseSessionProvider {
    reader: SessionTokenReader,
    sessions: SessionRepository,
}

impl DatabaseSessionProvider {
    pub fn new(reader: SessionTokenReader, sessions: SessionRepository) -> Self {
        Self { reader, sessions }
    }
}

#[async_trait]
impl SessionProvider for DatabaseSessionProvider {
    async fn session_for(&self, headers: &HeaderMap) -> Result<Option<AuthSession>, RepositoryError> {
        let Some(token) = self.reader.read(headers) else {
            return Ok(None);
        };

        let found = self
            .sessions
            .find_active_by_token(&token, chrono::Utc::now())
            .await?;

        if found.is_none() {
            tracing::debug!("Signed session token has no live session");
        }

        Ok(found.map(|(session, user)| AuthSession { session, user }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TEST_SECRET, setup_test_db};
    use axum::http::{HeaderValue, header::COOKIE};
    use chrono::{Duration, Utc};

    fn reader() -> SessionTokenReader {
        SessionTokenReader::new(TEST_SECRET.as_bytes(), "better-auth").unwrap()
    }

    fn with_header(name: axum::http::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(matches!(
            SessionTokenReader::new(b"short", "better-auth"),
            Err(ConfigError::AuthSecretTooShort { length: 5 })
        ));
    }

    #[test]
    fn signed_token_verifies() {
        let reader = reader();
        let signed = reader.sign("abc123");
        assert_eq!(reader.verify(&signed), Some("abc123".to_string()));
    }

    #[test]
    fn percent_encoded_signature_verifies() {
        let reader = reader();
        let signed = reader.sign("abc123");
        let encoded = signed
            .replace('+', "%2B")
            .replace('/', "%2F")
            .replace('=', "%3D");
        assert_eq!(reader.verify(&encoded), Some("abc123".to_string()));
    }

    #[test]
    fn forged_or_malformed_tokens_fail() {
        let reader = reader();
        let other = SessionTokenReader::new(b"another-secret-another-secret-1234", "better-auth")
            .unwrap();

        assert_eq!(reader.verify(&other.sign("abc123")), None);
        assert_eq!(reader.verify("abc123"), None);
        assert_eq!(reader.verify("abc123.not-base64!"), None);
        assert_eq!(reader.verify(".AAAA"), None);
        assert_eq!(reader.verify("abc%ZZ.AAAA"), None);
    }

    #[test]
    fn cookie_token_is_read() {
        let reader = reader();
        let cookie = format!("theme=dark; better-auth.session_token={}", reader.sign("tok"));
        let headers = with_header(COOKIE, &cookie);
        assert_eq!(reader.read(&headers), Some("tok".to_string()));
    }

    #[test]
    fn secure_cookie_is_read() {
        let reader = reader();
        let cookie = format!("__Secure-better-auth.session_token={}", reader.sign("tok"));
        let headers = with_header(COOKIE, &cookie);
        assert_eq!(reader.read(&headers), Some("tok".to_string()));
    }

    #[test]
    fn bearer_token_is_read() {
        let reader = reader();
        let headers = with_header(AUTHORIZATION, &format!("Bearer {}", reader.sign("tok")));
        assert_eq!(reader.read(&headers), Some("tok".to_string()));

        let basic = with_header(AUTHORIZATION, "Basic dXNlcjpwYXNz");
        assert_eq!(reader.read(&basic), None);
    }

    #[test]
    fn percent_encoded_quoted_cookie_is_read() {
        let reader = reader();
        let encoded = urlencoding::encode(&reader.sign("tok")).into_owned();
        let headers = with_header(COOKIE, &format!("better-auth.session_token=\"{encoded}\"; a=b"));
        assert_eq!(reader.read(&headers), Some("tok".to_string()));
    }

    #[test]
    fn secure_cookie_wins_over_plain_cookie() {
        let reader = reader();
        let cookie = format!(
            "better-auth.session_token={}; __Secure-better-auth.session_token={}",
            reader.sign("plain"),
            reader.sign("secure")
        );
        let headers = with_header(COOKIE, &cookie);
        assert_eq!(reader.read(&headers), Some("secure".to_string()));
    }

    #[test]
    fn unrelated_cookies_are_ignored() {
        let headers = with_header(COOKIE, "other.session_token=abc.def");
        assert_eq!(reader().read(&headers), None);
    }

    #[tokio::test]
    async fn provider_resolves_live_session() {
        let db = setup_test_db().await;
        db.seed_user("u1").await;
        db.seed_session("s1", "tok-1", "u1", Utc::now() + Duration::hours(1))
            .await;

        let reader = reader();
        let headers = with_header(AUTHORIZATION, &format!("Bearer {}", reader.sign("tok-1")));
        let provider = DatabaseSessionProvider::new(reader, SessionRepository::new(db.conn.clone()));

        let auth = provider.session_for(&headers).await.unwrap().unwrap();
        assert_eq!(auth.user_id(), "u1");
        assert_eq!(auth.session.id, "s1");

        assert!(provider.session_for(&HeaderMap::new()).await.unwrap().is_none());
    }
}
