//! Cookie-backed sessions.
//!
//! The authenticated user's profile is serialized into a signed cookie, so
//! the server keeps no session table. A missing, unsigned or undecodable
//! cookie reads as an anonymous session.
//!
//! ```text
//! Anonymous --sign_in--> Authenticated --sign_out--> Anonymous
//! ```

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use tracing::{debug, warn};

use crate::interfaces::{UserProfile, UserRecord};

/// Errors raised while writing a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Session cookie settings shared through router state.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
}

/// Copy of the signed-in user's profile held in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

impl From<UserRecord> for SessionUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            profile: record.profile,
        }
    }
}

/// Derive the cookie signing key.
///
/// A configured secret is stretched to 64 bytes with SHA-512. Without one, a
/// random key is generated for this process only.
pub fn session_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => {
            warn!("no session secret configured; using a random key, sessions end on restart");
            let mut bytes = [0u8; 64];
            rand::rng().fill(&mut bytes);
            Key::from(&bytes[..])
        }
    }
}

/// Request-scoped session, extracted from the signed cookie jar.
pub struct Session {
    jar: SignedCookieJar,
    cookie_name: String,
    user: Option<SessionUser>,
}

impl Session {
    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// Store `user` in the session. Return the jar in the response.
    pub fn sign_in(self, user: &SessionUser) -> Result<SignedCookieJar, SessionError> {
        let value = encode_user(user)?;
        let cookie = Cookie::build((self.cookie_name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        Ok(self.jar.add(cookie))
    }

    /// Drop the session cookie. Return the jar in the response.
    pub fn sign_out(self) -> SignedCookieJar {
        self.jar
            .remove(Cookie::build((self.cookie_name, "")).path("/"))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Key: FromRef<S>,
    SessionSettings: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::<Key>::from_request_parts(parts, state).await?;
        let settings = SessionSettings::from_ref(state);

        let user = jar
            .get(&settings.cookie_name)
            .and_then(|cookie| decode_user(cookie.value()));

        Ok(Self {
            jar,
            cookie_name: settings.cookie_name,
            user,
        })
    }
}

// Cookie values cannot carry raw JSON (quotes, commas), so the payload is
// base64url without padding.
fn encode_user(user: &SessionUser) -> Result<String, SessionError> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(user)?))
}

fn decode_user(value: &str) -> Option<SessionUser> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| debug!(error = %e, "session cookie is not base64"))
        .ok()?;
    serde_json::from_slice(&bytes)
        .map_err(|e| debug!(error = %e, "session cookie payload is not a user"))
        .ok()
}
