//! Client-side session state.
//!
//! The admin keeps its session token in a client-side cookie named `rf`.
//! [`CookieJar`] is that cookie store; [`AuthGuard`] decides whether a
//! protected route may render or must redirect to login.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use upbreed_core::models::TokenClaims;
use upbreed_core::routes::Route;

/// Name of the cookie holding the session token.
pub const AUTH_COOKIE: &str = "rf";

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    expires: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(true, |at| at > now)
    }
}

/// In-memory cookie store shared by the API client and the route guard.
#[derive(Debug)]
pub struct CookieJar {
    cookies: RwLock<HashMap<String, StoredCookie>>,
    device_signature: String,
}

impl CookieJar {
    pub fn new() -> Self {
        Self {
            cookies: RwLock::new(HashMap::new()),
            device_signature: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Value of a live cookie. Expired cookies read as absent.
    pub fn get(&self, name: &str) -> Option<String> {
        let now = Utc::now();
        self.read()
            .get(name)
            .filter(|c| c.is_live(now))
            .map(|c| c.value.clone())
    }

    /// Set a session cookie (no expiry).
    pub fn set(&self, name: &str, value: impl Into<String>) {
        self.insert(name, value.into(), None);
    }

    pub fn set_with_expiry(&self, name: &str, value: impl Into<String>, expires: DateTime<Utc>) {
        self.insert(name, value.into(), Some(expires));
    }

    pub fn remove(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// Stable identifier of this client, sent with every login.
    pub fn device_signature(&self) -> &str {
        &self.device_signature
    }

    /// The session token, if logged in.
    pub fn auth_token(&self) -> Option<String> {
        self.get(AUTH_COOKIE)
    }

    fn insert(&self, name: &str, value: String, expires: Option<DateTime<Utc>>) {
        tracing::debug!(cookie = name, "Writing cookie");
        self.write()
            .insert(name.to_string(), StoredCookie { value, expires });
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredCookie>> {
        self.cookies.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredCookie>> {
        self.cookies.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    /// Claims, when the token is a readable JWT.
    pub claims: Option<TokenClaims>,
}

/// Navigation the guard demands instead of rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
}

/// Route-level session check.
pub struct AuthGuard;

impl AuthGuard {
    /// Allow the route when a live `rf` cookie is present.
    ///
    /// A JWT token is decoded (without signature verification, the secret
    /// stays server-side) to read its claims. An expired JWT is removed from
    /// the jar and treated as absent. Opaque tokens are accepted as-is.
    pub fn check(jar: &CookieJar) -> Result<Session, Redirect> {
        let redirect = Redirect { to: Route::Login };
        let Some(token) = jar.auth_token() else {
            return Err(redirect);
        };

        match decode_claims(&token) {
            Ok(claims) => Ok(Session {
                token,
                claims: Some(claims),
            }),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                tracing::info!("Session token expired, redirecting to login");
                jar.remove(AUTH_COOKIE);
                Err(redirect)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Session token is not a readable JWT");
                Ok(Session {
                    token,
                    claims: None,
                })
            }
        }
    }

    /// Check access to `route`; public routes always pass.
    pub fn check_route(jar: &CookieJar, route: Route) -> Result<Option<Session>, Redirect> {
        if !route.is_protected() {
            return Ok(None);
        }
        Self::check(jar).map(Some)
    }
}

/// Read the claims of a session token, enforcing `exp`.
pub fn decode_claims(token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = true;
    validation.leeway = 0;
    let data = jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
