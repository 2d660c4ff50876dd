use crate::infrastructure::security::{sign_token, verify_token};
use crate::presentation::handlers::{WebError, app_state};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use tracing::debug;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String, // username
    iat: i64,
    exp: i64,
}

/// Signing secret and cookie attributes shared by the session and flash
/// cookies.
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    ttl_secs: i64,
    secure: bool,
}

impl SessionKeys {
    pub fn new(secret: impl Into<String>, ttl_secs: i64, secure: bool) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
            secure,
        }
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    /// Base cookie with the attributes every cookie we set carries.
    pub(crate) fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .finish()
    }

    pub(crate) fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.cookie(name, String::new());
        cookie.make_removal();
        cookie
    }

    /// Session cookie for `username`, valid for the configured TTL.
    pub fn issue(&self, username: &str) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        let token = sign_token(&claims, &self.secret)?;
        Ok(self.cookie(SESSION_COOKIE, token))
    }

    pub fn clear(&self) -> Cookie<'static> {
        self.removal(SESSION_COOKIE)
    }

    /// Username from a valid session cookie. Anything unverifiable counts as
    /// logged out.
    pub fn username_from(&self, req: &HttpRequest) -> Option<String> {
        let cookie = req.cookie(SESSION_COOKIE)?;
        match verify_token::<SessionClaims>(cookie.value(), &self.secret) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                debug!(error = %e, "Ignoring invalid session cookie");
                None
            }
        }
    }
}

/// The logged-in user, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    username: Option<String>,
}

impl Session {
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

impl FromRequest for Session {
    type Error = WebError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(app_state(req).map(|state| Session {
            username: state.sessions.username_from(req),
        }))
    }
}
