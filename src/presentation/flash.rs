//! One-shot messages that survive a redirect.
//!
//! The messages travel in a short-lived signed cookie. The page that
//! renders them also removes the cookie.

use crate::infrastructure::security::{sign_token, verify_token};
use crate::presentation::handlers::{WebError, app_state};
use crate::presentation::session::SessionKeys;
use actix_web::cookie::Cookie;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use tracing::debug;

pub const FLASH_COOKIE: &str = "flash";
const FLASH_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Danger,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FlashClaims {
    flashes: Vec<Flash>,
    exp: i64,
}

pub fn flash_cookie(keys: &SessionKeys, flashes: &[Flash]) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
    let claims = FlashClaims {
        flashes: flashes.to_vec(),
        exp: Utc::now().timestamp() + FLASH_TTL_SECS,
    };
    let token = sign_token(&claims, keys.secret())?;
    Ok(keys.cookie(FLASH_COOKIE, token))
}

pub fn clear_flash_cookie(keys: &SessionKeys) -> Cookie<'static> {
    keys.removal(FLASH_COOKIE)
}

fn read_flashes(keys: &SessionKeys, req: &HttpRequest) -> (Vec<Flash>, bool) {
    let Some(cookie) = req.cookie(FLASH_COOKIE) else {
        return (Vec::new(), false);
    };
    match verify_token::<FlashClaims>(cookie.value(), keys.secret()) {
        Ok(claims) => (claims.flashes, true),
        Err(e) => {
            debug!(error = %e, "Discarding invalid flash cookie");
            (Vec::new(), true)
        }
    }
}

/// Flashes left by the previous response.
#[derive(Debug, Default)]
pub struct IncomingFlashes {
    flashes: Vec<Flash>,
    cookie_present: bool,
}

impl IncomingFlashes {
    pub fn messages(&self) -> &[Flash] {
        &self.flashes
    }

    /// Whether the response must remove the flash cookie.
    pub fn needs_clearing(&self) -> bool {
        self.cookie_present
    }
}

impl FromRequest for IncomingFlashes {
    type Error = WebError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(app_state(req).map(|state| {
            let (flashes, cookie_present) = read_flashes(&state.sessions, req);
            IncomingFlashes {
                flashes,
                cookie_present,
            }
        }))
    }
}
