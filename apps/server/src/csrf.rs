//! CSRF protection for HTML forms.
//!
//! Double-submit scheme: the browser holds a random nonce in an HttpOnly,
//! `SameSite=Strict` cookie and every rendered form embeds an HS256 token
//! carrying the same nonce. A POST is accepted only when the token verifies,
//! has not expired and names the nonce from the cookie.

use axum::http::{header, HeaderMap, HeaderValue};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::{config::AppConfig, Error, Result};

pub const CSRF_COOKIE: &str = "envirobase_csrf";
/// Name of the hidden form field carrying the token.
pub const CSRF_FIELD: &str = "csrf_token";

const TOKEN_TTL_SECONDS: usize = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CsrfClaims {
    nonce: String,
    iat: usize,
    exp: usize,
}

/// Token for one rendered form, plus the cookie to set when the browser
/// had no nonce yet.
#[derive(Debug, Clone)]
pub struct CsrfToken {
    pub token: String,
    pub set_cookie: Option<HeaderValue>,
}

#[derive(Clone)]
pub struct CsrfManager {
    secret: Vec<u8>,
    secure_cookie: bool,
}

impl CsrfManager {
    pub fn new(app: &AppConfig) -> Self {
        let secret = match &app.secret_key {
            Some(s) if !s.is_empty() => s.as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "`app.secret_key` is not set; using ephemeral CSRF secret (open forms break on restart)"
                );
                format!("{}{}", Uuid::new_v4(), Uuid::new_v4()).into_bytes()
            }
        };

        Self {
            secret,
            secure_cookie: app.is_production(),
        }
    }

    /// Issue a form token bound to the request's nonce cookie, minting a
    /// new nonce when the cookie is absent.
    pub fn issue(&self, headers: &HeaderMap) -> Result<CsrfToken> {
        let (nonce, set_cookie) = match extract_cookie_value(headers, CSRF_COOKIE) {
            Some(nonce) if !nonce.is_empty() => (nonce, None),
            _ => {
                let nonce = Uuid::new_v4().simple().to_string();
                let cookie = HeaderValue::from_str(&build_set_cookie(
                    CSRF_COOKIE,
                    &nonce,
                    self.secure_cookie,
                ))
                .map_err(|e| Error::Internal(format!("invalid CSRF cookie: {e}")))?;
                (nonce, Some(cookie))
            }
        };

        let now = now_epoch_seconds();
        let claims = CsrfClaims {
            nonce,
            iat: now,
            exp: now.saturating_add(TOKEN_TTL_SECONDS),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| Error::Internal(format!("failed to sign CSRF token: {e}")))?;

        Ok(CsrfToken { token, set_cookie })
    }

    pub fn verify(&self, headers: &HeaderMap, token: Option<&str>) -> Result<()> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Csrf("missing form token".to_string()))?;
        let nonce = extract_cookie_value(headers, CSRF_COOKIE)
            .ok_or_else(|| Error::Csrf("missing CSRF cookie".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        let claims = decode::<CsrfClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map_err(|e| Error::Csrf(e.to_string()))?
            .claims;

        if constant_time_eq(claims.nonce.as_bytes(), nonce.as_bytes()) {
            Ok(())
        } else {
            Err(Error::Csrf("token does not match cookie".to_string()))
        }
    }
}

fn now_epoch_seconds() -> usize {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

fn extract_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().to_string())
}

fn build_set_cookie(name: &str, value: &str, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; HttpOnly; SameSite=Strict; Path=/");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
