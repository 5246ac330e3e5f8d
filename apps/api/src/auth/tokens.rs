use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use hmac::{digest::KeyInit, Hmac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use super::Actor;
use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed or has a bad signature")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("expected a {0:?} token")]
    WrongKind(TokenKind),

    #[error("failed to sign token: {0}")]
    Signing(#[from] jwt::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    staff: bool,
    kind: TokenKind,
    exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    key: Arc<Hmac<Sha256>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            key: Hmac::new_from_slice(secret.as_bytes())
                .context("Failed to load JWT secret")?
                .into(),
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();
        Ok(TokenPair {
            access: self.sign(user, TokenKind::Access, now)?,
            refresh: self.sign(user, TokenKind::Refresh, now)?,
        })
    }

    pub fn access_token(&self, user: &User) -> Result<String, TokenError> {
        self.sign(user, TokenKind::Access, Utc::now().timestamp())
    }

    pub fn verify_access(&self, token: &str) -> Result<Actor, TokenError> {
        self.verify(token, TokenKind::Access, Utc::now().timestamp())
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Actor, TokenError> {
        self.verify(token, TokenKind::Refresh, Utc::now().timestamp())
    }

    fn sign(&self, user: &User, kind: TokenKind, now: i64) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user.id,
            staff: user.is_staff,
            kind,
            exp: now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
        };
        Ok(claims.sign_with_key(&*self.key)?)
    }

    fn verify(&self, token: &str, expected: TokenKind, now: i64) -> Result<Actor, TokenError> {
        let claims: Claims = token
            .verify_with_key(&*self.key)
            .map_err(|_| TokenError::Invalid)?;

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.kind != expected {
            return Err(TokenError::WrongKind(expected));
        }
        Ok(Actor {
            user_id: claims.sub,
            is_staff: claims.staff,
        })
    }
}
