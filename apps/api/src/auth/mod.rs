//! Identity: password hashing, bearer tokens and the authenticated actor.

pub mod handlers;
pub mod password;
pub mod tokens;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub use password::{PasswordError, PasswordService};
pub use tokens::{TokenError, TokenPair, TokenService};

/// The authenticated identity behind a request, taken from a verified
/// access token. Extracting it never touches the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub is_staff: bool,
}

impl Actor {
    pub fn may_manage_user(&self, user_id: Uuid) -> bool {
        self.is_staff || self.user_id == user_id
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts).ok_or_else(AppError::unauthenticated)?;
        state.tokens.verify_access(token).map_err(|err| {
            debug!("Rejected bearer token: {err}");
            AppError::unauthenticated()
        })
    }
}
