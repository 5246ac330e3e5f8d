use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{Actor, PasswordError, TokenPair};
use crate::errors::AppError;
use crate::models::{NewUser, UserType};
use crate::projection::inbound::{LoginPayload, RefreshPayload, RegistrationPayload};
use crate::projection::outbound::{ProfileView, UserView};
use crate::projection::Payload;
use crate::repository::Repository;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserView,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Serialize)]
pub struct AccessResponse {
    pub access: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Payload(req): Payload<RegistrationPayload>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let registration = req.validate()?;
    let password_hash = state.passwords.hash(registration.password).await?;

    let (user, profile) = state
        .repo
        .create_user(
            NewUser {
                username: registration.username,
                email: registration.email,
                first_name: registration.first_name,
                last_name: registration.last_name,
                password_hash,
                is_staff: false,
            },
            registration.user_type,
        )
        .await?;

    info!(
        "Registered user {} ({}) as {}",
        user.id, user.username, profile.user_type
    );

    let tokens = state.tokens.issue(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            tokens,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Payload(req): Payload<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(invalid_credentials());
    };
    if username.is_empty() || password.is_empty() {
        return Err(invalid_credentials());
    }

    let Some(credentials) = state.repo.find_credentials(&username).await? else {
        warn!("Login failed for unknown user {username}");
        return Err(invalid_credentials());
    };

    match state
        .passwords
        .verify(password, credentials.password_hash)
        .await
    {
        Ok(()) => {}
        Err(PasswordError::Mismatch) => {
            warn!("Login failed for user {}", credentials.user.id);
            return Err(invalid_credentials());
        }
        Err(PasswordError::Other(err)) => return Err(AppError::Internal(err)),
    }

    let tokens = state.tokens.issue(&credentials.user)?;
    Ok(Json(AuthResponse {
        user: credentials.user.into(),
        tokens,
    }))
}

/// POST /api/auth/token/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Payload(req): Payload<RefreshPayload>,
) -> Result<Json<AccessResponse>, AppError> {
    let token = req
        .refresh
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::validation("refresh", "This field is required."))?;

    let actor = state
        .tokens
        .verify_refresh(&token)
        .map_err(|_| AppError::Unauthorized("Token is invalid or expired".into()))?;
    let user = state
        .repo
        .get_user(actor.user_id)
        .await
        .map_err(|_| AppError::Unauthorized("User not found".into()))?;

    Ok(Json(AccessResponse {
        access: state.tokens.access_token(&user)?,
    }))
}

/// GET /api/auth/profile
pub async fn profile(
    actor: Actor,
    State(state): State<AppState>,
) -> Result<Json<ProfileView>, AppError> {
    let profile = state
        .repo
        .profile_for_user(actor.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;

    Ok(Json(state.projector().profile(profile).await?))
}

/// DELETE /api/auth/users/:id
pub async fn delete_user(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !actor.may_manage_user(id) {
        return Err(AppError::Forbidden);
    }
    state.repo.delete_user(id).await?;
    info!("User {id} deleted by {}", actor.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the configured staff account on startup unless it already exists.
pub async fn ensure_admin(
    repo: &dyn Repository,
    passwords: &super::PasswordService,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    if repo.find_credentials(username).await?.is_some() {
        info!("Admin account {username} already present");
        return Ok(());
    }

    let password_hash = passwords.hash(password.to_string()).await?;
    let (user, _) = repo
        .create_user(
            NewUser {
                username: username.to_string(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                password_hash,
                is_staff: true,
            },
            UserType::Admin,
        )
        .await?;

    info!("Created admin account {} ({})", user.username, user.id);
    Ok(())
}
