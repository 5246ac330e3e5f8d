use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::ProfileFields;
use crate::projection::inbound::ProfilePayload;
use crate::projection::outbound::ProfileView;
use crate::projection::{Payload, Write};
use crate::scope::{self, Resource};
use crate::state::AppState;

/// GET /api/auth/profiles
pub async fn list_profiles(
    actor: Actor,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileView>>, AppError> {
    let profiles = state
        .repo
        .list_profiles(scope::resolve(&actor, Resource::UserProfile))
        .await?;
    Ok(Json(state.projector().profiles(profiles).await?))
}

/// POST /api/auth/profiles
pub async fn create_profile(
    actor: Actor,
    State(state): State<AppState>,
    Payload(req): Payload<ProfilePayload>,
) -> Result<(StatusCode, Json<ProfileView>), AppError> {
    let fields = req.validate(Write::Create)?;
    let profile = state.repo.create_profile(actor.user_id, fields).await?;
    info!("Created profile {} for user {}", profile.id, actor.user_id);
    Ok((
        StatusCode::CREATED,
        Json(state.projector().profile(profile).await?),
    ))
}

/// GET /api/auth/profiles/:id
pub async fn get_profile(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>, AppError> {
    let profile = state
        .repo
        .get_profile(id, scope::resolve(&actor, Resource::UserProfile))
        .await?;
    Ok(Json(state.projector().profile(profile).await?))
}

/// PUT /api/auth/profiles/:id
pub async fn update_profile(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<ProfilePayload>,
) -> Result<Json<ProfileView>, AppError> {
    save(&state, &actor, id, req, false).await.map(Json)
}

/// PATCH /api/auth/profiles/:id
pub async fn patch_profile(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<ProfilePayload>,
) -> Result<Json<ProfileView>, AppError> {
    save(&state, &actor, id, req, true).await.map(Json)
}

async fn save(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    req: ProfilePayload,
    partial: bool,
) -> Result<ProfileView, AppError> {
    let stored = state
        .repo
        .get_profile(id, scope::resolve(actor, Resource::UserProfile))
        .await?;
    let current = ProfileFields::from(&stored);
    let fields = req.validate(if partial {
        Write::PartialUpdate(&current)
    } else {
        Write::Update(&current)
    })?;
    let profile = state.repo.update_profile(id, fields).await?;
    Ok(state.projector().profile(profile).await?)
}

/// DELETE /api/auth/profiles/:id
pub async fn delete_profile(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .repo
        .get_profile(id, scope::resolve(&actor, Resource::UserProfile))
        .await?;
    state.repo.delete_profile(id).await?;
    info!("Profile {id} deleted by {}", actor.user_id);
    Ok(StatusCode::NO_CONTENT)
}
