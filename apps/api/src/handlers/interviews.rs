use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::InterviewFields;
use crate::projection::inbound::InterviewPayload;
use crate::projection::outbound::InterviewView;
use crate::projection::{Payload, Write};
use crate::scope::{self, Resource};
use crate::state::AppState;

/// GET /api/jobs/interviews
pub async fn list_interviews(
    actor: Actor,
    State(state): State<AppState>,
) -> Result<Json<Vec<InterviewView>>, AppError> {
    let interviews = state
        .repo
        .list_interviews(scope::resolve(&actor, Resource::Interview))
        .await?;
    Ok(Json(state.projector().interviews(interviews).await?))
}

/// POST /api/jobs/interviews
pub async fn create_interview(
    actor: Actor,
    State(state): State<AppState>,
    Payload(req): Payload<InterviewPayload>,
) -> Result<(StatusCode, Json<InterviewView>), AppError> {
    let fields = req.validate(Write::Create)?;
    let interview = state.repo.create_interview(actor.user_id, fields).await?;
    info!(
        "Interview {} scheduled for application {} by {}",
        interview.id, interview.application_id, actor.user_id
    );
    Ok((
        StatusCode::CREATED,
        Json(state.projector().interview(interview).await?),
    ))
}

/// GET /api/jobs/interviews/:id
pub async fn get_interview(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let interview = state
        .repo
        .get_interview(id, scope::resolve(&actor, Resource::Interview))
        .await?;
    Ok(Json(state.projector().interview(interview).await?))
}

/// PUT /api/jobs/interviews/:id
pub async fn update_interview(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<InterviewPayload>,
) -> Result<Json<InterviewView>, AppError> {
    save(&state, &actor, id, req, false).await.map(Json)
}

/// PATCH /api/jobs/interviews/:id
pub async fn patch_interview(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<InterviewPayload>,
) -> Result<Json<InterviewView>, AppError> {
    save(&state, &actor, id, req, true).await.map(Json)
}

async fn save(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    req: InterviewPayload,
    partial: bool,
) -> Result<InterviewView, AppError> {
    let stored = state
        .repo
        .get_interview(id, scope::resolve(actor, Resource::Interview))
        .await?;
    let current = InterviewFields::from(&stored);
    let fields = req.validate(if partial {
        Write::PartialUpdate(&current)
    } else {
        Write::Update(&current)
    })?;
    let interview = state.repo.update_interview(id, fields).await?;
    Ok(state.projector().interview(interview).await?)
}

/// DELETE /api/jobs/interviews/:id
pub async fn delete_interview(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .repo
        .get_interview(id, scope::resolve(&actor, Resource::Interview))
        .await?;
    state.repo.delete_interview(id).await?;
    info!("Interview {id} deleted by {}", actor.user_id);
    Ok(StatusCode::NO_CONTENT)
}
