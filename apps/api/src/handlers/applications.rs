use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::ApplicationFields;
use crate::projection::inbound::{query_choice, ApplicationPayload};
use crate::projection::outbound::ApplicationView;
use crate::projection::{Payload, Write};
use crate::repository::ApplicationQuery;
use crate::scope::{self, Resource};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListParams {
    pub status: Option<String>,
}

/// GET /api/jobs/applications?status=
pub async fn list_applications(
    actor: Actor,
    State(state): State<AppState>,
    Query(params): Query<ApplicationListParams>,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    let mut query = ApplicationQuery::new(scope::resolve(&actor, Resource::Application));
    query.status = query_choice("status", params.status)?;

    let applications = state.repo.list_applications(&query).await?;
    Ok(Json(state.projector().applications(applications).await?))
}

/// POST /api/jobs/applications
pub async fn create_application(
    actor: Actor,
    State(state): State<AppState>,
    Payload(req): Payload<ApplicationPayload>,
) -> Result<(StatusCode, Json<ApplicationView>), AppError> {
    let fields = req.validate(Write::Create)?;
    let application = state.repo.create_application(actor.user_id, fields).await?;
    info!(
        "User {} applied to job {} ({})",
        actor.user_id, application.job_id, application.id
    );
    Ok((
        StatusCode::CREATED,
        Json(state.projector().application(application).await?),
    ))
}

/// GET /api/jobs/applications/:id
pub async fn get_application(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationView>, AppError> {
    let application = state
        .repo
        .get_application(id, scope::resolve(&actor, Resource::Application))
        .await?;
    Ok(Json(state.projector().application(application).await?))
}

/// PUT /api/jobs/applications/:id
pub async fn update_application(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<ApplicationPayload>,
) -> Result<Json<ApplicationView>, AppError> {
    save(&state, &actor, id, req, false).await.map(Json)
}

/// PATCH /api/jobs/applications/:id
pub async fn patch_application(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<ApplicationPayload>,
) -> Result<Json<ApplicationView>, AppError> {
    save(&state, &actor, id, req, true).await.map(Json)
}

async fn save(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    req: ApplicationPayload,
    partial: bool,
) -> Result<ApplicationView, AppError> {
    let stored = state
        .repo
        .get_application(id, scope::resolve(actor, Resource::Application))
        .await?;
    let current = ApplicationFields::from(&stored);
    let fields = req.validate(if partial {
        Write::PartialUpdate(&current)
    } else {
        Write::Update(&current)
    })?;
    let application = state.repo.update_application(id, fields).await?;
    Ok(state.projector().application(application).await?)
}

/// DELETE /api/jobs/applications/:id
pub async fn delete_application(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .repo
        .get_application(id, scope::resolve(&actor, Resource::Application))
        .await?;
    state.repo.delete_application(id).await?;
    info!("Application {id} deleted by {}", actor.user_id);
    Ok(StatusCode::NO_CONTENT)
}
