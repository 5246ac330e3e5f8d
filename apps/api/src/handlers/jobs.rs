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
use crate::models::JobFields;
use crate::projection::inbound::{query_choice, query_text, JobPayload};
use crate::projection::outbound::{ApplicationView, JobView};
use crate::projection::{Payload, Write};
use crate::repository::{ApplicationQuery, JobQuery};
use crate::scope::{self, Resource};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct JobListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    pub employment_type: Option<String>,
}

impl JobListParams {
    fn into_query(self, actor: &Actor) -> Result<JobQuery, AppError> {
        let mut query = JobQuery::new(scope::resolve(actor, Resource::Job));
        query.status = query_choice("status", self.status)?;
        query.employment_type = query_choice("employment_type", self.employment_type)?;
        query.search = query_text(self.search);
        Ok(query)
    }
}

/// GET /api/jobs/jobs?status=&search=&employment_type=
pub async fn list_jobs(
    actor: Actor,
    State(state): State<AppState>,
    Query(params): Query<JobListParams>,
) -> Result<Json<Vec<JobView>>, AppError> {
    let query = params.into_query(&actor)?;
    let jobs = state.repo.list_jobs(&query).await?;
    Ok(Json(state.projector().jobs(jobs).await?))
}

/// POST /api/jobs/jobs
pub async fn create_job(
    actor: Actor,
    State(state): State<AppState>,
    Payload(req): Payload<JobPayload>,
) -> Result<(StatusCode, Json<JobView>), AppError> {
    let fields = req.validate(Write::Create)?;
    let job = state.repo.create_job(actor.user_id, fields).await?;
    info!("Job {} posted by {}", job.id, actor.user_id);
    Ok((StatusCode::CREATED, Json(state.projector().job(job).await?)))
}

/// GET /api/jobs/jobs/:id
/// Open to any actor the `Actor` extractor authenticates.
pub async fn get_job(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobView>, AppError> {
    let job = state.repo.get_job(id).await?;
    Ok(Json(state.projector().job(job).await?))
}

/// PUT /api/jobs/jobs/:id
/// Open to any actor the `Actor` extractor authenticates.
pub async fn update_job(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<JobPayload>,
) -> Result<Json<JobView>, AppError> {
    save(&state, id, req, false).await.map(Json)
}

/// PATCH /api/jobs/jobs/:id
/// Open to any actor the `Actor` extractor authenticates.
pub async fn patch_job(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<JobPayload>,
) -> Result<Json<JobView>, AppError> {
    save(&state, id, req, true).await.map(Json)
}

async fn save(
    state: &AppState,
    id: Uuid,
    req: JobPayload,
    partial: bool,
) -> Result<JobView, AppError> {
    let current = JobFields::from(&state.repo.get_job(id).await?);
    let fields = req.validate(if partial {
        Write::PartialUpdate(&current)
    } else {
        Write::Update(&current)
    })?;
    let job = state.repo.update_job(id, fields).await?;
    Ok(state.projector().job(job).await?)
}

/// DELETE /api/jobs/jobs/:id
pub async fn delete_job(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.repo.delete_job(id).await?;
    info!("Job {id} deleted by {}", actor.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/jobs/jobs/:id/applications
pub async fn job_applications(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    let job = state.repo.get_job(id).await?;
    let mut query = ApplicationQuery::new(scope::resolve(&actor, Resource::Application));
    query.job_id = Some(job.id);

    let applications = state.repo.list_applications(&query).await?;
    Ok(Json(state.projector().applications(applications).await?))
}
