use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::{Company, CompanyFields};
use crate::projection::inbound::CompanyPayload;
use crate::projection::{Payload, Write};
use crate::state::AppState;

/// GET /api/jobs/companies
/// Open to any actor the `Actor` extractor authenticates.
pub async fn list_companies(
    _actor: Actor,
    State(state): State<AppState>,
) -> Result<Json<Vec<Company>>, AppError> {
    Ok(Json(state.repo.list_companies().await?))
}

/// POST /api/jobs/companies
/// Open to any actor the `Actor` extractor authenticates.
pub async fn create_company(
    _actor: Actor,
    State(state): State<AppState>,
    Payload(req): Payload<CompanyPayload>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let fields = req.validate(Write::Create)?;
    let company = state.repo.create_company(fields).await?;
    info!("Created company {} ({})", company.id, company.name);
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/jobs/companies/:id
/// Open to any actor the `Actor` extractor authenticates.
pub async fn get_company(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(state.repo.get_company(id).await?))
}

/// PUT /api/jobs/companies/:id
/// Open to any actor the `Actor` extractor authenticates.
pub async fn update_company(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<CompanyPayload>,
) -> Result<Json<Company>, AppError> {
    save(&state, id, req, false).await.map(Json)
}

/// PATCH /api/jobs/companies/:id
/// Open to any actor the `Actor` extractor authenticates.
pub async fn patch_company(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Payload(req): Payload<CompanyPayload>,
) -> Result<Json<Company>, AppError> {
    save(&state, id, req, true).await.map(Json)
}

async fn save(
    state: &AppState,
    id: Uuid,
    req: CompanyPayload,
    partial: bool,
) -> Result<Company, AppError> {
    let current = CompanyFields::from(&state.repo.get_company(id).await?);
    let fields = req.validate(if partial {
        Write::PartialUpdate(&current)
    } else {
        Write::Update(&current)
    })?;
    Ok(state.repo.update_company(id, fields).await?)
}

/// DELETE /api/jobs/companies/:id
pub async fn delete_company(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.repo.delete_company(id).await?;
    info!("Company {id} deleted by {}", actor.user_id);
    Ok(StatusCode::NO_CONTENT)
}
