//! Lead API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::{ApiResult, AppJson};
use crate::errors::AppError;
use crate::models::{CreateLeadRequest, Lead, UpdateLeadRequest};
use crate::AppState;

/// Body returned after a delete.
#[derive(Debug, Serialize)]
pub struct DeleteLeadResponse {
    pub ok: bool,
    pub removed: Lead,
}

/// GET /api/leads - List all leads, newest first.
pub async fn list_leads(State(state): State<AppState>) -> ApiResult<Json<Vec<Lead>>> {
    Ok(Json(state.store.list_leads().await?))
}

/// GET /api/leads/:id - Get a single lead.
pub async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Lead>> {
    state
        .store
        .get_lead(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::lead_not_found(&id))
}

/// POST /api/leads - Create a new lead.
pub async fn create_lead(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateLeadRequest>,
) -> ApiResult<(StatusCode, Json<Lead>)> {
    let lead = state.store.create_lead(request).await?;
    tracing::info!(lead_id = %lead.id, company = %lead.company_name, "Lead created");
    Ok((StatusCode::CREATED, Json(lead)))
}

/// PUT /api/leads/:id - Update a lead.
pub async fn update_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateLeadRequest>,
) -> ApiResult<Json<Lead>> {
    let lead = state.store.update_lead(&id, &request).await?;
    tracing::info!(lead_id = %lead.id, "Lead updated");
    Ok(Json(lead))
}

/// DELETE /api/leads/:id - Delete a lead.
pub async fn delete_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteLeadResponse>> {
    let removed = state.store.delete_lead(&id).await?;
    tracing::info!(lead_id = %removed.id, "Lead deleted");
    Ok(Json(DeleteLeadResponse { ok: true, removed }))
}
