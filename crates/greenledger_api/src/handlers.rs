//! Entry endpoint handlers.
//!
//! Each handler decodes the request, delegates to `EntryService` and shapes
//! the response. Decoding failures become `ApiError::BadRequest` so every
//! error shares one JSON envelope.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use greenledger_core::{core_version, CarbonEntry, CarbonSummary, EntryDraft, EntryId};
use log::info;
use serde::Serialize;

/// Liveness payload for `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/carbon-entries`
pub async fn list_entries(State(state): State<AppState>) -> ApiResult<Json<Vec<CarbonEntry>>> {
    let entries = state
        .with_entry_service(|service| service.list_entries())
        .await?;
    Ok(Json(entries))
}

/// `GET /api/carbon-entries/{id}`
pub async fn get_entry(
    State(state): State<AppState>,
    id: Result<Path<EntryId>, PathRejection>,
) -> ApiResult<Json<CarbonEntry>> {
    let id = entry_id(id)?;
    state
        .with_entry_service(move |service| service.get_entry(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// `POST /api/carbon-entries`
pub async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<EntryDraft>, JsonRejection>,
) -> ApiResult<Json<CarbonEntry>> {
    let draft = entry_draft(payload)?;
    let created = state
        .with_entry_service(move |service| service.create_entry(draft))
        .await?;
    info!(
        "event=entry_create module=api status=ok entry_id={}",
        created.id.unwrap_or_default()
    );
    Ok(Json(created))
}

/// `PUT /api/carbon-entries/{id}`
pub async fn update_entry(
    State(state): State<AppState>,
    id: Result<Path<EntryId>, PathRejection>,
    payload: Result<Json<EntryDraft>, JsonRejection>,
) -> ApiResult<Json<CarbonEntry>> {
    let id = entry_id(id)?;
    let draft = entry_draft(payload)?;
    let updated = state
        .with_entry_service(move |service| service.update_entry(id, draft))
        .await?;
    info!("event=entry_update module=api status=ok entry_id={id}");
    Ok(Json(updated))
}

/// `DELETE /api/carbon-entries/{id}`; success carries no body.
pub async fn delete_entry(
    State(state): State<AppState>,
    id: Result<Path<EntryId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = entry_id(id)?;
    state
        .with_entry_service(move |service| service.delete_entry(id))
        .await?;
    info!("event=entry_delete module=api status=ok entry_id={id}");
    Ok(StatusCode::OK)
}

/// `GET /api/carbon-entries/summary`
pub async fn entry_summary(State(state): State<AppState>) -> ApiResult<Json<CarbonSummary>> {
    let summary = state
        .with_entry_service(|service| service.summary())
        .await?;
    Ok(Json(summary))
}

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: core_version(),
    })
}

fn entry_id(extracted: Result<Path<EntryId>, PathRejection>) -> ApiResult<EntryId> {
    extracted
        .map(|Path(id)| id)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn entry_draft(extracted: Result<Json<EntryDraft>, JsonRejection>) -> ApiResult<EntryDraft> {
    extracted
        .map(|Json(draft)| draft)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
