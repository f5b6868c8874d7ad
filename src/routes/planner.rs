use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Principal;
use crate::errors::{AppError, AppResult};
use crate::models::planner::{
    PhotoCreateRequest, PhotoMeta, PlannerEntry, PlannerEntryUpdateRequest,
    PlannerEntryWithSchedules,
};

const DEFAULT_HISTORY_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/planner/{store_id}/{date}",
    tag = "Planner",
    params(
        ("store_id" = Uuid, Path, description = "Store id"),
        ("date" = String, Path, description = "Calendar day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Planner entry for the day, created on first read", body = PlannerEntryWithSchedules),
        (status = 403, description = "Store not accessible")
    )
)]
pub async fn get_or_create(
    State(state): State<AppState>,
    principal: Principal,
    Path((store_id, date)): Path<(Uuid, String)>,
) -> AppResult<Json<PlannerEntryWithSchedules>> {
    let date = parse_date(&date)?;
    let entry = state
        .repo()
        .get_or_create_entry(&principal, store_id, date)
        .await?;
    Ok(Json(entry))
}

#[utoipa::path(
    get,
    path = "/planner/{store_id}/history",
    tag = "Planner",
    params(
        ("store_id" = Uuid, Path, description = "Store id"),
        ("limit" = Option<i64>, Query, description = "Max entries, default 7")
    ),
    responses((status = 200, description = "Recent entries, newest first", body = [PlannerEntry]))
)]
pub async fn history(
    State(state): State<AppState>,
    principal: Principal,
    Path(store_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<PlannerEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_DAYS).clamp(1, 90);
    let entries = state
        .repo()
        .entry_history(&principal, store_id, limit)
        .await?;
    Ok(Json(entries))
}

#[utoipa::path(
    put,
    path = "/planner/{id}",
    tag = "Planner",
    params(("id" = Uuid, Path, description = "Planner entry id")),
    request_body = PlannerEntryUpdateRequest,
    responses(
        (status = 200, description = "Entry updated", body = PlannerEntry),
        (status = 404, description = "Entry absent or not visible")
    )
)]
pub async fn update_entry(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlannerEntryUpdateRequest>,
) -> AppResult<Json<PlannerEntry>> {
    let entry = state.repo().update_entry(&principal, id, payload).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    post,
    path = "/planner/{id}/photos",
    tag = "Planner",
    params(("id" = Uuid, Path, description = "Planner entry id")),
    request_body = PhotoCreateRequest,
    responses((status = 201, description = "Photo metadata recorded", body = PhotoMeta))
)]
pub async fn add_photo(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<PhotoCreateRequest>,
) -> AppResult<(StatusCode, Json<PhotoMeta>)> {
    let photo = state.repo().add_photo(&principal, id, payload).await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

#[utoipa::path(
    delete,
    path = "/planner/{id}/photos/{photo_id}",
    tag = "Planner",
    params(
        ("id" = Uuid, Path, description = "Planner entry id"),
        ("photo_id" = Uuid, Path, description = "Photo id")
    ),
    responses((status = 204, description = "Photo metadata removed"))
)]
pub async fn delete_photo(
    State(state): State<AppState>,
    principal: Principal,
    Path((id, photo_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state.repo().remove_photo(&principal, id, photo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))
}
