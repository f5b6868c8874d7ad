use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Principal;
use crate::errors::AppResult;
use crate::models::schedule::{
    StaffSchedule, StaffScheduleCreateRequest, StaffScheduleUpdateRequest,
};

#[utoipa::path(
    post,
    path = "/staff-schedules",
    tag = "Staff schedules",
    request_body = StaffScheduleCreateRequest,
    responses(
        (status = 201, description = "Schedule row created", body = StaffSchedule),
        (status = 404, description = "Owning entry absent or not visible")
    )
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<StaffScheduleCreateRequest>,
) -> AppResult<(StatusCode, Json<StaffSchedule>)> {
    let schedule = state.repo().create_schedule(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

#[utoipa::path(
    put,
    path = "/staff-schedules/{id}",
    tag = "Staff schedules",
    params(("id" = Uuid, Path, description = "Schedule row id")),
    request_body = StaffScheduleUpdateRequest,
    responses((status = 200, description = "Schedule row updated", body = StaffSchedule))
)]
pub async fn update_schedule(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<StaffScheduleUpdateRequest>,
) -> AppResult<Json<StaffSchedule>> {
    let schedule = state.repo().update_schedule(&principal, id, payload).await?;
    Ok(Json(schedule))
}

#[utoipa::path(
    delete,
    path = "/staff-schedules/{id}",
    tag = "Staff schedules",
    params(("id" = Uuid, Path, description = "Schedule row id")),
    responses((status = 204, description = "Schedule row deleted"))
)]
pub async fn delete_schedule(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.repo().delete_schedule(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
