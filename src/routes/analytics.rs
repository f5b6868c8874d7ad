use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Principal;
use crate::errors::{AppError, AppResult};
use crate::models::analytics::{StoreAnalytics, StorePerformance};

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Comma-separated store ids; empty means "everything visible".
    pub store_ids: Option<String>,
}

#[utoipa::path(
    get,
    path = "/analytics",
    tag = "Analytics",
    params(("store_ids" = Option<String>, Query, description = "Comma-separated store ids")),
    responses((status = 200, description = "Analytics scoped to the caller's visible stores", body = [StoreAnalytics]))
)]
pub async fn list_analytics(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<Vec<StoreAnalytics>>> {
    let requested = parse_store_ids(query.store_ids.as_deref())?;
    let records = state.repo().list_analytics(&principal, &requested).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/analytics/{store_id}",
    tag = "Analytics",
    params(("store_id" = Uuid, Path, description = "Store id")),
    responses(
        (status = 200, description = "Monthly records for one store; empty when none exist", body = [StoreAnalytics]),
        (status = 403, description = "Store not in the caller's scope")
    )
)]
pub async fn analytics_for_store(
    State(state): State<AppState>,
    principal: Principal,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<StoreAnalytics>>> {
    let records = state.repo().analytics_for_store(&principal, store_id).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/reports/store-performance",
    tag = "Analytics",
    responses((status = 200, description = "Trailing-week entry activity per visible store", body = [StorePerformance]))
)]
pub async fn store_performance(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<Vec<StorePerformance>>> {
    let report = state.repo().store_performance(&principal).await?;
    Ok(Json(report))
}

fn parse_store_ids(raw: Option<&str>) -> AppResult<Vec<Uuid>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part).map_err(|_| AppError::bad_request("invalid store id in store_ids"))
        })
        .collect()
}
