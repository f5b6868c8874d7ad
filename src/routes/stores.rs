use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Principal;
use crate::errors::AppResult;
use crate::models::store::{Store, StoreCreateRequest};

#[utoipa::path(
    get,
    path = "/stores",
    tag = "Stores",
    responses((status = 200, description = "Stores visible to the caller", body = [Store]))
)]
pub async fn list_stores(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<Vec<Store>>> {
    let stores = state.repo().list_stores(&principal).await?;
    Ok(Json(stores))
}

#[utoipa::path(
    get,
    path = "/stores/{id}",
    tag = "Stores",
    params(("id" = Uuid, Path, description = "Store id")),
    responses(
        (status = 200, description = "Store detail", body = Store),
        (status = 404, description = "Store absent or not visible")
    )
)]
pub async fn get_store(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Store>> {
    let store = state.repo().get_store(&principal, id).await?;
    Ok(Json(store))
}

#[utoipa::path(
    post,
    path = "/stores",
    tag = "Stores",
    request_body = StoreCreateRequest,
    responses(
        (status = 201, description = "Store created", body = Store),
        (status = 403, description = "Super admin access required"),
        (status = 409, description = "Store number already in use")
    )
)]
pub async fn create_store(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<StoreCreateRequest>,
) -> AppResult<(StatusCode, Json<Store>)> {
    let store = state.repo().create_store(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(store)))
}
