use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Principal;
use crate::errors::AppResult;
use crate::models::store::{AssignManagerRequest, Store, StoreAssignmentRequest};
use crate::models::user::{RoleUpdateRequest, User, UserCreateRequest};

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "All user accounts", body = [User]),
        (status = 403, description = "Super admin access required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<Vec<User>>> {
    let users = state.repo().list_users(&principal).await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "Admin",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Username or email already in use")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<UserCreateRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.repo().create_user(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = RoleUpdateRequest,
    responses((status = 200, description = "Role updated", body = User))
)]
pub async fn update_role(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleUpdateRequest>,
) -> AppResult<Json<User>> {
    let user = state.repo().update_role(&principal, id, payload).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/admin/district-managers",
    tag = "Admin",
    responses((status = 200, description = "Users holding the district manager role", body = [User]))
)]
pub async fn list_district_managers(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<Vec<User>>> {
    let managers = state.repo().list_district_managers(&principal).await?;
    Ok(Json(managers))
}

#[utoipa::path(
    put,
    path = "/admin/stores/{store_id}/assign",
    tag = "Admin",
    params(("store_id" = Uuid, Path, description = "Store id")),
    request_body = AssignManagerRequest,
    responses((status = 200, description = "Store reassigned", body = Store))
)]
pub async fn assign_store(
    State(state): State<AppState>,
    principal: Principal,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<AssignManagerRequest>,
) -> AppResult<Json<Store>> {
    let store = state
        .repo()
        .assign_manager(&principal, store_id, payload.district_manager_id)
        .await?;
    Ok(Json(store))
}

#[utoipa::path(
    post,
    path = "/admin/users/{id}/assignments",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "District manager id")),
    request_body = StoreAssignmentRequest,
    responses((status = 204, description = "Assignment added"))
)]
pub async fn add_assignment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<StoreAssignmentRequest>,
) -> AppResult<StatusCode> {
    state
        .repo()
        .add_assignment(&principal, id, payload.store_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}/assignments/{store_id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "District manager id"),
        ("store_id" = Uuid, Path, description = "Store id")
    ),
    responses((status = 204, description = "Assignment removed"))
)]
pub async fn remove_assignment(
    State(state): State<AppState>,
    principal: Principal,
    Path((id, store_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state
        .repo()
        .remove_assignment(&principal, id, store_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
