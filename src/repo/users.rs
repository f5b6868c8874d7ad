use sqlx::SqlitePool;
use uuid::Uuid;

use super::ScopedRepo;
use crate::authz::{Action, PolicyEvaluator, Principal, ResourceRef, Role};
use crate::errors::{AppError, AppResult};
use crate::models::user::{DbUser, RoleUpdateRequest, User, UserCreateRequest};
use crate::utils::{hash_password, utc_now};

const USER_COLUMNS: &str =
    "id, username, password_hash, email, first_name, last_name, role, store_id, created_at, updated_at";

impl ScopedRepo {
    pub async fn list_users(&self, principal: &Principal) -> AppResult<Vec<User>> {
        self.policy
            .decide(principal, Action::ManageUsers, &ResourceRef::none())
            .await
            .require()?;

        let rows = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    pub async fn list_district_managers(&self, principal: &Principal) -> AppResult<Vec<User>> {
        self.policy
            .decide(principal, Action::ManageUsers, &ResourceRef::none())
            .await
            .require()?;

        let rows = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {} FROM users WHERE role = ? ORDER BY username",
            USER_COLUMNS
        ))
        .bind(Role::DistrictManager.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    pub async fn create_user(
        &self,
        principal: &Principal,
        payload: UserCreateRequest,
    ) -> AppResult<User> {
        self.policy
            .decide(principal, Action::ManageUsers, &ResourceRef::none())
            .await
            .require()?;

        ensure_username_available(&self.pool, &payload.username).await?;
        ensure_email_available(&self.pool, &payload.email).await?;
        if let Some(store_id) = payload.store_id {
            ensure_store_exists(&self.pool, store_id).await?;
        }

        let password_hash = hash_password(&payload.password)?;
        let user_id = Uuid::new_v4();
        let now = utc_now();

        sqlx::query(
            "INSERT INTO users (id, username, password_hash, email, first_name, last_name, role, store_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(&payload.username)
        .bind(password_hash)
        .bind(&payload.email)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.role.as_str())
        .bind(payload.store_id.map(|id| id.to_string()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let user = fetch_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::internal("user missing after insert"))?;

        user.try_into()
    }

    /// Move a user to a different role (and home store). Demoting a district
    /// manager also clears their assignment set, so the old scope cannot
    /// linger behind the new role.
    pub async fn update_role(
        &self,
        principal: &Principal,
        user_id: Uuid,
        payload: RoleUpdateRequest,
    ) -> AppResult<User> {
        self.policy
            .decide(principal, Action::ManageUsers, &ResourceRef::none())
            .await
            .require()?;

        fetch_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if let Some(store_id) = payload.store_id {
            ensure_store_exists(&self.pool, store_id).await?;
        }

        let now = utc_now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET role = ?, store_id = ?, updated_at = ? WHERE id = ?")
            .bind(payload.role.as_str())
            .bind(payload.store_id.map(|id| id.to_string()))
            .bind(now)
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        if payload.role != Role::DistrictManager {
            sqlx::query("DELETE FROM user_store_assignments WHERE user_id = ?")
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let user = fetch_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::internal("user missing after update"))?;

        user.try_into()
    }
}

async fn fetch_user(pool: &SqlitePool, user_id: Uuid) -> AppResult<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

async fn ensure_username_available(pool: &SqlitePool, username: &str) -> AppResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Err(AppError::conflict("username already in use"));
    }

    Ok(())
}

async fn ensure_email_available(pool: &SqlitePool, email: &str) -> AppResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Err(AppError::conflict("email already in use"));
    }

    Ok(())
}

async fn ensure_store_exists(pool: &SqlitePool, store_id: Uuid) -> AppResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM stores WHERE id = ?")
        .bind(store_id.to_string())
        .fetch_one(pool)
        .await?;

    if count == 0 {
        return Err(AppError::bad_request("store does not exist"));
    }

    Ok(())
}
