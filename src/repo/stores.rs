use sqlx::SqlitePool;
use uuid::Uuid;

use super::{store_scope_filter, ScopedRepo};
use crate::authz::{Action, Decision, DenyReason, PolicyEvaluator, Principal, ResourceRef, Role};
use crate::errors::{AppError, AppResult};
use crate::models::store::{DbStore, Store, StoreCreateRequest};
use crate::utils::utc_now;

const STORE_COLUMNS: &str =
    "id, store_number, name, location, is_active, district_manager_id, created_at, updated_at";

impl ScopedRepo {
    /// List the stores the principal may see, resolved to one scoped query.
    pub async fn list_stores(&self, principal: &Principal) -> AppResult<Vec<Store>> {
        self.policy
            .decide(principal, Action::ListStores, &ResourceRef::none())
            .await
            .require()?;

        let visibility = principal.store_visibility();
        if visibility.is_empty() {
            // Empty assignment set means empty results, not an error.
            return Ok(Vec::new());
        }

        let mut sql = format!("SELECT {} FROM stores", STORE_COLUMNS);
        let mut binds: Vec<String> = Vec::new();
        if let Some((clause, ids)) = store_scope_filter("id", &visibility) {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
            binds = ids;
        }
        sql.push_str(" ORDER BY store_number");

        let mut query = sqlx::query_as::<_, DbStore>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter().map(Store::try_from).collect()
    }

    pub async fn get_store(&self, principal: &Principal, store_id: Uuid) -> AppResult<Store> {
        match self
            .policy
            .decide(principal, Action::ReadStore, &ResourceRef::store(store_id))
            .await
        {
            Decision::Allow => {}
            Decision::Deny(DenyReason::NoHomeStore) => {
                return Err(AppError::forbidden(DenyReason::NoHomeStore.as_str()))
            }
            // An out-of-scope store reads as absent so existence does not leak.
            Decision::Deny(_) => return Err(AppError::not_found("store not found")),
        }

        let store = fetch_store(&self.pool, store_id)
            .await?
            .ok_or_else(|| AppError::not_found("store not found"))?;

        store.try_into()
    }

    pub async fn create_store(
        &self,
        principal: &Principal,
        payload: StoreCreateRequest,
    ) -> AppResult<Store> {
        self.policy
            .decide(principal, Action::CreateStore, &ResourceRef::none())
            .await
            .require()?;

        let taken: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM stores WHERE store_number = ?")
            .bind(&payload.store_number)
            .fetch_one(&self.pool)
            .await?;
        if taken > 0 {
            return Err(AppError::conflict("store number already in use"));
        }

        let store_id = Uuid::new_v4();
        let now = utc_now();

        sqlx::query(
            "INSERT INTO stores (id, store_number, name, location, is_active, district_manager_id, created_at, updated_at) VALUES (?, ?, ?, ?, 1, NULL, ?, ?)",
        )
        .bind(store_id.to_string())
        .bind(&payload.store_number)
        .bind(&payload.name)
        .bind(&payload.location)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let store = fetch_store(&self.pool, store_id)
            .await?
            .ok_or_else(|| AppError::internal("store missing after insert"))?;

        store.try_into()
    }

    /// Point a store at a district manager (or clear it) and rewrite the
    /// assignment join in the same transaction, so the manager's next
    /// `list_stores` reflects the change immediately.
    pub async fn assign_manager(
        &self,
        principal: &Principal,
        store_id: Uuid,
        manager_id: Option<Uuid>,
    ) -> AppResult<Store> {
        self.policy
            .decide(principal, Action::AssignStoreToManager, &ResourceRef::store(store_id))
            .await
            .require()?;

        fetch_store(&self.pool, store_id)
            .await?
            .ok_or_else(|| AppError::not_found("store not found"))?;

        if let Some(manager_id) = manager_id {
            ensure_district_manager(&self.pool, manager_id).await?;
        }

        let now = utc_now();
        let mut tx = self.pool.begin().await?;

        // The previous manager, if any, loses this store.
        sqlx::query("DELETE FROM user_store_assignments WHERE store_id = ?")
            .bind(store_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE stores SET district_manager_id = ?, updated_at = ? WHERE id = ?")
            .bind(manager_id.map(|id| id.to_string()))
            .bind(now)
            .bind(store_id.to_string())
            .execute(&mut *tx)
            .await?;

        if let Some(manager_id) = manager_id {
            sqlx::query(
                "INSERT INTO user_store_assignments (user_id, store_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(manager_id.to_string())
            .bind(store_id.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let store = fetch_store(&self.pool, store_id)
            .await?
            .ok_or_else(|| AppError::internal("store missing after update"))?;

        store.try_into()
    }

    /// Grant a district manager visibility of one more store.
    pub async fn add_assignment(
        &self,
        principal: &Principal,
        user_id: Uuid,
        store_id: Uuid,
    ) -> AppResult<()> {
        self.policy
            .decide(principal, Action::AssignStoreToManager, &ResourceRef::store(store_id))
            .await
            .require()?;

        ensure_district_manager(&self.pool, user_id).await?;
        fetch_store(&self.pool, store_id)
            .await?
            .ok_or_else(|| AppError::not_found("store not found"))?;

        sqlx::query(
            "INSERT OR IGNORE INTO user_store_assignments (user_id, store_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(store_id.to_string())
        .bind(utc_now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_assignment(
        &self,
        principal: &Principal,
        user_id: Uuid,
        store_id: Uuid,
    ) -> AppResult<()> {
        self.policy
            .decide(principal, Action::AssignStoreToManager, &ResourceRef::store(store_id))
            .await
            .require()?;

        let result =
            sqlx::query("DELETE FROM user_store_assignments WHERE user_id = ? AND store_id = ?")
                .bind(user_id.to_string())
                .bind(store_id.to_string())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("assignment not found"));
        }

        Ok(())
    }
}

pub(super) async fn fetch_store(pool: &SqlitePool, store_id: Uuid) -> AppResult<Option<DbStore>> {
    let store = sqlx::query_as::<_, DbStore>(&format!(
        "SELECT {} FROM stores WHERE id = ?",
        STORE_COLUMNS
    ))
    .bind(store_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(store)
}

async fn ensure_district_manager(pool: &SqlitePool, user_id: Uuid) -> AppResult<()> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    match role {
        None => Err(AppError::not_found("user not found")),
        Some(role) if Role::parse(&role) == Some(Role::DistrictManager) => Ok(()),
        Some(_) => Err(AppError::bad_request("user is not a district manager")),
    }
}
