use chrono::Duration;
use sqlx::FromRow;
use uuid::Uuid;

use super::{store_scope_filter, ScopedRepo};
use crate::authz::{Action, PolicyEvaluator, Principal, ResourceRef};
use crate::errors::AppResult;
use crate::models::analytics::{DbStoreAnalytics, StoreAnalytics, StorePerformance};
use crate::utils::{parse_uuid, utc_now};

const ANALYTICS_COLUMNS: &str =
    "id, store_id, month, sales_trend, staff_performance, goal_progress, created_at";

impl ScopedRepo {
    /// Multi-store analytics read. A district manager's request is intersected
    /// with their assignment set: unassigned ids are dropped silently, never
    /// unioned in. An empty request means "everything visible".
    pub async fn list_analytics(
        &self,
        principal: &Principal,
        requested: &[Uuid],
    ) -> AppResult<Vec<StoreAnalytics>> {
        self.policy
            .decide(principal, Action::ReadAnalytics, &ResourceRef::none())
            .await
            .require()?;

        let scoped = principal.store_visibility().intersect(requested);

        let mut sql = format!("SELECT {} FROM store_analytics", ANALYTICS_COLUMNS);
        let mut binds: Vec<String> = Vec::new();
        match scoped {
            None => {}
            Some(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
                sql.push_str(&format!(" WHERE store_id IN ({})", placeholders));
                binds = ids.iter().map(Uuid::to_string).collect();
            }
        }
        sql.push_str(" ORDER BY store_id, month");

        let mut query = sqlx::query_as::<_, DbStoreAnalytics>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter().map(StoreAnalytics::try_from).collect()
    }

    /// Single-store analytics. The policy is checked against the explicit
    /// store id before any query, so a denied caller gets `Forbidden` whether
    /// or not the store has records. A store with no records is an empty
    /// aggregate, not an error.
    pub async fn analytics_for_store(
        &self,
        principal: &Principal,
        store_id: Uuid,
    ) -> AppResult<Vec<StoreAnalytics>> {
        self.policy
            .decide(principal, Action::ReadAnalytics, &ResourceRef::store(store_id))
            .await
            .require()?;

        let rows = sqlx::query_as::<_, DbStoreAnalytics>(&format!(
            "SELECT {} FROM store_analytics WHERE store_id = ? ORDER BY month",
            ANALYTICS_COLUMNS
        ))
        .bind(store_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoreAnalytics::try_from).collect()
    }

    /// Per-store entry counts over the trailing 7 days, one scoped aggregate
    /// query over the principal's visible stores.
    pub async fn store_performance(&self, principal: &Principal) -> AppResult<Vec<StorePerformance>> {
        self.policy
            .decide(principal, Action::ReadAnalytics, &ResourceRef::none())
            .await
            .require()?;

        let visibility = principal.store_visibility();
        if visibility.is_empty() {
            return Ok(Vec::new());
        }

        let cutoff = (utc_now().date_naive() - Duration::days(7)).to_string();

        let mut sql = String::from(
            "SELECT s.id AS store_id, s.store_number, s.name, s.location, \
             COUNT(p.id) AS entries_count, MAX(p.date) AS last_entry_date \
             FROM stores s \
             LEFT JOIN planner_entries p ON p.store_id = s.id AND p.date > ?",
        );
        let mut binds = vec![cutoff];
        if let Some((clause, ids)) = store_scope_filter("s.id", &visibility) {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
            binds.extend(ids);
        }
        sql.push_str(" GROUP BY s.id ORDER BY s.store_number");

        let mut query = sqlx::query_as::<_, DbStorePerformance>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|row| {
                Ok(StorePerformance {
                    store_id: parse_uuid(&row.store_id)?,
                    store_number: row.store_number,
                    name: row.name,
                    location: row.location,
                    entries_count: row.entries_count,
                    has_recent_activity: row.entries_count > 0,
                    last_entry_date: row.last_entry_date,
                })
            })
            .collect()
    }
}

#[derive(Debug, FromRow)]
struct DbStorePerformance {
    store_id: String,
    store_number: String,
    name: String,
    location: String,
    entries_count: i64,
    last_entry_date: Option<String>,
}
