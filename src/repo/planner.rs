use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::schedules::schedules_for_entry;
use super::{store_scope_filter, ScopedRepo};
use crate::authz::{Action, PolicyEvaluator, Principal, ResourceRef};
use crate::errors::{AppError, AppResult};
use crate::models::planner::{
    DbPlannerEntry, PhotoCreateRequest, PhotoMeta, PlannerEntry, PlannerEntryUpdateRequest,
    PlannerEntryWithSchedules,
};
use crate::utils::utc_now;

const ENTRY_COLUMNS: &str = "id, store_id, date, daily_sales, wtd_actual, mtd_actual, ytd_actual, \
     aif_service_goal, adt_avg_transaction, nps_score, contests, upcoming_sales, end_of_day_notes, \
     priorities, todos, daily_operations, inventory_management, store_standards, inventory_benches, \
     upcoming_education, education_to_sold, social_posts, photos, created_at, updated_at";

impl ScopedRepo {
    /// The planner page read: returns the entry for (store, date), creating it
    /// with the default checklists on first read. The policy is consulted
    /// against the explicit store id before any query runs, so a denied caller
    /// learns nothing about what exists.
    pub async fn get_or_create_entry(
        &self,
        principal: &Principal,
        store_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<PlannerEntryWithSchedules> {
        self.policy
            .decide(principal, Action::ReadPlannerEntry, &ResourceRef::store(store_id))
            .await
            .require()?;

        let store_exists: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM stores WHERE id = ?")
            .bind(store_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        if store_exists == 0 {
            return Err(AppError::not_found("store not found"));
        }

        if let Some(row) = fetch_entry_by_day(&self.pool, store_id, date).await? {
            return self.with_schedules(row.try_into()?).await;
        }

        // Lazy creation mutates state, so it takes the same gate as an
        // explicit write.
        self.policy
            .decide(principal, Action::WritePlannerEntry, &ResourceRef::store(store_id))
            .await
            .require()?;

        let entry = PlannerEntry::new_default(Uuid::new_v4(), store_id, date, utc_now());
        insert_entry(&self.pool, &entry).await?;

        // Re-fetch instead of trusting the insert: a concurrent first read may
        // have won the (store_id, date) unique constraint.
        let row = fetch_entry_by_day(&self.pool, store_id, date)
            .await?
            .ok_or_else(|| AppError::internal("planner entry missing after insert"))?;

        self.with_schedules(row.try_into()?).await
    }

    /// Recent entries for one store, newest first.
    pub async fn entry_history(
        &self,
        principal: &Principal,
        store_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<PlannerEntry>> {
        self.policy
            .decide(principal, Action::ReadPlannerEntry, &ResourceRef::store(store_id))
            .await
            .require()?;

        let rows = sqlx::query_as::<_, DbPlannerEntry>(&format!(
            "SELECT {} FROM planner_entries WHERE store_id = ? ORDER BY date DESC LIMIT ?",
            ENTRY_COLUMNS
        ))
        .bind(store_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PlannerEntry::try_from).collect()
    }

    /// Partial update addressed by entry id. The row is resolved through a
    /// query already scoped to the principal's visible stores; an absent or
    /// invisible entry is a uniform `NotFound`.
    pub async fn update_entry(
        &self,
        principal: &Principal,
        entry_id: Uuid,
        payload: PlannerEntryUpdateRequest,
    ) -> AppResult<PlannerEntry> {
        self.require_entry_write(principal).await?;

        let mut entry: PlannerEntry = self.fetch_visible_entry(principal, entry_id).await?.try_into()?;
        apply_update(&mut entry, payload);
        entry.updated_at = utc_now();

        write_entry(&self.pool, &entry).await?;

        Ok(entry)
    }

    pub async fn add_photo(
        &self,
        principal: &Principal,
        entry_id: Uuid,
        payload: PhotoCreateRequest,
    ) -> AppResult<PhotoMeta> {
        self.require_entry_write(principal).await?;

        let mut entry: PlannerEntry = self.fetch_visible_entry(principal, entry_id).await?.try_into()?;

        let photo = PhotoMeta {
            id: Uuid::new_v4(),
            filename: payload.filename,
            category: payload.category.unwrap_or_else(|| "other".to_string()),
            uploaded_at: utc_now(),
            url: payload.url,
        };

        entry.photos.push(photo.clone());
        entry.updated_at = photo.uploaded_at;
        write_entry(&self.pool, &entry).await?;

        Ok(photo)
    }

    pub async fn remove_photo(
        &self,
        principal: &Principal,
        entry_id: Uuid,
        photo_id: Uuid,
    ) -> AppResult<()> {
        self.require_entry_write(principal).await?;

        let mut entry: PlannerEntry = self.fetch_visible_entry(principal, entry_id).await?.try_into()?;

        let before = entry.photos.len();
        entry.photos.retain(|photo| photo.id != photo_id);
        if entry.photos.len() == before {
            return Err(AppError::not_found("photo not found"));
        }

        entry.updated_at = utc_now();
        write_entry(&self.pool, &entry).await?;

        Ok(())
    }

    /// Roles whose `WritePlannerEntry` is denied outright are turned away
    /// before any row is touched.
    pub(super) async fn require_entry_write(&self, principal: &Principal) -> AppResult<()> {
        self.policy
            .decide(principal, Action::WritePlannerEntry, &ResourceRef::none())
            .await
            .require()
    }

    /// Resolve an entry by id through the principal's store visibility. The
    /// scope is part of the query itself, so an entry in another store is
    /// indistinguishable from one that does not exist.
    pub(super) async fn fetch_visible_entry(
        &self,
        principal: &Principal,
        entry_id: Uuid,
    ) -> AppResult<DbPlannerEntry> {
        let visibility = principal.store_visibility();
        if visibility.is_empty() {
            return Err(AppError::not_found("planner entry not found"));
        }

        let mut sql = format!("SELECT {} FROM planner_entries WHERE id = ?", ENTRY_COLUMNS);
        let mut binds = vec![entry_id.to_string()];
        if let Some((clause, ids)) = store_scope_filter("store_id", &visibility) {
            sql.push_str(" AND ");
            sql.push_str(&clause);
            binds.extend(ids);
        }

        let mut query = sqlx::query_as::<_, DbPlannerEntry>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }

        query
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("planner entry not found"))
    }

    async fn with_schedules(&self, entry: PlannerEntry) -> AppResult<PlannerEntryWithSchedules> {
        let staff_schedules = schedules_for_entry(&self.pool, entry.id).await?;
        Ok(PlannerEntryWithSchedules {
            entry,
            staff_schedules,
        })
    }
}

async fn fetch_entry_by_day(
    pool: &SqlitePool,
    store_id: Uuid,
    date: NaiveDate,
) -> AppResult<Option<DbPlannerEntry>> {
    let row = sqlx::query_as::<_, DbPlannerEntry>(&format!(
        "SELECT {} FROM planner_entries WHERE store_id = ? AND date = ?",
        ENTRY_COLUMNS
    ))
    .bind(store_id.to_string())
    .bind(date.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

async fn insert_entry(pool: &SqlitePool, entry: &PlannerEntry) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO planner_entries (id, store_id, date, daily_sales, wtd_actual, mtd_actual, \
         ytd_actual, aif_service_goal, adt_avg_transaction, nps_score, contests, upcoming_sales, \
         end_of_day_notes, priorities, todos, daily_operations, inventory_management, \
         store_standards, inventory_benches, upcoming_education, education_to_sold, social_posts, \
         photos, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (store_id, date) DO NOTHING",
    )
    .bind(entry.id.to_string())
    .bind(entry.store_id.to_string())
    .bind(entry.date.to_string())
    .bind(entry.daily_sales)
    .bind(entry.wtd_actual)
    .bind(entry.mtd_actual)
    .bind(entry.ytd_actual)
    .bind(entry.aif_service_goal)
    .bind(entry.adt_avg_transaction)
    .bind(entry.nps_score)
    .bind(&entry.contests)
    .bind(&entry.upcoming_sales)
    .bind(&entry.end_of_day_notes)
    .bind(to_json("priorities", &entry.priorities)?)
    .bind(to_json("todos", &entry.todos)?)
    .bind(to_json("daily_operations", &entry.daily_operations)?)
    .bind(to_json("inventory_management", &entry.inventory_management)?)
    .bind(to_json("store_standards", &entry.store_standards)?)
    .bind(&entry.inventory_benches)
    .bind(&entry.upcoming_education)
    .bind(&entry.education_to_sold)
    .bind(&entry.social_posts)
    .bind(to_json("photos", &entry.photos)?)
    .bind(entry.created_at)
    .bind(entry.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

async fn write_entry(pool: &SqlitePool, entry: &PlannerEntry) -> AppResult<()> {
    sqlx::query(
        "UPDATE planner_entries SET daily_sales = ?, wtd_actual = ?, mtd_actual = ?, \
         ytd_actual = ?, aif_service_goal = ?, adt_avg_transaction = ?, nps_score = ?, \
         contests = ?, upcoming_sales = ?, end_of_day_notes = ?, priorities = ?, todos = ?, \
         daily_operations = ?, inventory_management = ?, store_standards = ?, \
         inventory_benches = ?, upcoming_education = ?, education_to_sold = ?, social_posts = ?, \
         photos = ?, updated_at = ? WHERE id = ?",
    )
    .bind(entry.daily_sales)
    .bind(entry.wtd_actual)
    .bind(entry.mtd_actual)
    .bind(entry.ytd_actual)
    .bind(entry.aif_service_goal)
    .bind(entry.adt_avg_transaction)
    .bind(entry.nps_score)
    .bind(&entry.contests)
    .bind(&entry.upcoming_sales)
    .bind(&entry.end_of_day_notes)
    .bind(to_json("priorities", &entry.priorities)?)
    .bind(to_json("todos", &entry.todos)?)
    .bind(to_json("daily_operations", &entry.daily_operations)?)
    .bind(to_json("inventory_management", &entry.inventory_management)?)
    .bind(to_json("store_standards", &entry.store_standards)?)
    .bind(&entry.inventory_benches)
    .bind(&entry.upcoming_education)
    .bind(&entry.education_to_sold)
    .bind(&entry.social_posts)
    .bind(to_json("photos", &entry.photos)?)
    .bind(entry.updated_at)
    .bind(entry.id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

fn to_json<T: serde::Serialize>(column: &str, value: &T) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|err| AppError::internal(format!("failed to encode {}: {}", column, err)))
}

fn apply_update(entry: &mut PlannerEntry, payload: PlannerEntryUpdateRequest) {
    if payload.daily_sales.is_some() {
        entry.daily_sales = payload.daily_sales;
    }
    if payload.wtd_actual.is_some() {
        entry.wtd_actual = payload.wtd_actual;
    }
    if payload.mtd_actual.is_some() {
        entry.mtd_actual = payload.mtd_actual;
    }
    if payload.ytd_actual.is_some() {
        entry.ytd_actual = payload.ytd_actual;
    }
    if payload.aif_service_goal.is_some() {
        entry.aif_service_goal = payload.aif_service_goal;
    }
    if payload.adt_avg_transaction.is_some() {
        entry.adt_avg_transaction = payload.adt_avg_transaction;
    }
    if payload.nps_score.is_some() {
        entry.nps_score = payload.nps_score;
    }
    if payload.contests.is_some() {
        entry.contests = payload.contests;
    }
    if payload.upcoming_sales.is_some() {
        entry.upcoming_sales = payload.upcoming_sales;
    }
    if payload.end_of_day_notes.is_some() {
        entry.end_of_day_notes = payload.end_of_day_notes;
    }
    if let Some(priorities) = payload.priorities {
        entry.priorities = priorities;
    }
    if let Some(todos) = payload.todos {
        entry.todos = todos;
    }
    if let Some(daily_operations) = payload.daily_operations {
        entry.daily_operations = daily_operations;
    }
    if let Some(inventory_management) = payload.inventory_management {
        entry.inventory_management = inventory_management;
    }
    if let Some(store_standards) = payload.store_standards {
        entry.store_standards = store_standards;
    }
    if payload.inventory_benches.is_some() {
        entry.inventory_benches = payload.inventory_benches;
    }
    if payload.upcoming_education.is_some() {
        entry.upcoming_education = payload.upcoming_education;
    }
    if payload.education_to_sold.is_some() {
        entry.education_to_sold = payload.education_to_sold;
    }
    if payload.social_posts.is_some() {
        entry.social_posts = payload.social_posts;
    }
}
