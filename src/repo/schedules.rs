use sqlx::SqlitePool;
use uuid::Uuid;

use super::{store_scope_filter, ScopedRepo};
use crate::authz::Principal;
use crate::errors::{AppError, AppResult};
use crate::models::schedule::{
    DbStaffSchedule, StaffSchedule, StaffScheduleCreateRequest, StaffScheduleUpdateRequest,
};

const SCHEDULE_COLUMNS: &str =
    "id, planner_entry_id, staff_name, slot_8_to_9, slot_9_to_12, slot_12_to_4, slot_4_to_8";

impl ScopedRepo {
    /// Add a staff row to a planner entry's schedule grid. Scoped through the
    /// owning entry: an entry in an invisible store reads as absent.
    pub async fn create_schedule(
        &self,
        principal: &Principal,
        payload: StaffScheduleCreateRequest,
    ) -> AppResult<StaffSchedule> {
        self.require_entry_write(principal).await?;
        let entry = self
            .fetch_visible_entry(principal, payload.planner_entry_id)
            .await?;

        let schedule = StaffSchedule {
            id: Uuid::new_v4(),
            planner_entry_id: payload.planner_entry_id,
            staff_name: payload.staff_name,
            slot_8_to_9: payload.slot_8_to_9,
            slot_9_to_12: payload.slot_9_to_12,
            slot_12_to_4: payload.slot_12_to_4,
            slot_4_to_8: payload.slot_4_to_8,
        };

        sqlx::query(
            "INSERT INTO staff_schedules (id, planner_entry_id, staff_name, slot_8_to_9, slot_9_to_12, slot_12_to_4, slot_4_to_8) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(schedule.id.to_string())
        .bind(&entry.id)
        .bind(&schedule.staff_name)
        .bind(schedule.slot_8_to_9.as_str())
        .bind(schedule.slot_9_to_12.as_str())
        .bind(schedule.slot_12_to_4.as_str())
        .bind(schedule.slot_4_to_8.as_str())
        .execute(&self.pool)
        .await?;

        Ok(schedule)
    }

    pub async fn update_schedule(
        &self,
        principal: &Principal,
        schedule_id: Uuid,
        payload: StaffScheduleUpdateRequest,
    ) -> AppResult<StaffSchedule> {
        self.require_entry_write(principal).await?;

        let mut schedule: StaffSchedule =
            self.fetch_visible_schedule(principal, schedule_id).await?.try_into()?;

        if let Some(staff_name) = payload.staff_name {
            schedule.staff_name = staff_name;
        }
        if let Some(slot) = payload.slot_8_to_9 {
            schedule.slot_8_to_9 = slot;
        }
        if let Some(slot) = payload.slot_9_to_12 {
            schedule.slot_9_to_12 = slot;
        }
        if let Some(slot) = payload.slot_12_to_4 {
            schedule.slot_12_to_4 = slot;
        }
        if let Some(slot) = payload.slot_4_to_8 {
            schedule.slot_4_to_8 = slot;
        }

        sqlx::query(
            "UPDATE staff_schedules SET staff_name = ?, slot_8_to_9 = ?, slot_9_to_12 = ?, slot_12_to_4 = ?, slot_4_to_8 = ? WHERE id = ?",
        )
        .bind(&schedule.staff_name)
        .bind(schedule.slot_8_to_9.as_str())
        .bind(schedule.slot_9_to_12.as_str())
        .bind(schedule.slot_12_to_4.as_str())
        .bind(schedule.slot_4_to_8.as_str())
        .bind(schedule.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(schedule)
    }

    pub async fn delete_schedule(&self, principal: &Principal, schedule_id: Uuid) -> AppResult<()> {
        self.require_entry_write(principal).await?;
        self.fetch_visible_schedule(principal, schedule_id).await?;

        sqlx::query("DELETE FROM staff_schedules WHERE id = ?")
            .bind(schedule_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Resolve a schedule row through its owning entry's store, scoped to the
    /// principal's visibility in the query itself.
    async fn fetch_visible_schedule(
        &self,
        principal: &Principal,
        schedule_id: Uuid,
    ) -> AppResult<DbStaffSchedule> {
        let visibility = principal.store_visibility();
        if visibility.is_empty() {
            return Err(AppError::not_found("staff schedule not found"));
        }

        let mut sql = String::from(
            "SELECT ss.id, ss.planner_entry_id, ss.staff_name, ss.slot_8_to_9, ss.slot_9_to_12, \
             ss.slot_12_to_4, ss.slot_4_to_8 FROM staff_schedules ss \
             JOIN planner_entries p ON p.id = ss.planner_entry_id WHERE ss.id = ?",
        );
        let mut binds = vec![schedule_id.to_string()];
        if let Some((clause, ids)) = store_scope_filter("p.store_id", &visibility) {
            sql.push_str(" AND ");
            sql.push_str(&clause);
            binds.extend(ids);
        }

        let mut query = sqlx::query_as::<_, DbStaffSchedule>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }

        query
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("staff schedule not found"))
    }
}

/// Rows for one entry, in insertion order. Callers have already cleared the
/// entry itself through the policy.
pub(super) async fn schedules_for_entry(
    pool: &SqlitePool,
    entry_id: Uuid,
) -> AppResult<Vec<StaffSchedule>> {
    let rows = sqlx::query_as::<_, DbStaffSchedule>(&format!(
        "SELECT {} FROM staff_schedules WHERE planner_entry_id = ? ORDER BY rowid",
        SCHEDULE_COLUMNS
    ))
    .bind(entry_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(StaffSchedule::try_from).collect()
}
