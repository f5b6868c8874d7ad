use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::schedule::StaffSchedule;
use crate::utils::parse_uuid;

/// One store-day of the planner. Exactly one row exists per (store, date);
/// the first read for a missing day lazily creates it with the default
/// checklists below.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlannerEntry {
    pub id: Uuid,
    pub store_id: Uuid,
    pub date: NaiveDate,

    // Sales tracking
    pub daily_sales: Option<f64>,
    pub wtd_actual: Option<f64>,
    pub mtd_actual: Option<f64>,
    pub ytd_actual: Option<f64>,
    pub aif_service_goal: Option<i64>,
    pub adt_avg_transaction: Option<f64>,
    pub nps_score: Option<i64>,

    // Today's plan
    pub contests: Option<String>,
    pub upcoming_sales: Option<String>,
    pub end_of_day_notes: Option<String>,

    pub priorities: Vec<String>,
    pub todos: Vec<TodoItem>,

    pub daily_operations: DailyOperations,
    pub inventory_management: InventoryManagement,
    pub store_standards: StoreStandards,

    pub inventory_benches: Option<String>,
    pub upcoming_education: Option<String>,
    pub education_to_sold: Option<String>,
    pub social_posts: Option<String>,

    pub photos: Vec<PhotoMeta>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodoItem {
    pub task: String,
    pub completed: bool,
}

/// Opening/closing routine checklist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DailyOperations {
    pub review_huddle_calendar: bool,
    pub review_labor_dashboards: bool,
    pub pull_process_omni_orders: bool,
    pub setup_event_education_demo: bool,
    pub reconcile_daily_paperwork: bool,
    pub check_end_of_day_notes: bool,
    pub check_education_dashboard: bool,
    pub strategize_print_call_lists: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct InventoryManagement {
    pub review_store_receiving_report: bool,
    pub review_cycle_counts_report: bool,
    pub review_negative_on_hands_report: bool,
    pub review_damage_log: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct StoreStandards {
    pub maintain_visual_merchandising: bool,
    pub replenish_front_face: bool,
    pub clean_counters_demo: bool,
    pub clean_windows_doors: bool,
    pub clean_floors: bool,
    pub clean_replenish_bathrooms: bool,
    pub empty_trash_bins: bool,
}

/// Attachment metadata only. Binary content lives with the photo-storage
/// collaborator; this core never sees it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoMeta {
    pub id: Uuid,
    pub filename: String,
    pub category: String,
    pub uploaded_at: DateTime<Utc>,
    pub url: Option<String>,
}

impl PlannerEntry {
    /// The entry seeded on first read of a (store, date) with no row yet.
    pub fn new_default(id: Uuid, store_id: Uuid, date: NaiveDate, now: DateTime<Utc>) -> Self {
        PlannerEntry {
            id,
            store_id,
            date,
            daily_sales: None,
            wtd_actual: None,
            mtd_actual: None,
            ytd_actual: None,
            aif_service_goal: None,
            adt_avg_transaction: None,
            nps_score: None,
            contests: None,
            upcoming_sales: None,
            end_of_day_notes: None,
            priorities: vec![String::new(), String::new(), String::new()],
            todos: default_todos(),
            daily_operations: DailyOperations::default(),
            inventory_management: InventoryManagement::default(),
            store_standards: StoreStandards::default(),
            inventory_benches: None,
            upcoming_education: None,
            education_to_sold: None,
            social_posts: None,
            photos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_todos() -> Vec<TodoItem> {
    [
        "Schedule Team Meeting",
        "Update Product Displays",
        "Review Sales Reports",
        "Customer Follow-ups",
        "Social Media Posts",
    ]
    .into_iter()
    .map(|task| TodoItem {
        task: task.to_string(),
        completed: false,
    })
    .collect()
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPlannerEntry {
    pub id: String,
    pub store_id: String,
    pub date: String,
    pub daily_sales: Option<f64>,
    pub wtd_actual: Option<f64>,
    pub mtd_actual: Option<f64>,
    pub ytd_actual: Option<f64>,
    pub aif_service_goal: Option<i64>,
    pub adt_avg_transaction: Option<f64>,
    pub nps_score: Option<i64>,
    pub contests: Option<String>,
    pub upcoming_sales: Option<String>,
    pub end_of_day_notes: Option<String>,
    pub priorities: String,
    pub todos: String,
    pub daily_operations: String,
    pub inventory_management: String,
    pub store_standards: String,
    pub inventory_benches: Option<String>,
    pub upcoming_education: Option<String>,
    pub education_to_sold: Option<String>,
    pub social_posts: Option<String>,
    pub photos: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_json<T: serde::de::DeserializeOwned>(column: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw).map_err(|err| AppError::internal(format!("invalid {} json: {}", column, err)))
}

impl TryFrom<DbPlannerEntry> for PlannerEntry {
    type Error = AppError;

    fn try_from(value: DbPlannerEntry) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&value.date, "%Y-%m-%d")
            .map_err(|err| AppError::internal(format!("invalid entry date: {}", err)))?;

        Ok(PlannerEntry {
            id: parse_uuid(&value.id)?,
            store_id: parse_uuid(&value.store_id)?,
            date,
            daily_sales: value.daily_sales,
            wtd_actual: value.wtd_actual,
            mtd_actual: value.mtd_actual,
            ytd_actual: value.ytd_actual,
            aif_service_goal: value.aif_service_goal,
            adt_avg_transaction: value.adt_avg_transaction,
            nps_score: value.nps_score,
            contests: value.contests,
            upcoming_sales: value.upcoming_sales,
            end_of_day_notes: value.end_of_day_notes,
            priorities: parse_json("priorities", &value.priorities)?,
            todos: parse_json("todos", &value.todos)?,
            daily_operations: parse_json("daily_operations", &value.daily_operations)?,
            inventory_management: parse_json("inventory_management", &value.inventory_management)?,
            store_standards: parse_json("store_standards", &value.store_standards)?,
            inventory_benches: value.inventory_benches,
            upcoming_education: value.upcoming_education,
            education_to_sold: value.education_to_sold,
            social_posts: value.social_posts,
            photos: parse_json("photos", &value.photos)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// Partial update; absent fields keep their current value. Last write wins
/// across concurrent editors, which suits a single-associate-per-store
/// workload.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct PlannerEntryUpdateRequest {
    pub daily_sales: Option<f64>,
    pub wtd_actual: Option<f64>,
    pub mtd_actual: Option<f64>,
    pub ytd_actual: Option<f64>,
    pub aif_service_goal: Option<i64>,
    pub adt_avg_transaction: Option<f64>,
    pub nps_score: Option<i64>,
    pub contests: Option<String>,
    pub upcoming_sales: Option<String>,
    pub end_of_day_notes: Option<String>,
    pub priorities: Option<Vec<String>>,
    pub todos: Option<Vec<TodoItem>>,
    pub daily_operations: Option<DailyOperations>,
    pub inventory_management: Option<InventoryManagement>,
    pub store_standards: Option<StoreStandards>,
    pub inventory_benches: Option<String>,
    pub upcoming_education: Option<String>,
    pub education_to_sold: Option<String>,
    pub social_posts: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PhotoCreateRequest {
    #[schema(example = "endcap-display.jpg")]
    pub filename: String,
    #[schema(example = "store_condition")]
    pub category: Option<String>,
    pub url: Option<String>,
}

/// Planner read payload: the entry plus its staff schedule rows, the shape
/// the front end renders as one page.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlannerEntryWithSchedules {
    #[serde(flatten)]
    pub entry: PlannerEntry,
    pub staff_schedules: Vec<StaffSchedule>,
}
