use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::utils::parse_uuid;

/// Monthly per-store trend aggregate, produced out-of-band. Read-only in
/// this service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreAnalytics {
    pub id: Uuid,
    pub store_id: Uuid,
    /// YYYY-MM
    #[schema(example = "2024-01")]
    pub month: String,
    pub sales_trend: Option<f64>,
    pub staff_performance: Option<f64>,
    pub goal_progress: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbStoreAnalytics {
    pub id: String,
    pub store_id: String,
    pub month: String,
    pub sales_trend: Option<f64>,
    pub staff_performance: Option<f64>,
    pub goal_progress: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbStoreAnalytics> for StoreAnalytics {
    type Error = AppError;

    fn try_from(value: DbStoreAnalytics) -> Result<Self, Self::Error> {
        Ok(StoreAnalytics {
            id: parse_uuid(&value.id)?,
            store_id: parse_uuid(&value.store_id)?,
            month: value.month,
            sales_trend: value.sales_trend,
            staff_performance: value.staff_performance,
            goal_progress: value.goal_progress,
            created_at: value.created_at,
        })
    }
}

/// Per-store activity roll-up for the trailing-week report.
#[derive(Debug, Serialize, ToSchema)]
pub struct StorePerformance {
    pub store_id: Uuid,
    pub store_number: String,
    pub name: String,
    pub location: String,
    pub entries_count: i64,
    pub has_recent_activity: bool,
    pub last_entry_date: Option<String>,
}
