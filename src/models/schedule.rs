use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::utils::parse_uuid;

/// State of one shift slot on the schedule grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ShiftStatus {
    Open,
    Scheduled,
    Break,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Open => "Open",
            ShiftStatus::Scheduled => "Scheduled",
            ShiftStatus::Break => "Break",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "Open" => Ok(ShiftStatus::Open),
            "Scheduled" => Ok(ShiftStatus::Scheduled),
            "Break" => Ok(ShiftStatus::Break),
            other => Err(AppError::internal(format!("invalid shift status: {}", other))),
        }
    }
}

impl Default for ShiftStatus {
    fn default() -> Self {
        ShiftStatus::Open
    }
}

/// One staff member's row on a planner entry's schedule grid.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffSchedule {
    pub id: Uuid,
    pub planner_entry_id: Uuid,
    pub staff_name: String,
    pub slot_8_to_9: ShiftStatus,
    pub slot_9_to_12: ShiftStatus,
    pub slot_12_to_4: ShiftStatus,
    pub slot_4_to_8: ShiftStatus,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbStaffSchedule {
    pub id: String,
    pub planner_entry_id: String,
    pub staff_name: String,
    pub slot_8_to_9: String,
    pub slot_9_to_12: String,
    pub slot_12_to_4: String,
    pub slot_4_to_8: String,
}

impl TryFrom<DbStaffSchedule> for StaffSchedule {
    type Error = AppError;

    fn try_from(value: DbStaffSchedule) -> Result<Self, Self::Error> {
        Ok(StaffSchedule {
            id: parse_uuid(&value.id)?,
            planner_entry_id: parse_uuid(&value.planner_entry_id)?,
            staff_name: value.staff_name,
            slot_8_to_9: ShiftStatus::parse(&value.slot_8_to_9)?,
            slot_9_to_12: ShiftStatus::parse(&value.slot_9_to_12)?,
            slot_12_to_4: ShiftStatus::parse(&value.slot_12_to_4)?,
            slot_4_to_8: ShiftStatus::parse(&value.slot_4_to_8)?,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StaffScheduleCreateRequest {
    pub planner_entry_id: Uuid,
    #[schema(example = "Jordan R.")]
    pub staff_name: String,
    #[serde(default)]
    pub slot_8_to_9: ShiftStatus,
    #[serde(default)]
    pub slot_9_to_12: ShiftStatus,
    #[serde(default)]
    pub slot_12_to_4: ShiftStatus,
    #[serde(default)]
    pub slot_4_to_8: ShiftStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct StaffScheduleUpdateRequest {
    pub staff_name: Option<String>,
    pub slot_8_to_9: Option<ShiftStatus>,
    pub slot_9_to_12: Option<ShiftStatus>,
    pub slot_12_to_4: Option<ShiftStatus>,
    pub slot_4_to_8: Option<ShiftStatus>,
}
