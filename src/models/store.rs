use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::utils::parse_uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Store {
    pub id: Uuid,
    /// Display key, unique across the chain.
    pub store_number: String,
    pub name: String,
    pub location: String,
    pub is_active: bool,
    pub district_manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbStore {
    pub id: String,
    pub store_number: String,
    pub name: String,
    pub location: String,
    pub is_active: bool,
    pub district_manager_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbStore> for Store {
    type Error = AppError;

    fn try_from(value: DbStore) -> Result<Self, Self::Error> {
        Ok(Store {
            id: parse_uuid(&value.id)?,
            store_number: value.store_number,
            name: value.name,
            location: value.location,
            is_active: value.is_active,
            district_manager_id: value.district_manager_id.as_deref().map(parse_uuid).transpose()?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreCreateRequest {
    #[schema(example = "1042")]
    pub store_number: String,
    #[schema(example = "Downtown Flagship")]
    pub name: String,
    #[schema(example = "Portland, OR")]
    pub location: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignManagerRequest {
    /// District manager to assign; `null` clears the assignment.
    pub district_manager_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreAssignmentRequest {
    pub store_id: Uuid,
}
