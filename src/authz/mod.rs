//! Authorization module - principal resolution and the role policy
//!
//! Three cooperating pieces:
//! - [`Principal`]: the resolved identity + role + store scope of a request
//! - [`RolePolicy`]: pure decision table over the closed role/action sets
//! - [`StoreVisibility`]: the concrete id-set (or "all" sentinel) a principal
//!   may see, used by the repository to pre-scope list queries

mod policy;
mod principal;

pub use policy::{PolicyEvaluator, RolePolicy};
pub use principal::{resolve_principal, Principal};

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::errors::AppError;

/// The closed set of roles. Any stored role outside this set fails principal
/// resolution with `InvalidRole` instead of silently downgrading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    StoreAssociate,
    DistrictManager,
    BusinessExecutive,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::StoreAssociate => "store_associate",
            Role::DistrictManager => "district_manager",
            Role::BusinessExecutive => "business_executive",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "store_associate" => Some(Role::StoreAssociate),
            "district_manager" => Some(Role::DistrictManager),
            "business_executive" => Some(Role::BusinessExecutive),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

/// The closed set of actions the policy knows how to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadStore,
    ListStores,
    CreateStore,
    AssignStoreToManager,
    ReadPlannerEntry,
    WritePlannerEntry,
    ReadAnalytics,
    ManageUsers,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ReadStore => "read_store",
            Action::ListStores => "list_stores",
            Action::CreateStore => "create_store",
            Action::AssignStoreToManager => "assign_store_to_manager",
            Action::ReadPlannerEntry => "read_planner_entry",
            Action::WritePlannerEntry => "write_planner_entry",
            Action::ReadAnalytics => "read_analytics",
            Action::ManageUsers => "manage_users",
        }
    }
}

/// Target of a policy check. List-shaped actions carry no store id; the
/// repository scopes them with [`StoreVisibility`] instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceRef {
    pub store_id: Option<Uuid>,
}

impl ResourceRef {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn store(store_id: Uuid) -> Self {
        Self {
            store_id: Some(store_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Turn a denial into the typed `Forbidden` error the handlers propagate.
    pub fn require(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::forbidden(reason.as_str())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    SuperAdminOnly,
    NoHomeStore,
    StoreNotAssigned,
    EntriesAreAssociateScoped,
    AnalyticsNotAvailable,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::SuperAdminOnly => "super admin access required",
            DenyReason::NoHomeStore => "no store assigned to your account",
            DenyReason::StoreNotAssigned => "store not assigned to your account",
            DenyReason::EntriesAreAssociateScoped => {
                "planner entries are maintained by the owning store's associate"
            }
            DenyReason::AnalyticsNotAvailable => "analytics are not available for your role",
        }
    }
}

/// Which stores a principal may see: the "all" sentinel for executives and
/// super admins, an explicit id-set for everyone else. An empty set means
/// empty results, never "all".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreVisibility {
    All,
    Only(BTreeSet<Uuid>),
}

impl StoreVisibility {
    pub fn is_empty(&self) -> bool {
        matches!(self, StoreVisibility::Only(ids) if ids.is_empty())
    }

    pub fn contains(&self, store_id: Uuid) -> bool {
        match self {
            StoreVisibility::All => true,
            StoreVisibility::Only(ids) => ids.contains(&store_id),
        }
    }

    /// Intersect an explicit request with this visibility. Unassigned ids are
    /// dropped silently; an empty request means "everything visible".
    pub fn intersect(&self, requested: &[Uuid]) -> Option<Vec<Uuid>> {
        match self {
            StoreVisibility::All => {
                if requested.is_empty() {
                    None
                } else {
                    Some(requested.to_vec())
                }
            }
            StoreVisibility::Only(ids) => {
                if requested.is_empty() {
                    Some(ids.iter().copied().collect())
                } else {
                    Some(
                        requested
                            .iter()
                            .copied()
                            .filter(|id| ids.contains(id))
                            .collect(),
                    )
                }
            }
        }
    }
}
