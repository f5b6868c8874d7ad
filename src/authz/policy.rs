use async_trait::async_trait;

use super::{Action, Decision, DenyReason, Principal, ResourceRef, Role};

/// Policy evaluator trait for pluggable authorization logic
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// Decide whether the principal may perform an action against a resource.
    async fn decide(&self, principal: &Principal, action: Action, resource: &ResourceRef) -> Decision;
}

/// The canonical decision table over the four roles and eight actions.
/// First matching rule wins; unknown combinations deny.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl RolePolicy {
    pub fn new() -> Self {
        Self
    }

    /// Store-visibility rules shared by `ReadStore`/`ListStores` and, for
    /// district managers, `ReadAnalytics`: a concrete target id must be in
    /// the principal's reachable set, a missing target means "list, scoped
    /// later by visibility".
    fn decide_store_scope(principal: &Principal, resource: &ResourceRef) -> Decision {
        match principal.role {
            Role::BusinessExecutive | Role::SuperAdmin => Decision::Allow,
            Role::StoreAssociate => match principal.home_store {
                None => Decision::Deny(DenyReason::NoHomeStore),
                Some(home) => match resource.store_id {
                    None => Decision::Allow,
                    Some(id) if id == home => Decision::Allow,
                    Some(_) => Decision::Deny(DenyReason::StoreNotAssigned),
                },
            },
            Role::DistrictManager => match resource.store_id {
                None => Decision::Allow,
                Some(id) if principal.assigned_stores.contains(&id) => Decision::Allow,
                Some(_) => Decision::Deny(DenyReason::StoreNotAssigned),
            },
        }
    }
}

#[async_trait]
impl PolicyEvaluator for RolePolicy {
    async fn decide(&self, principal: &Principal, action: Action, resource: &ResourceRef) -> Decision {
        let decision = match action {
            Action::CreateStore | Action::AssignStoreToManager | Action::ManageUsers => {
                if principal.role == Role::SuperAdmin {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::SuperAdminOnly)
                }
            }

            Action::ReadStore | Action::ListStores => Self::decide_store_scope(principal, resource),

            Action::ReadPlannerEntry | Action::WritePlannerEntry => match principal.role {
                // Administrative override.
                Role::SuperAdmin => Decision::Allow,
                Role::StoreAssociate => match principal.home_store {
                    None => Decision::Deny(DenyReason::NoHomeStore),
                    Some(home) => match resource.store_id {
                        None => Decision::Allow,
                        Some(id) if id == home => Decision::Allow,
                        Some(_) => Decision::Deny(DenyReason::StoreNotAssigned),
                    },
                },
                // Management roles read dashboards, they do not edit entries.
                Role::DistrictManager | Role::BusinessExecutive => {
                    Decision::Deny(DenyReason::EntriesAreAssociateScoped)
                }
            },

            Action::ReadAnalytics => match principal.role {
                Role::StoreAssociate => Decision::Deny(DenyReason::AnalyticsNotAvailable),
                Role::BusinessExecutive | Role::SuperAdmin => Decision::Allow,
                Role::DistrictManager => Self::decide_store_scope(principal, resource),
            },
        };

        if let Decision::Deny(reason) = decision {
            tracing::debug!(
                user_id = %principal.user_id,
                role = principal.role.as_str(),
                action = action.as_str(),
                store_id = ?resource.store_id,
                reason = reason.as_str(),
                "access denied"
            );
        }

        decision
    }
}
