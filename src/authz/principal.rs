use std::collections::BTreeSet;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{Role, StoreVisibility};
use crate::app::AppState;
use crate::errors::AppError;
use crate::jwt::AuthUser;

/// The resolved identity performing a request: who they are, which of the
/// four roles they hold, and which stores that role binds them to.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
    /// The single store a store associate is bound to. Carried for other
    /// roles too when set, but the policy only consults it for associates.
    pub home_store: Option<Uuid>,
    /// A district manager's assignment set. Empty for every other role.
    pub assigned_stores: BTreeSet<Uuid>,
}

impl Principal {
    /// The store id-set this principal may see, per the visibility column of
    /// the decision table. An associate without a home store resolves to an
    /// empty set; the policy denies those requests before visibility is used.
    pub fn store_visibility(&self) -> StoreVisibility {
        match self.role {
            Role::StoreAssociate => {
                StoreVisibility::Only(self.home_store.into_iter().collect())
            }
            Role::DistrictManager => StoreVisibility::Only(self.assigned_stores.clone()),
            Role::BusinessExecutive | Role::SuperAdmin => StoreVisibility::All,
        }
    }
}

/// Map a verified session identity to a [`Principal`].
///
/// Fails `Unauthenticated` when the user record behind the token is gone, and
/// `InvalidRole` when the stored role is outside the closed set.
pub async fn resolve_principal(pool: &SqlitePool, user_id: Uuid) -> Result<Principal, AppError> {
    let row = sqlx::query("SELECT role, store_id FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::unauthenticated("user account not found"))?;

    let role_str: String = row.try_get("role")?;
    let role = Role::parse(&role_str).ok_or_else(|| AppError::invalid_role(role_str))?;

    let home_store = row
        .try_get::<Option<String>, _>("store_id")?
        .map(|s| crate::utils::parse_uuid(&s))
        .transpose()?;

    let assigned_stores = if role == Role::DistrictManager {
        let rows = sqlx::query("SELECT store_id FROM user_store_assignments WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_all(pool)
            .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("store_id")?;
                crate::utils::parse_uuid(&id)
            })
            .collect::<Result<BTreeSet<_>, _>>()?
    } else {
        BTreeSet::new()
    };

    Ok(Principal {
        user_id,
        role,
        home_store,
        assigned_stores,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        resolve_principal(&state.pool, auth.user_id).await
    }
}
