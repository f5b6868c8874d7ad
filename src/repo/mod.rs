//! Scoped repository - the only data-access path for request handlers.
//!
//! Every method takes the caller's [`Principal`] explicitly, asks the policy
//! before touching the database, and pre-filters list queries down to the
//! principal's visible stores at the query boundary. Handlers never see a row
//! the policy would not have allowed.

mod analytics;
mod planner;
mod schedules;
mod stores;
mod users;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz::{RolePolicy, StoreVisibility};

#[derive(Debug, Clone)]
pub struct ScopedRepo {
    pool: SqlitePool,
    policy: RolePolicy,
}

impl ScopedRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            policy: RolePolicy::new(),
        }
    }
}

/// Render an explicit visibility set as an `IN (...)` filter plus its binds.
/// `StoreVisibility::All` needs no filter; callers must short-circuit empty
/// sets to an empty result before building a query.
fn store_scope_filter(column: &str, visibility: &StoreVisibility) -> Option<(String, Vec<String>)> {
    match visibility {
        StoreVisibility::All => None,
        StoreVisibility::Only(ids) => {
            let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
            let clause = format!("{} IN ({})", column, placeholders);
            let binds = ids.iter().map(Uuid::to_string).collect();
            Some((clause, binds))
        }
    }
}
