use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::repo::ScopedRepo;
use crate::routes::{admin, analytics, auth, health, planner, schedules, stores};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
        }
    }

    /// The only data-access path handlers use; every call takes the caller's
    /// resolved [`crate::authz::Principal`].
    pub fn repo(&self) -> ScopedRepo {
        ScopedRepo::new(self.pool.clone())
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    let state = AppState::new(pool, jwt_config);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout));

    let store_routes = Router::new()
        .route("/", get(stores::list_stores))
        .route("/", post(stores::create_store))
        .route("/:id", get(stores::get_store));

    // One param name per position: the first segment is a store id for the
    // day/history reads and an entry id for the writes.
    let planner_routes = Router::new()
        .route("/:id/history", get(planner::history))
        .route("/:id/:date", get(planner::get_or_create))
        .route("/:id", put(planner::update_entry))
        .route("/:id/photos", post(planner::add_photo))
        .route("/:id/photos/:photo_id", delete(planner::delete_photo));

    let schedule_routes = Router::new()
        .route("/", post(schedules::create_schedule))
        .route("/:id", put(schedules::update_schedule))
        .route("/:id", delete(schedules::delete_schedule));

    let analytics_routes = Router::new()
        .route("/", get(analytics::list_analytics))
        .route("/:store_id", get(analytics::analytics_for_store));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users", post(admin::create_user))
        .route("/users/:id/role", put(admin::update_role))
        .route("/users/:id/assignments", post(admin::add_assignment))
        .route("/users/:id/assignments/:store_id", delete(admin::remove_assignment))
        .route("/district-managers", get(admin::list_district_managers))
        .route("/stores/:store_id/assign", put(admin::assign_store));

    let router = Router::new()
        .nest("/auth", auth_routes)
        .nest("/stores", store_routes)
        .nest("/planner", planner_routes)
        .nest("/staff-schedules", schedule_routes)
        .nest("/analytics", analytics_routes)
        .nest("/admin", admin_routes)
        .route("/reports/store-performance", get(analytics::store_performance))
        .route("/api/health", get(health::health))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
