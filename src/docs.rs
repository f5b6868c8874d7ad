//! OpenAPI document and the Swagger UI routes.

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme};
use utoipa::openapi::ServerBuilder;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::authz;
use crate::models;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::auth::login,
        routes::auth::me,
        routes::auth::logout,
        routes::stores::list_stores,
        routes::stores::get_store,
        routes::stores::create_store,
        routes::planner::get_or_create,
        routes::planner::history,
        routes::planner::update_entry,
        routes::planner::add_photo,
        routes::planner::delete_photo,
        routes::schedules::create_schedule,
        routes::schedules::update_schedule,
        routes::schedules::delete_schedule,
        routes::analytics::list_analytics,
        routes::analytics::analytics_for_store,
        routes::analytics::store_performance,
        routes::admin::list_users,
        routes::admin::create_user,
        routes::admin::update_role,
        routes::admin::list_district_managers,
        routes::admin::assign_store,
        routes::admin::add_assignment,
        routes::admin::remove_assignment,
        routes::health::health
    ),
    components(
        schemas(
            authz::Role,
            models::user::User,
            models::user::AuthResponse,
            models::user::LoginRequest,
            models::user::UserCreateRequest,
            models::user::RoleUpdateRequest,
            models::store::Store,
            models::store::StoreCreateRequest,
            models::store::AssignManagerRequest,
            models::store::StoreAssignmentRequest,
            models::planner::PlannerEntry,
            models::planner::PlannerEntryWithSchedules,
            models::planner::PlannerEntryUpdateRequest,
            models::planner::TodoItem,
            models::planner::DailyOperations,
            models::planner::InventoryManagement,
            models::planner::StoreStandards,
            models::planner::PhotoMeta,
            models::planner::PhotoCreateRequest,
            models::schedule::StaffSchedule,
            models::schedule::ShiftStatus,
            models::schedule::StaffScheduleCreateRequest,
            models::schedule::StaffScheduleUpdateRequest,
            models::analytics::StoreAnalytics,
            models::analytics::StorePerformance,
            routes::auth::MessageResponse,
            routes::health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Stores", description = "Store directory, scoped to the caller"),
        (name = "Planner", description = "Daily planner entries"),
        (name = "Staff schedules", description = "Per-entry staff schedule grid"),
        (name = "Analytics", description = "Store analytics and reports"),
        (name = "Admin", description = "Super-admin user and assignment management"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme and a global security requirement so the
/// Swagger UI Authorize dialog sends the Authorization header.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert(utoipa::openapi::Components::new());
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.security = Some(vec![SecurityRequirement::new(
            "bearerAuth",
            Vec::<String>::new(),
        )]);
    }
}

/// Swagger UI at `/docs` plus the raw document at `/api-docs/openapi.json`,
/// mounted next to the API routes by `main`.
pub fn swagger_routes(port: u16) -> Router {
    let mut doc = ApiDoc::openapi();

    // Point Try-it-out at the running backend by default.
    doc.servers = Some(vec![ServerBuilder::new()
        .url(format!("http://localhost:{}", port))
        .build()]);

    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", doc))
}
