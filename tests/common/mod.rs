#![allow(dead_code)]

//! Shared setup for the integration tests: a tempfile SQLite database with
//! migrations applied, plus seeding and request helpers. Accounts are
//! provisioned directly in the database because the API has no public
//! registration.

use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use store_planner::create_app;
use store_planner::utils::hash_password;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn spawn_app() -> Result<TestApp> {
    let dir = tempfile::tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join("test.db");
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"),
    )
    .await?;
    migrator.run(&pool).await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool.clone()).await?;

    Ok(TestApp {
        app,
        pool,
        _dir: dir,
    })
}

pub async fn seed_user(
    pool: &SqlitePool,
    username: &str,
    role: &str,
    store_id: Option<Uuid>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, username, password_hash, email, first_name, last_name, role, store_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(username)
    .bind(hash_password(PASSWORD)?)
    .bind(format!("{}@example.com", username))
    .bind("Test")
    .bind("User")
    .bind(role)
    .bind(store_id.map(|s| s.to_string()))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn seed_store(pool: &SqlitePool, store_number: &str, name: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO stores (id, store_number, name, location, is_active, district_manager_id, created_at, updated_at) VALUES (?, ?, ?, ?, 1, NULL, ?, ?)",
    )
    .bind(id.to_string())
    .bind(store_number)
    .bind(name)
    .bind("Testville")
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn assign_stores(pool: &SqlitePool, user_id: Uuid, store_ids: &[Uuid]) -> Result<()> {
    let now = Utc::now();
    for store_id in store_ids {
        sqlx::query(
            "INSERT INTO user_store_assignments (user_id, store_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(store_id.to_string())
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn seed_analytics(
    pool: &SqlitePool,
    store_id: Uuid,
    month: &str,
    sales_trend: f64,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO store_analytics (id, store_id, month, sales_trend, staff_performance, goal_progress, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(store_id.to_string())
    .bind(month)
    .bind(sales_trend)
    .bind(0.8)
    .bind(0.6)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn login(app: &Router, username: &str) -> Result<String> {
    let (status, value) = request(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": PASSWORD })),
    )
    .await?;

    if status != StatusCode::OK {
        anyhow::bail!("login failed for {}: {} - {}", username, status, value);
    }

    value
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("missing token")
}

/// Run one request against the router and return the status plus the parsed
/// JSON body (`Value::Null` when the body is empty).
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}
