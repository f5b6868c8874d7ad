mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::*;

#[tokio::test]
async fn store_creation_requires_super_admin() -> Result<()> {
    let t = spawn_app().await?;
    seed_user(&t.pool, "root", "super_admin", None).await?;
    seed_user(&t.pool, "manager1", "district_manager", None).await?;
    seed_user(&t.pool, "exec1", "business_executive", None).await?;

    let payload = json!({ "store_number": "1042", "name": "Downtown Flagship", "location": "Portland, OR" });

    for username in ["manager1", "exec1"] {
        let token = login(&t.app, username).await?;
        let (status, _) =
            request(&t.app, "POST", "/stores", Some(&token), Some(payload.clone())).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} should be denied", username);
    }

    let token = login(&t.app, "root").await?;
    let (status, store) =
        request(&t.app, "POST", "/stores", Some(&token), Some(payload.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(store["store_number"], json!("1042"));
    assert_eq!(store["is_active"], json!(true));

    let (status, _) = request(&t.app, "POST", "/stores", Some(&token), Some(payload)).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn user_provisioning_is_super_admin_only() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "root", "super_admin", None).await?;
    seed_user(&t.pool, "manager1", "district_manager", None).await?;

    let dm_token = login(&t.app, "manager1").await?;
    let (status, _) = request(&t.app, "GET", "/admin/users", Some(&dm_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = login(&t.app, "root").await?;
    let payload = json!({
        "username": "associate7",
        "password": PASSWORD,
        "email": "associate7@example.com",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "role": "store_associate",
        "store_id": store.to_string()
    });
    let (status, user) =
        request(&t.app, "POST", "/admin/users", Some(&token), Some(payload.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["role"], json!("store_associate"));
    assert_eq!(user["store_id"], json!(store.to_string()));

    // The new account can log in and is scoped to its home store.
    let new_token = login(&t.app, "associate7").await?;
    let (status, body) = request(&t.app, "GET", "/stores", Some(&new_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("stores array").len(), 1);

    let (status, _) = request(&t.app, "POST", "/admin/users", Some(&token), Some(payload)).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let short = json!({
        "username": "associate8",
        "password": "short",
        "email": "associate8@example.com",
        "first_name": "Bo",
        "last_name": "Short",
        "role": "store_associate",
        "store_id": store.to_string()
    });
    let (status, _) = request(&t.app, "POST", "/admin/users", Some(&token), Some(short)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn store_assignment_reflects_immediately() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "root", "super_admin", None).await?;
    let dm1 = seed_user(&t.pool, "manager1", "district_manager", None).await?;
    let dm2 = seed_user(&t.pool, "manager2", "district_manager", None).await?;

    let admin_token = login(&t.app, "root").await?;
    let dm1_token = login(&t.app, "manager1").await?;
    let dm2_token = login(&t.app, "manager2").await?;

    let (status, _) = request(
        &t.app,
        "PUT",
        &format!("/admin/stores/{}/assign", store),
        Some(&admin_token),
        Some(json!({ "district_manager_id": dm1.to_string() })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // No caching staleness: the very next list reflects the assignment.
    let (_, body) = request(&t.app, "GET", "/stores", Some(&dm1_token), None).await?;
    assert_eq!(body.as_array().expect("stores array").len(), 1);

    // Reassigning hands the store over; the old manager loses it.
    let (status, _) = request(
        &t.app,
        "PUT",
        &format!("/admin/stores/{}/assign", store),
        Some(&admin_token),
        Some(json!({ "district_manager_id": dm2.to_string() })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&t.app, "GET", "/stores", Some(&dm1_token), None).await?;
    assert_eq!(body.as_array().expect("stores array").len(), 0);
    let (_, body) = request(&t.app, "GET", "/stores", Some(&dm2_token), None).await?;
    assert_eq!(body.as_array().expect("stores array").len(), 1);

    // Assigning a non-manager is rejected.
    let associate = seed_user(&t.pool, "associate1", "store_associate", Some(store)).await?;
    let (status, _) = request(
        &t.app,
        "PUT",
        &format!("/admin/stores/{}/assign", store),
        Some(&admin_token),
        Some(json!({ "district_manager_id": associate.to_string() })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn direct_assignment_edits() -> Result<()> {
    let t = spawn_app().await?;
    let a = seed_store(&t.pool, "100", "Downtown").await?;
    let b = seed_store(&t.pool, "200", "Uptown").await?;
    seed_user(&t.pool, "root", "super_admin", None).await?;
    let dm = seed_user(&t.pool, "manager1", "district_manager", None).await?;

    let admin_token = login(&t.app, "root").await?;
    let dm_token = login(&t.app, "manager1").await?;

    for store in [a, b] {
        let (status, _) = request(
            &t.app,
            "POST",
            &format!("/admin/users/{}/assignments", dm),
            Some(&admin_token),
            Some(json!({ "store_id": store.to_string() })),
        )
        .await?;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, body) = request(&t.app, "GET", "/stores", Some(&dm_token), None).await?;
    assert_eq!(body.as_array().expect("stores array").len(), 2);

    let (status, _) = request(
        &t.app,
        "DELETE",
        &format!("/admin/users/{}/assignments/{}", dm, b),
        Some(&admin_token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = request(&t.app, "GET", "/stores", Some(&dm_token), None).await?;
    assert_eq!(body.as_array().expect("stores array").len(), 1);

    let (status, _) = request(
        &t.app,
        "DELETE",
        &format!("/admin/users/{}/assignments/{}", dm, b),
        Some(&admin_token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Only district managers can hold assignments.
    let associate = seed_user(&t.pool, "associate1", "store_associate", Some(a)).await?;
    let (status, _) = request(
        &t.app,
        "POST",
        &format!("/admin/users/{}/assignments", associate),
        Some(&admin_token),
        Some(json!({ "store_id": a.to_string() })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn demoting_a_manager_clears_their_assignments() -> Result<()> {
    let t = spawn_app().await?;
    let a = seed_store(&t.pool, "100", "Downtown").await?;
    let b = seed_store(&t.pool, "200", "Uptown").await?;
    seed_user(&t.pool, "root", "super_admin", None).await?;
    let dm = seed_user(&t.pool, "manager1", "district_manager", None).await?;
    assign_stores(&t.pool, dm, &[a, b]).await?;

    let admin_token = login(&t.app, "root").await?;
    let (status, user) = request(
        &t.app,
        "PUT",
        &format!("/admin/users/{}/role", dm),
        Some(&admin_token),
        Some(json!({ "role": "store_associate", "store_id": a.to_string() })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], json!("store_associate"));

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM user_store_assignments WHERE user_id = ?")
            .bind(dm.to_string())
            .fetch_one(&t.pool)
            .await?;
    assert_eq!(remaining, 0);

    // Roles are resolved per request; the existing token now acts as an
    // associate bound to the new home store.
    let token = login(&t.app, "manager1").await?;
    let (status, body) = request(&t.app, "GET", "/stores", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let stores = body.as_array().expect("stores array");
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0]["id"], json!(a.to_string()));

    Ok(())
}

#[tokio::test]
async fn district_manager_listing_and_unknown_targets() -> Result<()> {
    let t = spawn_app().await?;
    seed_user(&t.pool, "root", "super_admin", None).await?;
    seed_user(&t.pool, "manager1", "district_manager", None).await?;
    seed_user(&t.pool, "exec1", "business_executive", None).await?;

    let token = login(&t.app, "root").await?;
    let (status, body) = request(&t.app, "GET", "/admin/district-managers", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let managers = body.as_array().expect("managers array");
    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0]["username"], json!("manager1"));

    let (status, _) = request(
        &t.app,
        "PUT",
        &format!("/admin/users/{}/role", Uuid::new_v4()),
        Some(&token),
        Some(json!({ "role": "store_associate" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
