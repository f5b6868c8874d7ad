mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::*;

#[tokio::test]
async fn get_or_create_is_idempotent_and_seeds_defaults() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(store)).await?;

    let token = login(&t.app, "associate1").await?;
    let uri = format!("/planner/{}/2024-03-01", store);

    let (status, first) = request(&t.app, "GET", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["store_id"], json!(store.to_string()));
    assert_eq!(first["date"], json!("2024-03-01"));

    // Default checklists: all tasks unchecked, three priority slots, the
    // seeded todo list, no schedules yet.
    assert_eq!(first["daily_operations"]["review_huddle_calendar"], json!(false));
    assert_eq!(first["inventory_management"]["review_damage_log"], json!(false));
    assert_eq!(first["store_standards"]["clean_floors"], json!(false));
    assert_eq!(first["priorities"].as_array().expect("priorities").len(), 3);
    assert_eq!(first["todos"].as_array().expect("todos").len(), 5);
    assert_eq!(first["staff_schedules"].as_array().expect("schedules").len(), 0);

    let (status, second) = request(&t.app, "GET", &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);

    let rows: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM planner_entries WHERE store_id = ?")
            .bind(store.to_string())
            .fetch_one(&t.pool)
            .await?;
    assert_eq!(rows, 1);

    Ok(())
}

#[tokio::test]
async fn update_applies_partial_fields_only() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(store)).await?;

    let token = login(&t.app, "associate1").await?;
    let (_, entry) = request(
        &t.app,
        "GET",
        &format!("/planner/{}/2024-03-01", store),
        Some(&token),
        None,
    )
    .await?;
    let entry_id = entry["id"].as_str().expect("entry id").to_string();

    let update = json!({
        "daily_sales": 1234.5,
        "contests": "Spring promo",
        "priorities": ["Restock", "Training", "Displays"],
        "daily_operations": { "review_huddle_calendar": true }
    });
    let (status, updated) = request(
        &t.app,
        "PUT",
        &format!("/planner/{}", entry_id),
        Some(&token),
        Some(update),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["daily_sales"], json!(1234.5));
    assert_eq!(updated["contests"], json!("Spring promo"));
    assert_eq!(updated["priorities"][0], json!("Restock"));
    assert_eq!(updated["daily_operations"]["review_huddle_calendar"], json!(true));
    // Untouched fields keep their values.
    assert_eq!(updated["end_of_day_notes"], json!(null));
    assert_eq!(updated["todos"].as_array().expect("todos").len(), 5);

    let (status, _) = request(
        &t.app,
        "PUT",
        &format!("/planner/{}", Uuid::new_v4()),
        Some(&token),
        Some(json!({ "daily_sales": 1.0 })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn entries_of_other_stores_are_invisible() -> Result<()> {
    let t = spawn_app().await?;
    let a = seed_store(&t.pool, "100", "Downtown").await?;
    let b = seed_store(&t.pool, "200", "Uptown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(a)).await?;
    seed_user(&t.pool, "associate2", "store_associate", Some(b)).await?;

    let token1 = login(&t.app, "associate1").await?;
    let (_, entry) = request(
        &t.app,
        "GET",
        &format!("/planner/{}/2024-03-01", a),
        Some(&token1),
        None,
    )
    .await?;
    let entry_id = entry["id"].as_str().expect("entry id").to_string();

    // Addressed by opaque id: absent and invisible look the same.
    let token2 = login(&t.app, "associate2").await?;
    let (status, _) = request(
        &t.app,
        "PUT",
        &format!("/planner/{}", entry_id),
        Some(&token2),
        Some(json!({ "daily_sales": 9.0 })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn management_roles_cannot_write_entries() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(store)).await?;
    let dm = seed_user(&t.pool, "manager1", "district_manager", None).await?;
    assign_stores(&t.pool, dm, &[store]).await?;
    seed_user(&t.pool, "exec1", "business_executive", None).await?;

    let token = login(&t.app, "associate1").await?;
    let (_, entry) = request(
        &t.app,
        "GET",
        &format!("/planner/{}/2024-03-01", store),
        Some(&token),
        None,
    )
    .await?;
    let entry_id = entry["id"].as_str().expect("entry id").to_string();

    for username in ["manager1", "exec1"] {
        let token = login(&t.app, username).await?;
        let (status, _) = request(
            &t.app,
            "PUT",
            &format!("/planner/{}", entry_id),
            Some(&token),
            Some(json!({ "daily_sales": 1.0 })),
        )
        .await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} should be denied", username);
    }

    Ok(())
}

#[tokio::test]
async fn super_admin_can_edit_any_store_entry() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "root", "super_admin", None).await?;

    let token = login(&t.app, "root").await?;
    let (status, entry) = request(
        &t.app,
        "GET",
        &format!("/planner/{}/2024-04-01", store),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let entry_id = entry["id"].as_str().expect("entry id").to_string();
    let (status, updated) = request(
        &t.app,
        "PUT",
        &format!("/planner/{}", entry_id),
        Some(&token),
        Some(json!({ "end_of_day_notes": "audited" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["end_of_day_notes"], json!("audited"));

    Ok(())
}

#[tokio::test]
async fn photo_metadata_lifecycle() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(store)).await?;

    let token = login(&t.app, "associate1").await?;
    let (_, entry) = request(
        &t.app,
        "GET",
        &format!("/planner/{}/2024-03-01", store),
        Some(&token),
        None,
    )
    .await?;
    let entry_id = entry["id"].as_str().expect("entry id").to_string();

    let (status, photo) = request(
        &t.app,
        "POST",
        &format!("/planner/{}/photos", entry_id),
        Some(&token),
        Some(json!({ "filename": "endcap.jpg", "category": "store_condition" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let photo_id = photo["id"].as_str().expect("photo id").to_string();
    assert_eq!(photo["category"], json!("store_condition"));

    let (_, reread) = request(
        &t.app,
        "GET",
        &format!("/planner/{}/2024-03-01", store),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(reread["photos"].as_array().expect("photos").len(), 1);

    let (status, _) = request(
        &t.app,
        "DELETE",
        &format!("/planner/{}/photos/{}", entry_id, photo_id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &t.app,
        "DELETE",
        &format!("/planner/{}/photos/{}", entry_id, photo_id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn history_returns_newest_first() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(store)).await?;

    let token = login(&t.app, "associate1").await?;
    for day in ["2024-03-01", "2024-03-02", "2024-03-03"] {
        let (status, _) = request(
            &t.app,
            "GET",
            &format!("/planner/{}/{}", store, day),
            Some(&token),
            None,
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = request(
        &t.app,
        "GET",
        &format!("/planner/{}/history?limit=2", store),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = body
        .as_array()
        .expect("history array")
        .iter()
        .map(|e| e["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-03-03", "2024-03-02"]);

    Ok(())
}
