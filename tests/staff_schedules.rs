mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::*;

async fn entry_for(
    t: &TestApp,
    token: &str,
    store: uuid::Uuid,
    date: &str,
) -> Result<String> {
    let (status, entry) = request(
        &t.app,
        "GET",
        &format!("/planner/{}/{}", store, date),
        Some(token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(entry["id"].as_str().expect("entry id").to_string())
}

#[tokio::test]
async fn schedule_rows_default_to_open_slots() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(store)).await?;

    let token = login(&t.app, "associate1").await?;
    let entry_id = entry_for(&t, &token, store, "2024-03-01").await?;

    let (status, row) = request(
        &t.app,
        "POST",
        "/staff-schedules",
        Some(&token),
        Some(json!({ "planner_entry_id": entry_id, "staff_name": "Jordan R." })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(row["staff_name"], json!("Jordan R."));
    assert_eq!(row["slot_8_to_9"], json!("Open"));
    assert_eq!(row["slot_4_to_8"], json!("Open"));

    // The planner read returns the row alongside the entry.
    let (_, reread) = request(
        &t.app,
        "GET",
        &format!("/planner/{}/2024-03-01", store),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(reread["staff_schedules"].as_array().expect("rows").len(), 1);

    Ok(())
}

#[tokio::test]
async fn schedule_update_and_delete() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(store)).await?;

    let token = login(&t.app, "associate1").await?;
    let entry_id = entry_for(&t, &token, store, "2024-03-01").await?;

    let (_, row) = request(
        &t.app,
        "POST",
        "/staff-schedules",
        Some(&token),
        Some(json!({ "planner_entry_id": entry_id, "staff_name": "Jordan R." })),
    )
    .await?;
    let row_id = row["id"].as_str().expect("row id").to_string();

    let (status, updated) = request(
        &t.app,
        "PUT",
        &format!("/staff-schedules/{}", row_id),
        Some(&token),
        Some(json!({ "slot_9_to_12": "Scheduled", "slot_12_to_4": "Break" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["slot_9_to_12"], json!("Scheduled"));
    assert_eq!(updated["slot_12_to_4"], json!("Break"));
    assert_eq!(updated["slot_8_to_9"], json!("Open"));

    let (status, _) = request(
        &t.app,
        "DELETE",
        &format!("/staff-schedules/{}", row_id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &t.app,
        "DELETE",
        &format!("/staff-schedules/{}", row_id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn schedules_are_scoped_through_the_owning_entry() -> Result<()> {
    let t = spawn_app().await?;
    let a = seed_store(&t.pool, "100", "Downtown").await?;
    let b = seed_store(&t.pool, "200", "Uptown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(a)).await?;
    seed_user(&t.pool, "associate2", "store_associate", Some(b)).await?;

    let token1 = login(&t.app, "associate1").await?;
    let entry_id = entry_for(&t, &token1, a, "2024-03-01").await?;
    let (_, row) = request(
        &t.app,
        "POST",
        "/staff-schedules",
        Some(&token1),
        Some(json!({ "planner_entry_id": entry_id, "staff_name": "Jordan R." })),
    )
    .await?;
    let row_id = row["id"].as_str().expect("row id").to_string();

    // Another store's associate sees neither the entry nor its rows.
    let token2 = login(&t.app, "associate2").await?;
    let (status, _) = request(
        &t.app,
        "POST",
        "/staff-schedules",
        Some(&token2),
        Some(json!({ "planner_entry_id": entry_id, "staff_name": "Sam" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &t.app,
        "PUT",
        &format!("/staff-schedules/{}", row_id),
        Some(&token2),
        Some(json!({ "staff_name": "Sam" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn management_roles_cannot_touch_schedules() -> Result<()> {
    let t = spawn_app().await?;
    let store = seed_store(&t.pool, "100", "Downtown").await?;
    seed_user(&t.pool, "associate1", "store_associate", Some(store)).await?;
    let dm = seed_user(&t.pool, "manager1", "district_manager", None).await?;
    assign_stores(&t.pool, dm, &[store]).await?;

    let token = login(&t.app, "associate1").await?;
    let entry_id = entry_for(&t, &token, store, "2024-03-01").await?;

    let dm_token = login(&t.app, "manager1").await?;
    let (status, _) = request(
        &t.app,
        "POST",
        "/staff-schedules",
        Some(&dm_token),
        Some(json!({ "planner_entry_id": entry_id, "staff_name": "Sam" })),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}
