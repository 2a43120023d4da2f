mod common;

use axum::http::{Method, StatusCode};
use chrono::{TimeZone, Utc};
use common::{id_of, TestApp};
use pvz_service::entities::{reception::ReceptionStatus, user::UserRole};
use serde_json::{json, Value};
use uuid::Uuid;

async fn list(app: &TestApp, query: &str) -> (StatusCode, Vec<Value>) {
    let (status, body) = app
        .send_as(UserRole::Employee, Method::GET, &format!("/pvz{query}"), None)
        .await;
    let items = body["data"].as_array().cloned().unwrap_or_default();
    (status, items)
}

fn pvz_ids(items: &[Value]) -> Vec<Uuid> {
    items.iter().map(|item| id_of(&item["pvz"])).collect()
}

/// Three pickup points, registered oldest first, each with one open reception.
async fn seed_three(app: &TestApp) -> Vec<Uuid> {
    let mut ids = Vec::new();
    for city in ["Moscow", "Kazan", "Saint Petersburg"] {
        let pvz_id = app.create_pickup_point(city).await;
        let (status, _) = app
            .send_as(
                UserRole::Employee,
                Method::POST,
                "/receptions",
                Some(json!({ "pvzId": pvz_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(pvz_id);
    }
    ids
}

#[tokio::test]
async fn pages_newest_registration_first() {
    let app = TestApp::new().await;
    let ids = seed_three(&app).await;

    let (status, first_page) = list(&app, "?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pvz_ids(&first_page), vec![ids[2], ids[1]]);

    let (_, second_page) = list(&app, "?limit=2&offset=2").await;
    assert_eq!(pvz_ids(&second_page), vec![ids[0]]);

    let (_, beyond) = list(&app, "?limit=2&offset=10").await;
    assert!(beyond.is_empty());
}

#[tokio::test]
async fn huge_offset_returns_an_empty_page() {
    let app = TestApp::new().await;
    seed_three(&app).await;

    let (status, items) = list(&app, "?limit=5&offset=18446744073709551615").await;
    assert_eq!(status, StatusCode::OK);
    assert!(items.is_empty());

    let (status, items) = list(&app, "?limit=5&offset=9223372036854775807").await;
    assert_eq!(status, StatusCode::OK);
    assert!(items.is_empty());
}

#[tokio::test]
async fn zero_limit_returns_an_empty_page() {
    let app = TestApp::new().await;
    seed_three(&app).await;

    let (status, items) = list(&app, "?limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert!(items.is_empty());
}

#[tokio::test]
async fn limit_is_capped_by_configuration() {
    let app = TestApp::with_config(|cfg| {
        cfg.default_page_size = 1;
        cfg.max_page_size = 2;
    })
    .await;
    seed_three(&app).await;

    let (_, defaulted) = list(&app, "").await;
    assert_eq!(defaulted.len(), 1);

    let (_, capped) = list(&app, "?limit=50").await;
    assert_eq!(capped.len(), 2);
}

#[tokio::test]
async fn pickup_points_without_receptions_are_not_listed() {
    let app = TestApp::new().await;
    let with_reception = seed_three(&app).await;
    let bare = app.create_pickup_point("Moscow").await;

    let (_, items) = list(&app, "").await;
    let listed = pvz_ids(&items);
    assert_eq!(listed.len(), with_reception.len());
    assert!(!listed.contains(&bare));
}

#[tokio::test]
async fn date_window_selects_pickup_points_but_shows_all_receptions() {
    let app = TestApp::new().await;

    let inside_and_outside = app.create_pickup_point("Moscow").await;
    let january = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
    let march = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    app.insert_reception_at(inside_and_outside, january, ReceptionStatus::Closed)
        .await;
    app.insert_reception_at(inside_and_outside, march, ReceptionStatus::Open)
        .await;

    let outside_only = app.create_pickup_point("Kazan").await;
    app.insert_reception_at(outside_only, march, ReceptionStatus::Closed)
        .await;

    let (status, items) = list(
        &app,
        "?startDate=2024-01-01%2000:00:00&endDate=2024-01-31%2023:59:59",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(pvz_ids(&items), vec![inside_and_outside]);

    let receptions = items[0]["receptions"].as_array().expect("receptions");
    let statuses: Vec<&str> = receptions
        .iter()
        .map(|r| r["reception"]["status"].as_str().expect("status"))
        .collect();
    assert_eq!(statuses, vec!["close", "in_progress"]);
}

#[tokio::test]
async fn date_bounds_are_inclusive_and_accept_rfc3339() {
    let app = TestApp::new().await;

    let pvz_id = app.create_pickup_point("Moscow").await;
    let at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    app.insert_reception_at(pvz_id, at, ReceptionStatus::Closed).await;

    let (_, only_start) = list(&app, "?startDate=2024-02-01T00:00:00Z").await;
    assert_eq!(pvz_ids(&only_start), vec![pvz_id]);

    let (_, only_end) = list(&app, "?endDate=2024-02-01%2000:00:00").await;
    assert_eq!(pvz_ids(&only_end), vec![pvz_id]);

    let (_, after) = list(&app, "?startDate=2024-02-01%2000:00:01").await;
    assert!(after.is_empty());
}

#[tokio::test]
async fn malformed_date_is_a_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send_as(
            UserRole::Moderator,
            Method::GET,
            "/pvz?startDate=yesterday",
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .expect("error message")
        .contains("startDate"));
}
