// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP API tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

mod common;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(serde_json::to_string(&value).unwrap())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _, _) = common::create_test_app().await;

    let response = send(&app, "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "synced");
}

#[tokio::test]
async fn test_state_on_first_run() {
    let (app, _, _) = common::create_test_app().await;

    let response = send(&app, "GET", "/api/state", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["quick_actions"].as_array().unwrap().len(), 4);
    assert_eq!(body["activity_groups"].as_array().unwrap().len(), 2);
    assert_eq!(body["recent_activities"], json!([]));
    assert_eq!(body["total_carbon_saved"], 0.0);
    assert_eq!(body["show_tooltips"], true);

    // Group impact is derived from its members
    let office = &body["activity_groups"][0];
    let members: f64 = office["activities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["impact"].as_f64().unwrap())
        .sum();
    assert!((office["impact"].as_f64().unwrap() - members).abs() < 1e-9);
}

#[tokio::test]
async fn test_log_quick_action() {
    let (app, state, _) = common::create_test_app().await;

    let response = send(&app, "POST", "/api/quick-actions/transport/log", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let activity = json_body(response).await;
    assert_eq!(activity["name"], "Quick Transport");
    assert_eq!(activity["category"], "transport");
    assert_eq!(activity["impact"], 2.3);

    assert_eq!(state.ledger.total_carbon_saved().await, 2.3);
    // Using a quick action ends onboarding
    assert!(!state.ledger.show_tooltips().await);
}

#[tokio::test]
async fn test_log_unknown_quick_action_not_found() {
    let (app, state, _) = common::create_test_app().await;
    let before = state.ledger.snapshot().await;

    let response = send(&app, "POST", "/api/quick-actions/teleport/log", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "not_found");
    assert_eq!(state.ledger.snapshot().await, before);
}

#[tokio::test]
async fn test_create_activity() {
    let (app, state, _) = common::create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/activities",
        Some(json!({
            "name": "  Cycled to work ",
            "category": "transport",
            "impact": "3.2",
            "notes": ""
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let activity = json_body(response).await;
    assert_eq!(activity["name"], "Cycled to work");
    assert_eq!(activity["impact"], 3.2);
    assert!(activity["notes"].is_null());

    let recent = state.ledger.recent_activities().await;
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, activity["id"].as_str().unwrap());
    assert_eq!(state.ledger.total_carbon_saved().await, 3.2);
}

#[tokio::test]
async fn test_create_activity_accepts_numeric_impact() {
    let (app, _, _) = common::create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/activities",
        Some(json!({"name": "Veggie lunch", "category": "food", "impact": 1.25})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["impact"], 1.25);
}

#[tokio::test]
async fn test_create_activity_validation_errors() {
    let (app, state, _) = common::create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/activities",
        Some(json!({"name": " ", "category": "", "impact": "-4"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["fields"]["name"], "Activity name is required");
    assert_eq!(body["fields"]["category"], "Please select a category");
    assert_eq!(
        body["fields"]["impact"],
        "Please enter a valid positive number"
    );

    assert!(state.ledger.recent_activities().await.is_empty());
    assert!(state.ledger.show_tooltips().await);
}

#[tokio::test]
async fn test_activities_filtered_by_category() {
    let (app, _, _) = common::create_test_app().await;

    for id in ["transport", "food", "transport"] {
        let uri = format!("/api/quick-actions/{}/log", id);
        let response = send(&app, "POST", &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let body = json_body(send(&app, "GET", "/api/activities?category=transport", None).await).await;
    assert_eq!(body["category"], "transport");
    assert_eq!(body["total"], 2);

    let body = json_body(send(&app, "GET", "/api/activities?category=", None).await).await;
    assert!(body["category"].is_null());
    assert_eq!(body["total"], 3);

    let body = json_body(send(&app, "GET", "/api/activities?category=shopping", None).await).await;
    assert_eq!(body["activities"], json!([]));
}

#[tokio::test]
async fn test_create_group() {
    let (app, state, _) = common::create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/groups",
        Some(json!({
            "title": "Meal prep Sunday",
            "activities": [
                {"name": "Farmers market", "category": "shopping", "impact": 1.5},
                {"name": "Batch cooking", "category": "food", "impact": 2.0}
            ]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let group = json_body(response).await;
    assert_eq!(group["impact"], 3.5);
    assert_eq!(group["activities"].as_array().unwrap().len(), 2);

    let groups = json_body(send(&app, "GET", "/api/groups", None).await).await;
    assert_eq!(groups.as_array().unwrap().len(), 3);
    assert_eq!(groups[0]["title"], "Meal prep Sunday");

    assert_eq!(state.ledger.total_carbon_saved().await, 3.5);
}

#[tokio::test]
async fn test_create_group_blank_title_rejected() {
    let (app, _, _) = common::create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/groups",
        Some(json!({"title": "  ", "activities": []})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_create_group_multibyte_title_within_limit() {
    let (app, _, _) = common::create_test_app().await;
    let title = "🌍".repeat(40);

    let response = send(
        &app,
        "POST",
        "/api/groups",
        Some(json!({
            "title": &title,
            "activities": [{"name": "Plant trees", "category": "home", "impact": 4.0}]
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["title"], title);
}

#[tokio::test]
async fn test_create_activity_reports_only_invalid_fields() {
    let (app, _, _) = common::create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/activities",
        Some(json!({"name": "Bus", "category": "transport", "impact": ""})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    let fields = body["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields["impact"], "Carbon impact is required");
}

#[tokio::test]
async fn test_dismiss_tooltips() {
    let (app, state, _) = common::create_test_app().await;

    let response = send(&app, "POST", "/api/tooltips/dismiss", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!state.ledger.show_tooltips().await);

    // Idempotent
    let response = send(&app, "POST", "/api/tooltips/dismiss", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.ledger.sync_state().revision, 1);
}

#[tokio::test(start_paused = true)]
async fn test_home_starts_tooltip_countdown() {
    let (app, state, _) = common::create_test_app().await;

    let body = json_body(send(&app, "GET", "/api/home", None).await).await;
    assert_eq!(body["show_tooltips"], true);
    assert!(state.tooltips.is_pending());

    tokio::time::sleep(state.config.tooltip_dismiss_delay + Duration::from_secs(1)).await;

    assert!(!state.ledger.show_tooltips().await);
    let body = json_body(send(&app, "GET", "/api/home", None).await).await;
    assert_eq!(body["show_tooltips"], false);
}

#[tokio::test]
async fn test_home_rounds_total() {
    let (app, state, _) = common::create_test_app().await;
    for _ in 0..3 {
        state.ledger.log_quick_action("shopping").await.unwrap();
    }

    let body = json_body(send(&app, "GET", "/api/home", None).await).await;

    assert_eq!(body["total_carbon_saved"], 2.1);
    assert_eq!(body["recent_activities"].as_array().unwrap().len(), 3);
    assert_eq!(body["equivalents"]["trees"], 0.1);
}

#[tokio::test]
async fn test_insights() {
    let (app, state, _) = common::create_test_app().await;
    state.ledger.log_quick_action("transport").await.unwrap();
    state.ledger.log_quick_action("home").await.unwrap();
    state.ledger.log_quick_action("transport").await.unwrap();

    let response = send(&app, "GET", "/api/insights", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total_activities"], 3);
    assert_eq!(body["total_carbon_saved"], 6.1);

    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 4);
    assert_eq!(categories[0]["id"], "transport");
    assert_eq!(categories[0]["count"], 2);
    assert_eq!(categories[0]["percentage"], 75);
    assert_eq!(categories[1]["id"], "home");
    assert_eq!(categories[1]["percentage"], 25);
    assert_eq!(categories[2]["count"], 0);
}

#[tokio::test]
async fn test_sync_status() {
    let (app, state, store) = common::create_test_app().await;
    state.ledger.log_quick_action("food").await.unwrap();
    state.ledger.settled().await;

    let body = json_body(send(&app, "GET", "/api/sync", None).await).await;

    assert_eq!(body["status"], "synced");
    assert_eq!(body["revision"], 1);
    assert_eq!(body["persisted_revision"], 1);
    assert!(!store.is_empty());
}
