// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity logging, history and dashboard tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

mod common;

#[tokio::test]
async fn test_log_walk_activity() {
    let (app, state) = common::create_test_app();
    let user_id = common::seed_profile(&state, 0, 0).await;
    let token = common::create_test_jwt(user_id, &state.config.jwt_signing_key);

    let response = app
        .oneshot(common::authed_request(
            "POST",
            "/api/activities",
            &token,
            Some(json!({"type": "walk", "value": 8520, "duration_seconds": 3600})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["credited_coins"], 40);
    assert_eq!(body["new_points"], 40);
    assert_eq!(body["reward"]["coins"], 40.0);
    assert_eq!(body["title"], "绿芽");
    assert_eq!(body["title_changed"], false);

    let profile = state.store.get_profile(user_id).await.unwrap().unwrap();
    assert_eq!(profile.points, 40);
    assert!((profile.carbon_saved - 1.278).abs() < 1e-9);
}

#[tokio::test]
async fn test_log_activity_rejects_negative_value() {
    let (app, state) = common::create_test_app();
    let user_id = common::seed_profile(&state, 0, 0).await;
    let token = common::create_test_jwt(user_id, &state.config.jwt_signing_key);

    let response = app
        .oneshot(common::authed_request(
            "POST",
            "/api/activities",
            &token,
            Some(json!({"type": "bike", "value": -5})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "bad_request");

    let history = state
        .store
        .get_all_user_activities(user_id)
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_huge_value_rejected_and_history_still_loads() {
    let (app, state) = common::create_test_app();
    let user_id = common::seed_profile(&state, 0, 0).await;
    let token = common::create_test_jwt(user_id, &state.config.jwt_signing_key);

    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            "/api/activities",
            &token,
            Some(json!({"type": "bike", "value": 1e308, "duration_seconds": 60})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for uri in ["/api/activities", "/api/dashboard", "/api/badges"] {
        let response = app
            .clone()
            .oneshot(common::authed_request("GET", uri, &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{} should load", uri);
    }

    let profile = state.store.get_profile(user_id).await.unwrap().unwrap();
    assert_eq!(profile.points, 0);
    assert_eq!(profile.carbon_saved, 0.0);
}

#[tokio::test]
async fn test_log_activity_rejects_unknown_type() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(Uuid::new_v4(), &state.config.jwt_signing_key);

    let response = app
        .oneshot(common::authed_request(
            "POST",
            "/api/activities",
            &token,
            Some(json!({"type": "teleport", "value": 1})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activity_history_pages_with_cursor() {
    let (app, state) = common::create_test_app();
    let user_id = common::seed_profile(&state, 0, 0).await;
    let token = common::create_test_jwt(user_id, &state.config.jwt_signing_key);

    for trips in 1..=3 {
        let response = app
            .clone()
            .oneshot(common::authed_request(
                "POST",
                "/api/activities",
                &token,
                Some(json!({"type": "public_transport", "value": trips})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(common::authed_request(
            "GET",
            "/api/activities?limit=2",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = common::body_json(response).await;
    assert_eq!(first["activities"].as_array().unwrap().len(), 2);
    assert_eq!(first["activities"][0]["trips"], 3.0);
    let cursor = first["next_cursor"].as_str().unwrap().to_string();

    let response = app
        .oneshot(common::authed_request(
            "GET",
            &format!("/api/activities?limit=2&cursor={}", cursor),
            &token,
            None,
        ))
        .await
        .unwrap();
    let second = common::body_json(response).await;
    assert_eq!(second["activities"].as_array().unwrap().len(), 1);
    assert_eq!(second["activities"][0]["trips"], 1.0);
    assert!(second["next_cursor"].is_null());
}

#[tokio::test]
async fn test_invalid_cursor_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(Uuid::new_v4(), &state.config.jwt_signing_key);

    let response = app
        .oneshot(common::authed_request(
            "GET",
            "/api/activities?cursor=bm90LWFuLWlk",
            &token,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_limit_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(Uuid::new_v4(), &state.config.jwt_signing_key);

    let response = app
        .oneshot(common::authed_request(
            "GET",
            "/api/activities?limit=0",
            &token,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard_reflects_logged_activity() {
    let (app, state) = common::create_test_app();
    let user_id = common::seed_profile(&state, 0, 0).await;
    let token = common::create_test_jwt(user_id, &state.config.jwt_signing_key);

    app.clone()
        .oneshot(common::authed_request(
            "POST",
            "/api/activities",
            &token,
            Some(json!({"type": "walk", "value": 5000, "duration_seconds": 1800})),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(common::authed_request("GET", "/api/dashboard", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["profile"]["green_coins"], 25);
    assert_eq!(body["recent_activities"].as_array().unwrap().len(), 1);
    assert_eq!(body["today"]["activity_count"], 1);

    let weekly = body["weekly"].as_array().unwrap();
    assert_eq!(weekly.len(), 7);
    assert_eq!(weekly[6]["steps"], 5000);
    assert_eq!(weekly[6]["coins"], 25);
}

#[tokio::test]
async fn test_badges_track_first_activity() {
    let (app, state) = common::create_test_app();
    let user_id = common::seed_profile(&state, 0, 0).await;
    let token = common::create_test_jwt(user_id, &state.config.jwt_signing_key);

    let response = app
        .clone()
        .oneshot(common::authed_request("GET", "/api/badges", &token, None))
        .await
        .unwrap();
    let before = common::body_json(response).await;
    assert_eq!(before["unlocked"], 0);

    app.clone()
        .oneshot(common::authed_request(
            "POST",
            "/api/activities",
            &token,
            Some(json!({"type": "bike", "value": 12.5})),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(common::authed_request("GET", "/api/badges", &token, None))
        .await
        .unwrap();
    let after = common::body_json(response).await;
    assert_eq!(after["unlocked"], 1);

    let badges = after["badges"].as_array().unwrap();
    let newbie = badges.iter().find(|b| b["id"] == "carbon-newbie").unwrap();
    assert_eq!(newbie["unlocked"], true);
    let rider = badges.iter().find(|b| b["id"] == "century-rider").unwrap();
    assert_eq!(rider["current_progress"], 12.5);
    assert_eq!(rider["unlocked"], false);
}

#[tokio::test]
async fn test_reward_preview_is_public() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/rewards/preview?type=walking&value=8520")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["activity_type"], "walk");
    assert_eq!(body["credited_coins"], 40);
    assert_eq!(body["equivalents"]["burgers"], 1);
    assert_eq!(body["equivalents"]["glaciers"], 1);
}
