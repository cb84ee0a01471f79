// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use ecorural::error::AppError;
use ecorural::services::reward::RewardError;
use tower::ServiceExt;
use uuid::Uuid;

mod common;

async fn status_and_body(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    (status, common::body_json(response).await)
}

#[tokio::test]
async fn test_error_status_mapping() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::NotFound("product 9".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("nope".to_string()), StatusCode::BAD_REQUEST),
        (
            AppError::InsufficientPoints {
                required: 500,
                available: 100,
            },
            StatusCode::CONFLICT,
        ),
        (AppError::Backend("HTTP 503".to_string()), StatusCode::BAD_GATEWAY),
        (
            AppError::Database("offline".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, expected) in cases {
        let (status, body) = status_and_body(err).await;
        assert_eq!(status, expected);
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_internal_details_not_leaked() {
    let (_, body) = status_and_body(AppError::Database("password=hunter2".to_string())).await;
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}

#[test]
fn test_reward_error_is_bad_request() {
    let err: AppError = RewardError::InvalidMagnitude {
        field: "steps",
        value: -1.0,
    }
    .into();
    assert_eq!(err.code(), "bad_request");
}

#[tokio::test]
async fn test_offline_store_surfaces_database_error() {
    let (app, state) = common::create_offline_test_app();
    let token = common::create_test_jwt(Uuid::new_v4(), &state.config.jwt_signing_key);

    let response = app
        .oneshot(common::authed_request("GET", "/api/me", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "database_error");
}
