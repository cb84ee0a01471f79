// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, Response},
};
use chrono::Utc;
use ecorural::config::Config;
use ecorural::db::Store;
use ecorural::middleware::auth::create_jwt;
use ecorural::models::{Product, Route, UserProfile};
use ecorural::routes::create_router;
use ecorural::AppState;
use std::sync::Arc;
use uuid::Uuid;

/// Check if a live Supabase project is available via environment variable.
#[allow(dead_code)]
pub fn backend_available() -> bool {
    std::env::var("SUPABASE_TEST_URL").is_ok() && std::env::var("SUPABASE_TEST_KEY").is_ok()
}

/// Skip test with message if no live backend is configured.
#[macro_export]
macro_rules! require_backend {
    () => {
        if !crate::common::backend_available() {
            eprintln!("⚠️  Skipping: SUPABASE_TEST_URL / SUPABASE_TEST_KEY not set");
            return;
        }
    };
}

/// Store pointing at the live test project.
#[allow(dead_code)]
pub fn test_store_live() -> Store {
    let url = std::env::var("SUPABASE_TEST_URL").expect("SUPABASE_TEST_URL");
    let key = std::env::var("SUPABASE_TEST_KEY").expect("SUPABASE_TEST_KEY");
    Store::supabase(&url, key)
}

/// Create a test app over a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(Store::in_memory())
}

/// Create a test app over an offline store; every query fails.
#[allow(dead_code)]
pub fn create_offline_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(Store::new_mock())
}

#[allow(dead_code)]
pub fn create_test_app_with_store(store: Store) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), store));
    (create_router(state.clone()), state)
}

/// Create a session token for a user.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: Uuid, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).expect("JWT should encode")
}

/// Seed a profile with the given balances.
#[allow(dead_code)]
pub async fn seed_profile(state: &AppState, points: u64, unclaimed: u64) -> Uuid {
    let user_id = Uuid::new_v4();
    let mut profile = UserProfile::new(user_id, Some("测试用户".to_string()), Utc::now());
    profile.points = points;
    profile.unclaimed_points = unclaimed;
    state.store.upsert_profile(&profile).await.unwrap();
    user_id
}

#[allow(dead_code)]
pub fn test_product(id: i64, price: u64) -> Product {
    Product {
        id,
        name: format!("农产品 {}", id),
        price,
        category: "蔬菜".to_string(),
        origin: Some("溪口村".to_string()),
        image_url: None,
        description: None,
        is_active: true,
    }
}

#[allow(dead_code)]
pub fn test_route(id: i64, coins: u64) -> Route {
    Route {
        id,
        title: format!("绿道 {}", id),
        description: None,
        distance_km: 6.5,
        coins,
        is_active: true,
    }
}

/// Authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
