// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase integration tests.
//!
//! These tests need a live project with the EcoRural schema applied.
//! Set SUPABASE_TEST_URL and SUPABASE_TEST_KEY (service role) to run them.
//!
//! Every test works under a fresh user UUID, so runs do not interfere.

use chrono::Utc;
use ecorural::models::UserProfile;
use ecorural::services::ledger::Ledger;
use ecorural::services::reward::ActivityKind;
use uuid::Uuid;

mod common;
use common::test_store_live;

#[tokio::test]
async fn test_profile_round_trip() {
    require_backend!();

    let store = test_store_live();
    let user_id = Uuid::new_v4();

    let before = store.get_profile(user_id).await.unwrap();
    assert!(before.is_none(), "Profile should not exist before creation");

    let mut profile = UserProfile::new(user_id, Some("集成测试".to_string()), Utc::now());
    profile.points = 321;
    store.upsert_profile(&profile).await.unwrap();

    let fetched = store.get_profile(user_id).await.unwrap().unwrap();
    assert_eq!(fetched.points, 321);
    assert_eq!(fetched.username.as_deref(), Some("集成测试"));
}

#[tokio::test]
async fn test_log_activity_against_backend() {
    require_backend!();

    let ledger = Ledger::new(test_store_live());
    let user_id = Uuid::new_v4();

    let logged = ledger
        .log_activity(user_id, ActivityKind::Walk { steps: 8520.0 }, 3600.0)
        .await
        .unwrap();
    assert_eq!(logged.credited_coins, 40);

    let history = ledger
        .store()
        .get_user_activities(user_id, 10, None)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].activity_type, "walk");

    let today = ledger
        .store()
        .get_daily_stats(user_id, Utc::now().date_naive())
        .await
        .unwrap()
        .expect("daily stats row");
    assert_eq!(today.activity_count, 1);
}

#[tokio::test]
async fn test_claim_points_against_backend() {
    require_backend!();

    let store = test_store_live();
    let user_id = Uuid::new_v4();
    let mut profile = UserProfile::new(user_id, None, Utc::now());
    profile.points = 1250;
    profile.unclaimed_points = 50;
    store.upsert_profile(&profile).await.unwrap();

    let updated = store.claim_points(user_id, 50).await.unwrap();
    assert_eq!(updated.points, 1300);
    assert_eq!(updated.unclaimed_points, 0);
}
