// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public catalog routes and the reward preview.

use crate::error::{AppError, Result};
use crate::models::{Product, Route, Story};
use crate::services::reward::{calculate_reward, equivalents, ActivityKind, Equivalents, Reward};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rewards/preview", get(preview_reward))
        .route("/api/products", get(list_products))
        .route("/api/routes", get(list_routes))
        .route("/api/stories", get(list_stories))
}

#[derive(Deserialize)]
struct PreviewQuery {
    #[serde(rename = "type")]
    activity_type: String,
    value: f64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RewardPreview {
    pub activity_type: String,
    pub reward: Reward,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub credited_coins: u64,
    pub equivalents: Equivalents,
}

/// Compute a reward without logging anything.
async fn preview_reward(Query(params): Query<PreviewQuery>) -> Result<Json<RewardPreview>> {
    let kind = ActivityKind::from_parts(&params.activity_type, params.value).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown activity type '{}'", params.activity_type))
    })?;
    let reward = calculate_reward(&kind)?;

    Ok(Json(RewardPreview {
        activity_type: kind.type_name().to_string(),
        reward,
        credited_coins: reward.credited_coins(),
        equivalents: equivalents(reward.calories, reward.carbon_saved_kg),
    }))
}

async fn list_products(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.store.fetch_products().await?))
}

async fn list_routes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Route>>> {
    Ok(Json(state.store.fetch_routes().await?))
}

async fn list_stories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Story>>> {
    Ok(Json(state.store.fetch_stories().await?))
}
