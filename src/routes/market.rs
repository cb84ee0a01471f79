// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace, route completion and withdrawal routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{InventoryItem, Order, Withdrawal};
use crate::services::ledger::{Purchase, RouteCompletion};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/inventory", get(list_inventory))
        .route("/api/routes/{id}/complete", post(complete_route))
        .route("/api/withdrawals", post(create_withdrawal))
}

#[derive(Deserialize, Validate)]
struct CreateOrderRequest {
    product_id: i64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 99))]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<Purchase>> {
    body.validate()?;
    let purchase = state
        .ledger
        .buy_product(user.user_id, body.product_id, body.quantity)
        .await?;
    Ok(Json(purchase))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.store.get_user_orders(user.user_id).await?))
}

async fn list_inventory(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<InventoryItem>>> {
    Ok(Json(state.store.get_user_inventory(user.user_id).await?))
}

/// Finish a route; its coins land in the unclaimed pool.
async fn complete_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(route_id): Path<i64>,
) -> Result<Json<RouteCompletion>> {
    let completion = state.ledger.complete_route(user.user_id, route_id).await?;

    // Keep an animating claim's pool in step with storage.
    state.claims.with_existing(user.user_id, |machine| {
        if machine.is_claiming() {
            machine.deposit(completion.completion.coins_earned);
        }
    });

    Ok(Json(completion))
}

#[derive(Deserialize, Validate)]
struct WithdrawalRequest {
    #[validate(range(min = 1))]
    coins: u64,
}

async fn create_withdrawal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<WithdrawalRequest>,
) -> Result<Json<Withdrawal>> {
    body.validate()?;
    Ok(Json(
        state.ledger.create_withdrawal(user.user_id, body.coins).await?,
    ))
}
