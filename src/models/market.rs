// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Marketplace models: products, orders, inventory and withdrawals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Product listed in the points marketplace (`products`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Product {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub name: String,
    /// Price in green coins
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub price: u64,
    pub category: String,
    /// Village or farm of origin
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Order row to insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub product_id: i64,
    pub quantity: u32,
    pub total_price: u64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Completed purchase (`orders`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Order {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub user_id: Uuid,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub product_id: i64,
    pub quantity: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_price: u64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Items a user owns, one row per product (`user_items`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InventoryItem {
    pub user_id: Uuid,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub product_id: i64,
    pub quantity: u32,
    /// How the item was acquired ("purchase")
    pub acquired_type: String,
    pub acquired_at: DateTime<Utc>,
}

/// Coin cash-out request (`withdrawals`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Withdrawal {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub user_id: Uuid,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub coins: u64,
    pub amount_yuan: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
