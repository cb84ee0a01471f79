// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data-access layer with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (balances, carbon and calorie totals)
//! - Activities and per-day aggregates
//! - Products, orders, inventory and withdrawals
//! - Medals, routes and stories
//!
//! The same typed code runs over the hosted PostgREST backend or the
//! in-process tables, so integration tests exercise the real queries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::{Config, StoreBackend};
use crate::db::memory::MemoryTables;
use crate::db::postgrest::PostgrestClient;
use crate::db::query::{Direction, Query};
use crate::db::tables;
use crate::error::AppError;
use crate::models::stats::week_start;
use crate::models::{
    ActivityRecord, CompletedRoute, DailyStats, InventoryItem, NewActivity, NewOrder, Order,
    Product, Route, Story, UserMedal, UserProfile, Withdrawal,
};

#[derive(Clone)]
enum Backend {
    Rest(PostgrestClient),
    Memory(MemoryTables),
}

/// Database client.
#[derive(Clone)]
pub struct Store {
    backend: Option<Backend>,
}

fn encode<T: Serialize>(row: &T) -> Result<Value, AppError> {
    serde_json::to_value(row).map_err(|e| AppError::Database(format!("Row encode error: {}", e)))
}

fn decode<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, AppError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| AppError::Database(format!("Row decode error: {}", e)))
        })
        .collect()
}

fn decode_one<T: DeserializeOwned>(rows: Vec<Value>) -> Result<T, AppError> {
    decode(rows)?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Database("No row returned".to_string()))
}

fn decode_first<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Option<T>, AppError> {
    Ok(decode(rows)?.into_iter().next())
}

impl Store {
    /// Connect to a hosted Supabase project.
    pub fn supabase(project_url: &str, api_key: String) -> Self {
        tracing::info!(url = project_url, "Using Supabase store");
        Self {
            backend: Some(Backend::Rest(PostgrestClient::new(project_url, api_key))),
        }
    }

    /// Fresh in-process store.
    pub fn in_memory() -> Self {
        Self {
            backend: Some(Backend::Memory(MemoryTables::new())),
        }
    }

    /// Create a disconnected store for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { backend: None }
    }

    /// Build the store selected by configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        match config.store_backend {
            StoreBackend::Memory => {
                tracing::info!("Using in-memory store; data is lost on restart");
                Ok(Self::in_memory())
            }
            StoreBackend::Supabase => {
                let (Some(url), Some(key)) = (&config.supabase_url, &config.supabase_key) else {
                    return Err(AppError::Database(
                        "Supabase backend needs SUPABASE_URL and SUPABASE_KEY".to_string(),
                    ));
                };
                Ok(Self::supabase(url, key.clone()))
            }
        }
    }

    /// In-process tables, when that backend is in use.
    #[cfg(test)]
    pub(crate) fn memory_tables(&self) -> Option<&MemoryTables> {
        match &self.backend {
            Some(Backend::Memory(tables)) => Some(tables),
            _ => None,
        }
    }

    /// Helper to get the backend or return an error if offline.
    fn backend(&self) -> Result<&Backend, AppError> {
        self.backend
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Generic Row Operations ──────────────────────────────────

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, AppError> {
        match self.backend()? {
            Backend::Rest(client) => client.select(table, query).await,
            Backend::Memory(tables) => Ok(tables.select(table, query)),
        }
    }

    async fn insert(&self, table: &str, row: &Value) -> Result<Vec<Value>, AppError> {
        match self.backend()? {
            Backend::Rest(client) => client.insert(table, row).await,
            Backend::Memory(tables) => tables
                .insert(table, row)
                .map(|r| vec![r])
                .ok_or_else(|| AppError::Database("Row must be a JSON object".to_string())),
        }
    }

    async fn upsert(
        &self,
        table: &str,
        row: &Value,
        on_conflict: &[&str],
    ) -> Result<Vec<Value>, AppError> {
        match self.backend()? {
            Backend::Rest(client) => client.upsert(table, row, on_conflict).await,
            Backend::Memory(tables) => tables
                .upsert(table, row, on_conflict)
                .map(|r| vec![r])
                .ok_or_else(|| AppError::Database("Row must be a JSON object".to_string())),
        }
    }

    async fn update(&self, table: &str, query: &Query, patch: &Value) -> Result<Vec<Value>, AppError> {
        match self.backend()? {
            Backend::Rest(client) => client.update(table, query, patch).await,
            Backend::Memory(tables) => Ok(tables.update(table, query, patch)),
        }
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a user's profile.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let query = Query::new().eq("id", user_id.to_string()).limit(1);
        decode_first(self.select(tables::PROFILES, &query).await?)
    }

    /// Create or update a profile.
    pub async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile, AppError> {
        decode_one(
            self.upsert(tables::PROFILES, &encode(profile)?, &["id"])
                .await?,
        )
    }

    /// Move up to `amount` coins from the unclaimed pool into the balance.
    ///
    /// Read-modify-write; concurrent writers to the same profile race and
    /// the last one wins.
    pub async fn claim_points(&self, user_id: Uuid, amount: u64) -> Result<UserProfile, AppError> {
        let mut profile = self
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {}", user_id)))?;

        let moved = amount.min(profile.unclaimed_points);
        profile.unclaimed_points -= moved;
        profile.points = profile.points.saturating_add(moved);
        profile.updated_at = Utc::now();

        self.upsert_profile(&profile).await
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Insert a logged activity.
    pub async fn insert_activity(&self, activity: &NewActivity) -> Result<ActivityRecord, AppError> {
        decode_one(
            self.insert(tables::USER_ACTIVITIES, &encode(activity)?)
                .await?,
        )
    }

    /// Get a page of activities, newest first, with ids below `before_id`.
    pub async fn get_user_activities(
        &self,
        user_id: Uuid,
        limit: u32,
        before_id: Option<i64>,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        let mut query = Query::new().eq("user_id", user_id.to_string());
        if let Some(id) = before_id {
            query = query.lt("id", id);
        }
        let query = query.order_by("id", Direction::Descending).limit(limit);

        decode(self.select(tables::USER_ACTIVITIES, &query).await?)
    }

    /// Get every activity a user has logged.
    pub async fn get_all_user_activities(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .order_by("id", Direction::Ascending);
        decode(self.select(tables::USER_ACTIVITIES, &query).await?)
    }

    // ─── Daily Stats Operations ──────────────────────────────────

    /// Get one day's aggregate.
    pub async fn get_daily_stats(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailyStats>, AppError> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .eq("stats_date", date.to_string())
            .limit(1);
        decode_first(self.select(tables::USER_DAILY_STATS, &query).await?)
    }

    /// Write one day's aggregate.
    pub async fn upsert_daily_stats(&self, stats: &DailyStats) -> Result<(), AppError> {
        self.upsert(
            tables::USER_DAILY_STATS,
            &encode(stats)?,
            &["user_id", "stats_date"],
        )
        .await?;
        Ok(())
    }

    /// Aggregates for the seven days ending `today`, oldest first.
    pub async fn get_weekly_stats(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<DailyStats>, AppError> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .gte("stats_date", week_start(today).to_string())
            .order_by("stats_date", Direction::Ascending);
        decode(self.select(tables::USER_DAILY_STATS, &query).await?)
    }

    // ─── Marketplace Operations ──────────────────────────────────

    /// Active products in catalog order.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, AppError> {
        let query = Query::new()
            .eq("is_active", true)
            .order_by("id", Direction::Ascending);
        decode(self.select(tables::PRODUCTS, &query).await?)
    }

    /// Get a product by id, active or not.
    pub async fn get_product(&self, product_id: i64) -> Result<Option<Product>, AppError> {
        let query = Query::new().eq("id", product_id).limit(1);
        decode_first(self.select(tables::PRODUCTS, &query).await?)
    }

    /// Create or replace a catalog product.
    pub async fn upsert_product(&self, product: &Product) -> Result<Product, AppError> {
        decode_one(
            self.upsert(tables::PRODUCTS, &encode(product)?, &["id"])
                .await?,
        )
    }

    /// Record an order.
    pub async fn insert_order(&self, order: &NewOrder) -> Result<Order, AppError> {
        decode_one(self.insert(tables::ORDERS, &encode(order)?).await?)
    }

    /// A user's orders, newest first.
    pub async fn get_user_orders(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .order_by("id", Direction::Descending);
        decode(self.select(tables::ORDERS, &query).await?)
    }

    /// Get the inventory row for one product.
    pub async fn get_inventory_item(
        &self,
        user_id: Uuid,
        product_id: i64,
    ) -> Result<Option<InventoryItem>, AppError> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .eq("product_id", product_id)
            .limit(1);
        decode_first(self.select(tables::USER_ITEMS, &query).await?)
    }

    /// Write an inventory row.
    pub async fn upsert_inventory_item(&self, item: &InventoryItem) -> Result<(), AppError> {
        self.upsert(
            tables::USER_ITEMS,
            &encode(item)?,
            &["user_id", "product_id"],
        )
        .await?;
        Ok(())
    }

    /// Everything a user owns, most recently acquired first.
    pub async fn get_user_inventory(&self, user_id: Uuid) -> Result<Vec<InventoryItem>, AppError> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .order_by("acquired_at", Direction::Descending);
        decode(self.select(tables::USER_ITEMS, &query).await?)
    }

    /// Record a pending withdrawal.
    pub async fn insert_withdrawal(
        &self,
        user_id: Uuid,
        coins: u64,
        amount_yuan: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Withdrawal, AppError> {
        let row = json!({
            "user_id": user_id,
            "coins": coins,
            "amount_yuan": amount_yuan,
            "status": "pending",
            "created_at": created_at,
        });
        decode_one(self.insert(tables::WITHDRAWALS, &row).await?)
    }

    // ─── Medal Operations ────────────────────────────────────────

    /// A user's stored medals.
    pub async fn get_user_medals(&self, user_id: Uuid) -> Result<Vec<UserMedal>, AppError> {
        let query = Query::new().eq("user_id", user_id.to_string());
        decode(self.select(tables::USER_MEDALS, &query).await?)
    }

    /// Write a medal row.
    pub async fn upsert_medal(&self, medal: &UserMedal) -> Result<(), AppError> {
        self.upsert(
            tables::USER_MEDALS,
            &encode(medal)?,
            &["user_id", "medal_id"],
        )
        .await?;
        Ok(())
    }

    /// Set progress on an existing medal row.
    pub async fn update_medal_progress(
        &self,
        user_id: Uuid,
        medal_id: &str,
        progress: f64,
    ) -> Result<(), AppError> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .eq("medal_id", medal_id.to_string());
        self.update(
            tables::USER_MEDALS,
            &query,
            &json!({ "current_progress": progress }),
        )
        .await?;
        Ok(())
    }

    /// Mark an existing medal row unlocked.
    pub async fn unlock_medal(
        &self,
        user_id: Uuid,
        medal_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .eq("medal_id", medal_id.to_string());
        self.update(
            tables::USER_MEDALS,
            &query,
            &json!({ "is_unlocked": true, "unlocked_at": at }),
        )
        .await?;
        Ok(())
    }

    // ─── Route & Story Operations ────────────────────────────────

    /// Active routes in catalog order.
    pub async fn fetch_routes(&self) -> Result<Vec<Route>, AppError> {
        let query = Query::new()
            .eq("is_active", true)
            .order_by("id", Direction::Ascending);
        decode(self.select(tables::ROUTES, &query).await?)
    }

    pub async fn get_route(&self, route_id: i64) -> Result<Option<Route>, AppError> {
        let query = Query::new().eq("id", route_id).limit(1);
        decode_first(self.select(tables::ROUTES, &query).await?)
    }

    pub async fn upsert_route(&self, route: &Route) -> Result<Route, AppError> {
        decode_one(self.upsert(tables::ROUTES, &encode(route)?, &["id"]).await?)
    }

    /// Record a route completion.
    pub async fn insert_completed_route(
        &self,
        user_id: Uuid,
        route_id: i64,
        coins_earned: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletedRoute, AppError> {
        let row = json!({
            "user_id": user_id,
            "route_id": route_id,
            "coins_earned": coins_earned,
            "completed_at": completed_at,
        });
        decode_one(self.insert(tables::USER_ROUTES, &row).await?)
    }

    /// Routes a user has finished, newest first.
    pub async fn get_completed_routes(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CompletedRoute>, AppError> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .order_by("id", Direction::Descending);
        decode(self.select(tables::USER_ROUTES, &query).await?)
    }

    /// Farmer stories, newest first.
    pub async fn fetch_stories(&self) -> Result<Vec<Story>, AppError> {
        let query = Query::new().order_by("created_at", Direction::Descending);
        decode(self.select(tables::STORIES, &query).await?)
    }

    pub async fn upsert_story(&self, story: &Story) -> Result<Story, AppError> {
        decode_one(self.upsert(tables::STORIES, &encode(story)?, &["id"]).await?)
    }
}
