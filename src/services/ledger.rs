// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Balance-changing workflows.
//!
//! Each workflow reads the current profile, applies the pure rules from the
//! reward, title and badge services, and writes the results back:
//! 1. Log an activity and credit its reward
//! 2. Buy a product with green coins
//! 3. Complete a route into the unclaimed pool
//! 4. Request a coin withdrawal
//!
//! Profile writes are read-modify-write; the backend offers no transaction,
//! so two concurrent writers to one profile race and the last one wins.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::stats::weekly_series;
use crate::models::{
    ActivityRecord, CompletedRoute, DailyStats, InventoryItem, NewActivity, NewOrder, Order,
    ProfileView, UserMedal, UserProfile, WeeklyDay, Withdrawal,
};
use crate::services::badge::{evaluate_badges, BadgeProgress, StatSnapshot, BADGES};
use crate::services::reward::{
    calculate_reward, check_duration, equivalents, ActivityKind, Equivalents, Reward,
};
use crate::services::title::Title;

/// Coins per yuan when cashing out.
pub const COINS_PER_YUAN: u64 = 200;
/// Smallest withdrawal, in yuan.
pub const MIN_WITHDRAWAL_YUAN: u64 = 10;
/// Recent activities shown on the dashboard.
pub const DASHBOARD_RECENT_LIMIT: u32 = 10;

/// Result of logging one activity.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoggedActivity {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub activity_id: i64,
    pub reward: Reward,
    pub equivalents: Equivalents,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub credited_coins: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub new_points: u64,
    pub new_carbon_saved: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub title: Title,
    /// The new carbon total crossed into a higher title.
    pub title_changed: bool,
}

/// Result of a purchase.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Purchase {
    pub order: Order,
    pub item: InventoryItem,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub remaining_points: u64,
}

/// Result of completing a route.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RouteCompletion {
    pub completion: CompletedRoute,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub unclaimed_points: u64,
}

/// Everything the home screen shows, fetched in one round.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Dashboard {
    pub profile: ProfileView,
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub recent_activities: Vec<ActivityRecord>,
    pub medals: Vec<UserMedal>,
    pub today: Option<DailyStats>,
    pub weekly: Vec<WeeklyDay>,
}

/// Balance-changing workflows over a [`Store`].
#[derive(Clone)]
pub struct Ledger {
    store: Store,
}

impl Ledger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Load a profile, creating an empty one on first use.
    pub async fn ensure_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        if let Some(profile) = self.store.get_profile(user_id).await? {
            return Ok(profile);
        }
        tracing::info!(%user_id, "Creating profile");
        self.store
            .upsert_profile(&UserProfile::new(user_id, None, Utc::now()))
            .await
    }

    async fn require_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {}", user_id)))
    }

    /// Validate, reward and persist an activity.
    ///
    /// The profile is credited first, then the activity row is inserted. If
    /// the insert fails the previous profile is written back, so history
    /// never holds an activity that was not credited.
    pub async fn log_activity(
        &self,
        user_id: Uuid,
        kind: ActivityKind,
        duration_seconds: f64,
    ) -> Result<LoggedActivity> {
        check_duration(duration_seconds)?;
        let reward = calculate_reward(&kind)?;
        let now = Utc::now();

        let before = self.ensure_profile(user_id).await?;
        let title_before = before.title();

        let credited = reward.credited_coins();
        let mut profile = before.clone();
        profile.points = profile.points.saturating_add(credited);
        profile.carbon_saved += reward.carbon_saved_kg;
        profile.calories_burned = profile
            .calories_burned
            .saturating_add(reward.credited_calories());
        profile.updated_at = now;
        let profile = self.store.upsert_profile(&profile).await?;

        let row = NewActivity::from_reward(user_id, &kind, &reward, duration_seconds, now);
        let activity = match self.store.insert_activity(&row).await {
            Ok(activity) => activity,
            Err(e) => {
                tracing::error!(%user_id, error = %e, "Failed to store activity; restoring profile");
                let mut restored = before;
                restored.updated_at = Utc::now();
                if let Err(restore_err) = self.store.upsert_profile(&restored).await {
                    tracing::error!(%user_id, error = %restore_err, "Failed to restore profile");
                }
                return Err(e);
            }
        };

        // Daily aggregate is best effort.
        if let Err(e) = self.accumulate_daily_stats(&activity).await {
            tracing::warn!(error = %e, activity_id = activity.id, "Failed to update daily stats");
        }

        let title = profile.title();
        let title_changed = title != title_before;
        tracing::info!(
            %user_id,
            activity_id = activity.id,
            activity_type = kind.type_name(),
            coins = credited,
            carbon_kg = reward.carbon_saved_kg,
            title_changed,
            "Activity logged"
        );

        Ok(LoggedActivity {
            activity_id: activity.id,
            reward,
            equivalents: equivalents(reward.calories, reward.carbon_saved_kg),
            credited_coins: credited,
            new_points: profile.points,
            new_carbon_saved: profile.carbon_saved,
            title,
            title_changed,
        })
    }

    async fn accumulate_daily_stats(&self, activity: &ActivityRecord) -> Result<()> {
        let date = activity.created_at.date_naive();
        let mut stats = self
            .store
            .get_daily_stats(activity.user_id, date)
            .await?
            .unwrap_or_else(|| DailyStats::empty(activity.user_id, date));
        stats.update_from_activity(activity);
        self.store.upsert_daily_stats(&stats).await
    }

    /// Spend green coins on a product.
    pub async fn buy_product(
        &self,
        user_id: Uuid,
        product_id: i64,
        quantity: u32,
    ) -> Result<Purchase> {
        if quantity == 0 {
            return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
        }

        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))?;
        if !product.is_active {
            return Err(AppError::BadRequest(format!(
                "product {} is no longer available",
                product_id
            )));
        }

        let total = product
            .price
            .checked_mul(u64::from(quantity))
            .ok_or_else(|| AppError::BadRequest("order total too large".to_string()))?;

        let mut profile = self.require_profile(user_id).await?;
        if profile.points < total {
            tracing::info!(%user_id, product_id, total, available = profile.points, "Purchase declined");
            return Err(AppError::InsufficientPoints {
                required: total,
                available: profile.points,
            });
        }

        let now = Utc::now();
        profile.points -= total;
        profile.updated_at = now;
        let profile = self.store.upsert_profile(&profile).await?;

        let order = self
            .store
            .insert_order(&NewOrder {
                user_id,
                product_id,
                quantity,
                total_price: total,
                status: "completed".to_string(),
                created_at: now,
            })
            .await?;

        let mut item = self
            .store
            .get_inventory_item(user_id, product_id)
            .await?
            .unwrap_or_else(|| InventoryItem {
                user_id,
                product_id,
                quantity: 0,
                acquired_type: "purchase".to_string(),
                acquired_at: now,
            });
        item.quantity = item.quantity.saturating_add(quantity);
        item.acquired_at = now;
        self.store.upsert_inventory_item(&item).await?;

        tracing::info!(%user_id, product_id, quantity, total, order_id = order.id, "Product purchased");

        Ok(Purchase {
            order,
            item,
            remaining_points: profile.points,
        })
    }

    /// Record a route as finished and deposit its coins into the unclaimed
    /// pool. Each route pays out once per user.
    pub async fn complete_route(&self, user_id: Uuid, route_id: i64) -> Result<RouteCompletion> {
        let route = self
            .store
            .get_route(route_id)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| AppError::NotFound(format!("route {}", route_id)))?;

        let done = self.store.get_completed_routes(user_id).await?;
        if done.iter().any(|c| c.route_id == route_id) {
            return Err(AppError::BadRequest(format!(
                "route {} already completed",
                route_id
            )));
        }

        let now = Utc::now();
        let mut profile = self.ensure_profile(user_id).await?;
        profile.unclaimed_points = profile.unclaimed_points.saturating_add(route.coins);
        profile.updated_at = now;
        let profile = self.store.upsert_profile(&profile).await?;

        let completion = self
            .store
            .insert_completed_route(user_id, route_id, route.coins, now)
            .await?;

        tracing::info!(%user_id, route_id, coins = route.coins, "Route completed");

        Ok(RouteCompletion {
            completion,
            unclaimed_points: profile.unclaimed_points,
        })
    }

    /// Convert coins into a pending cash withdrawal.
    pub async fn create_withdrawal(&self, user_id: Uuid, coins: u64) -> Result<Withdrawal> {
        let minimum = MIN_WITHDRAWAL_YUAN * COINS_PER_YUAN;
        if coins < minimum {
            return Err(AppError::BadRequest(format!(
                "minimum withdrawal is {} coins",
                minimum
            )));
        }

        let mut profile = self.require_profile(user_id).await?;
        if profile.points < coins {
            return Err(AppError::InsufficientPoints {
                required: coins,
                available: profile.points,
            });
        }

        let now = Utc::now();
        profile.points -= coins;
        profile.updated_at = now;
        self.store.upsert_profile(&profile).await?;

        let yuan = coins as f64 / COINS_PER_YUAN as f64;
        let withdrawal = self
            .store
            .insert_withdrawal(user_id, coins, yuan, now)
            .await?;

        tracing::info!(%user_id, coins, yuan, withdrawal_id = withdrawal.id, "Withdrawal requested");
        Ok(withdrawal)
    }

    /// Profile, recent activities, medals and the week's chart.
    pub async fn dashboard(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Dashboard> {
        let today = now.date_naive();
        let (profile, recent_activities, medals, today_stats, week) = futures_util::try_join!(
            self.ensure_profile(user_id),
            self.store
                .get_user_activities(user_id, DASHBOARD_RECENT_LIMIT, None),
            self.store.get_user_medals(user_id),
            self.store.get_daily_stats(user_id, today),
            self.store.get_weekly_stats(user_id, today),
        )?;

        Ok(Dashboard {
            profile: profile.view(),
            recent_activities,
            medals,
            today: today_stats,
            weekly: weekly_series(today, &week),
        })
    }

    /// Evaluate every badge and write changed progress back.
    pub async fn sync_badges(&self, user_id: Uuid) -> Result<Vec<BadgeProgress>> {
        let (profile, activities, orders, routes, stored) = futures_util::try_join!(
            self.ensure_profile(user_id),
            self.store.get_all_user_activities(user_id),
            self.store.get_user_orders(user_id),
            self.store.get_completed_routes(user_id),
            self.store.get_user_medals(user_id),
        )?;

        let snapshot = StatSnapshot::from_history(&profile, &activities, &orders, &routes);
        let evaluated = evaluate_badges(BADGES, &snapshot);
        let now = Utc::now();

        let mut results = Vec::with_capacity(evaluated.len());
        for mut badge in evaluated {
            let previous = stored.iter().find(|m| m.medal_id == badge.id);
            let next = UserMedal::from_progress(user_id, &badge, previous, now);

            match previous {
                // New badge, or its definition changed: write the whole row.
                None => self.store.upsert_medal(&next).await?,
                Some(p) if p.requirement != next.requirement => {
                    self.store.upsert_medal(&next).await?
                }
                Some(p) => {
                    if p.current_progress != next.current_progress {
                        self.store
                            .update_medal_progress(user_id, &next.medal_id, next.current_progress)
                            .await?;
                    }
                    if next.is_unlocked && !p.is_unlocked {
                        self.store.unlock_medal(user_id, &next.medal_id, now).await?;
                    }
                }
            }
            if next.is_unlocked && !previous.is_some_and(|p| p.is_unlocked) {
                tracing::info!(%user_id, medal_id = %next.medal_id, "Medal unlocked");
            }

            // A medal unlocked earlier stays unlocked.
            badge.unlocked = next.is_unlocked;
            results.push(badge);
        }

        Ok(results)
    }
}
