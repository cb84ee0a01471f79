// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge progress evaluation.
//!
//! A badge pairs a numeric requirement with a selector over the user's
//! cumulative stats. Evaluation is a pure projection: the same snapshot
//! always yields the same progress.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{ActivityRecord, CompletedRoute, Order, UserProfile};

/// Badge grouping shown in the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BadgeCategory {
    /// 减碳
    Carbon,
    /// 助农
    Farming,
    /// 运动
    Exercise,
}

/// Which cumulative stat a badge measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatSelector {
    ActivityCount,
    ProductExchanges,
    BikeDistanceKm,
    WalkSteps,
    TransitTrips,
    CarbonSavedKg,
    RoutesCompleted,
}

impl StatSelector {
    pub fn select(&self, snapshot: &StatSnapshot) -> f64 {
        match self {
            StatSelector::ActivityCount => snapshot.activity_count as f64,
            StatSelector::ProductExchanges => snapshot.product_exchanges as f64,
            StatSelector::BikeDistanceKm => snapshot.bike_distance_km,
            StatSelector::WalkSteps => snapshot.walk_steps,
            StatSelector::TransitTrips => snapshot.transit_trips,
            StatSelector::CarbonSavedKg => snapshot.carbon_saved_kg,
            StatSelector::RoutesCompleted => snapshot.routes_completed as f64,
        }
    }
}

/// Cumulative stats a badge can be measured against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatSnapshot {
    pub activity_count: u64,
    pub product_exchanges: u64,
    pub bike_distance_km: f64,
    pub walk_steps: f64,
    pub transit_trips: f64,
    pub carbon_saved_kg: f64,
    pub routes_completed: u64,
}

impl StatSnapshot {
    /// Build a snapshot from a user's stored history.
    pub fn from_history(
        profile: &UserProfile,
        activities: &[ActivityRecord],
        orders: &[Order],
        routes: &[CompletedRoute],
    ) -> Self {
        let mut snapshot = StatSnapshot {
            activity_count: activities.len() as u64,
            product_exchanges: orders.len() as u64,
            carbon_saved_kg: profile.carbon_saved,
            routes_completed: routes.len() as u64,
            ..Default::default()
        };

        for activity in activities {
            match activity.activity_type.as_str() {
                "walk" => snapshot.walk_steps += activity.steps,
                "bike" => snapshot.bike_distance_km += activity.distance_km,
                "public_transport" => snapshot.transit_trips += activity.trips,
                other => tracing::debug!(activity_type = other, "Unknown activity type in history"),
            }
        }

        snapshot
    }
}

/// Static badge definition.
#[derive(Debug, Clone, Copy)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub tips: &'static str,
    pub category: BadgeCategory,
    pub requirement: f64,
    pub selector: StatSelector,
}

/// Built-in badge catalog.
pub const BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "carbon-newbie",
        name: "低碳新手",
        icon: "🌱",
        description: "完成首次低碳出行记录",
        unit: "次",
        tips: "开启一次步行、骑行或公共交通打卡即可解锁",
        category: BadgeCategory::Carbon,
        requirement: 1.0,
        selector: StatSelector::ActivityCount,
    },
    BadgeDefinition {
        id: "helping-farmers",
        name: "助农大使",
        icon: "🌾",
        description: "兑换5次农产品",
        unit: "次",
        tips: "在积分集市兑换农产品可累积进度",
        category: BadgeCategory::Farming,
        requirement: 5.0,
        selector: StatSelector::ProductExchanges,
    },
    BadgeDefinition {
        id: "century-rider",
        name: "百公里大神",
        icon: "🚴",
        description: "累计骑行达到100公里",
        unit: "km",
        tips: "骑行是低碳出行的最佳方式，继续加油！",
        category: BadgeCategory::Exercise,
        requirement: 100.0,
        selector: StatSelector::BikeDistanceKm,
    },
    BadgeDefinition {
        id: "walker",
        name: "万步达人",
        icon: "👟",
        description: "累计步行10万步",
        unit: "步",
        tips: "每天步行一万步，十天即可解锁",
        category: BadgeCategory::Exercise,
        requirement: 100_000.0,
        selector: StatSelector::WalkSteps,
    },
    BadgeDefinition {
        id: "transit-regular",
        name: "公交常客",
        icon: "🚌",
        description: "乘坐公共交通20次",
        unit: "次",
        tips: "通勤选择公交或地铁即可累积",
        category: BadgeCategory::Carbon,
        requirement: 20.0,
        selector: StatSelector::TransitTrips,
    },
    BadgeDefinition {
        id: "carbon-guardian",
        name: "减碳卫士",
        icon: "🌍",
        description: "累计减碳50千克",
        unit: "kg",
        tips: "坚持低碳出行，减碳量会持续增加",
        category: BadgeCategory::Carbon,
        requirement: 50.0,
        selector: StatSelector::CarbonSavedKg,
    },
    BadgeDefinition {
        id: "route-explorer",
        name: "乡村探索家",
        icon: "🗺️",
        description: "完成3条助农路线",
        unit: "条",
        tips: "在地图上选择一条助农路线并到达终点",
        category: BadgeCategory::Farming,
        requirement: 3.0,
        selector: StatSelector::RoutesCompleted,
    },
];

/// Look up a built-in badge by ID.
pub fn get_badge(id: &str) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|b| b.id == id)
}

/// Progress toward one badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BadgeProgress {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub unit: String,
    pub tips: String,
    pub category: BadgeCategory,
    pub requirement: f64,
    pub current_progress: f64,
    /// 0–100
    pub progress_pct: f64,
    pub unlocked: bool,
}

/// Evaluate one badge against a snapshot.
pub fn evaluate_badge(definition: &BadgeDefinition, snapshot: &StatSnapshot) -> BadgeProgress {
    let current = definition.selector.select(snapshot);
    let (progress_pct, unlocked) = progress(current, definition.requirement);

    BadgeProgress {
        id: definition.id.to_string(),
        name: definition.name.to_string(),
        icon: definition.icon.to_string(),
        description: definition.description.to_string(),
        unit: definition.unit.to_string(),
        tips: definition.tips.to_string(),
        category: definition.category,
        requirement: definition.requirement,
        current_progress: current,
        progress_pct,
        unlocked,
    }
}

/// Evaluate every definition in order.
pub fn evaluate_badges(definitions: &[BadgeDefinition], snapshot: &StatSnapshot) -> Vec<BadgeProgress> {
    definitions
        .iter()
        .map(|d| evaluate_badge(d, snapshot))
        .collect()
}

/// Percentage and unlock flag for a progress value.
///
/// A non-positive requirement counts as already met.
pub fn progress(current: f64, requirement: f64) -> (f64, bool) {
    if requirement <= 0.0 {
        return (100.0, true);
    }
    let pct = (current / requirement).clamp(0.0, 1.0) * 100.0;
    (pct, current >= requirement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchanges(n: u64) -> StatSnapshot {
        StatSnapshot {
            product_exchanges: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_three_of_five() {
        let badge = get_badge("helping-farmers").unwrap();
        let progress = evaluate_badge(badge, &exchanges(3));
        assert_eq!(progress.progress_pct, 60.0);
        assert!(!progress.unlocked);

        let progress = evaluate_badge(badge, &exchanges(5));
        assert_eq!(progress.progress_pct, 100.0);
        assert!(progress.unlocked);
    }

    #[test]
    fn test_progress_is_capped() {
        let badge = get_badge("helping-farmers").unwrap();
        let progress = evaluate_badge(badge, &exchanges(12));
        assert_eq!(progress.progress_pct, 100.0);
        assert!(progress.unlocked);
    }

    #[test]
    fn test_zero_requirement_is_unlocked() {
        assert_eq!(progress(0.0, 0.0), (100.0, true));
        assert_eq!(progress(3.0, -1.0), (100.0, true));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let snapshot = StatSnapshot {
            activity_count: 4,
            product_exchanges: 2,
            bike_distance_km: 42.0,
            walk_steps: 8520.0,
            transit_trips: 3.0,
            carbon_saved_kg: 11.7,
            routes_completed: 1,
        };
        let first = evaluate_badges(BADGES, &snapshot);
        let second = evaluate_badges(BADGES, &snapshot);
        assert_eq!(first, second);
        assert_eq!(first.len(), BADGES.len());

        let rider = first.iter().find(|b| b.id == "century-rider").unwrap();
        assert_eq!(rider.progress_pct, 42.0);
    }

    #[test]
    fn test_unlock_matches_requirement_everywhere() {
        let snapshot = StatSnapshot {
            activity_count: 1,
            carbon_saved_kg: 50.0,
            ..Default::default()
        };
        for badge in evaluate_badges(BADGES, &snapshot) {
            assert_eq!(badge.unlocked, badge.current_progress >= badge.requirement);
        }
    }

    #[test]
    fn test_badge_ids_unique() {
        let mut ids: Vec<_> = BADGES.iter().map(|b| b.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), BADGES.len());
    }
}
