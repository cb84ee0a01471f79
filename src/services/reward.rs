// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity-to-reward conversion.
//!
//! Converts a completed low-carbon activity into carbon saved (kg),
//! calories burned (kcal) and green coins. The conversion rates are fixed
//! per activity type:
//!
//! | Type            | Carbon (kg)        | Calories          | Coins                 |
//! |-----------------|--------------------|-------------------|-----------------------|
//! | Walk            | steps / 1000 × 0.15 | steps / 1000 × 30 | ⌊steps / 1000⌋ × 5    |
//! | Bike            | km × 0.25          | km × 40           | km × 10               |
//! | Public transport| trips × 0.5        | 0                 | trips × 15            |
//!
//! One activity is capped at 200 000 steps, 1 000 km or 100 trips, and at
//! one day of duration. Larger inputs are rejected rather than credited.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const STEPS_PER_UNIT: f64 = 1000.0;

const WALK_CARBON_PER_UNIT: f64 = 0.15;
const WALK_CALORIES_PER_UNIT: f64 = 30.0;
const WALK_COINS_PER_UNIT: f64 = 5.0;

const BIKE_CARBON_PER_KM: f64 = 0.25;
const BIKE_CALORIES_PER_KM: f64 = 40.0;
const BIKE_COINS_PER_KM: f64 = 10.0;

const TRANSIT_CARBON_PER_TRIP: f64 = 0.5;
const TRANSIT_COINS_PER_TRIP: f64 = 15.0;

/// Largest step count accepted for one activity.
pub const MAX_STEPS: f64 = 200_000.0;
/// Largest ride accepted for one activity.
pub const MAX_DISTANCE_KM: f64 = 1_000.0;
/// Most trips accepted for one activity.
pub const MAX_TRIPS: f64 = 100.0;
/// Longest activity accepted.
pub const MAX_DURATION_SECONDS: f64 = 86_400.0;

/// Calories in one burger, for the "metrics translator" equivalents.
const KCAL_PER_BURGER: f64 = 250.0;
/// At most this many equivalent icons are drawn; the rest is a "+N" label.
pub const MAX_EQUIVALENT_ICONS: u32 = 5;

/// Rejected activity input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RewardError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidMagnitude { field: &'static str, value: f64 },
    #[error("{field} must be at most {max} (got {value})")]
    TooLarge {
        field: &'static str,
        value: f64,
        max: f64,
    },
    #[error("reward for this activity is out of range")]
    OutOfRange,
}

/// A logged activity, one variant per transport mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityKind {
    Walk { steps: f64 },
    Bike { distance_km: f64 },
    PublicTransport { trips: f64 },
}

impl ActivityKind {
    /// Storage name of the activity type (`user_activities.activity_type`).
    pub fn type_name(&self) -> &'static str {
        match self {
            ActivityKind::Walk { .. } => "walk",
            ActivityKind::Bike { .. } => "bike",
            ActivityKind::PublicTransport { .. } => "public_transport",
        }
    }

    /// Build an activity from a type name and a single magnitude.
    pub fn from_parts(type_name: &str, value: f64) -> Option<Self> {
        match type_name {
            "walk" | "walking" => Some(ActivityKind::Walk { steps: value }),
            "bike" | "cycling" => Some(ActivityKind::Bike { distance_km: value }),
            "public_transport" | "transit" => Some(ActivityKind::PublicTransport { trips: value }),
            _ => None,
        }
    }

    fn magnitude(&self) -> (&'static str, f64, f64) {
        match *self {
            ActivityKind::Walk { steps } => ("steps", steps, MAX_STEPS),
            ActivityKind::Bike { distance_km } => ("distance_km", distance_km, MAX_DISTANCE_KM),
            ActivityKind::PublicTransport { trips } => ("trips", trips, MAX_TRIPS),
        }
    }

    /// Reject negative, NaN, infinite and over-cap magnitudes.
    pub fn validate(&self) -> Result<(), RewardError> {
        let (field, value, max) = self.magnitude();
        check_magnitude(field, value, max)
    }
}

/// Rewards earned by a single activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Reward {
    pub carbon_saved_kg: f64,
    pub calories: f64,
    pub coins: f64,
}

impl Reward {
    pub const ZERO: Reward = Reward {
        carbon_saved_kg: 0.0,
        calories: 0.0,
        coins: 0.0,
    };

    /// Coins credited to the integer balance.
    pub fn credited_coins(&self) -> u64 {
        self.coins.floor() as u64
    }

    /// Calories credited to the integer counter.
    pub fn credited_calories(&self) -> u64 {
        self.calories.round() as u64
    }
}

/// Convert an activity into its reward.
pub fn calculate_reward(activity: &ActivityKind) -> Result<Reward, RewardError> {
    activity.validate()?;

    let reward = match *activity {
        ActivityKind::Walk { steps } => {
            let units = steps / STEPS_PER_UNIT;
            Reward {
                carbon_saved_kg: units * WALK_CARBON_PER_UNIT,
                calories: units * WALK_CALORIES_PER_UNIT,
                coins: units.floor() * WALK_COINS_PER_UNIT,
            }
        }
        ActivityKind::Bike { distance_km } => Reward {
            carbon_saved_kg: distance_km * BIKE_CARBON_PER_KM,
            calories: distance_km * BIKE_CALORIES_PER_KM,
            coins: distance_km * BIKE_COINS_PER_KM,
        },
        ActivityKind::PublicTransport { trips } => Reward {
            carbon_saved_kg: trips * TRANSIT_CARBON_PER_TRIP,
            calories: 0.0,
            coins: trips * TRANSIT_COINS_PER_TRIP,
        },
    };

    if !(reward.carbon_saved_kg.is_finite()
        && reward.calories.is_finite()
        && reward.coins.is_finite())
    {
        return Err(RewardError::OutOfRange);
    }

    Ok(reward)
}

/// Walking reward for a step count.
pub fn walk_reward(steps: f64) -> Result<Reward, RewardError> {
    calculate_reward(&ActivityKind::Walk { steps })
}

/// Cycling reward for a distance in kilometers.
pub fn bike_reward(distance_km: f64) -> Result<Reward, RewardError> {
    calculate_reward(&ActivityKind::Bike { distance_km })
}

/// Public transport reward for a number of trips.
pub fn transit_reward(trips: f64) -> Result<Reward, RewardError> {
    calculate_reward(&ActivityKind::PublicTransport { trips })
}

/// Durations follow the same rule as magnitudes.
pub fn check_duration(duration_seconds: f64) -> Result<(), RewardError> {
    check_magnitude("duration_seconds", duration_seconds, MAX_DURATION_SECONDS)
}

fn check_magnitude(field: &'static str, value: f64, max: f64) -> Result<(), RewardError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(RewardError::InvalidMagnitude { field, value });
    }
    if value > max {
        return Err(RewardError::TooLarge { field, value, max });
    }
    Ok(())
}

/// Everyday equivalents of a reward: burgers burned and glaciers spared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Equivalents {
    pub burgers: u32,
    pub glaciers: u32,
    /// Icons to draw for each count (capped); the remainder is `count - icons`.
    pub burger_icons: u32,
    pub glacier_icons: u32,
}

/// One burger per 250 kcal, one glacier per kg of CO₂, both rounded.
pub fn equivalents(calories: f64, carbon_kg: f64) -> Equivalents {
    let burgers = (calories.max(0.0) / KCAL_PER_BURGER).round() as u32;
    let glaciers = carbon_kg.max(0.0).round() as u32;
    Equivalents {
        burgers,
        glaciers,
        burger_icons: burgers.min(MAX_EQUIVALENT_ICONS),
        glacier_icons: glaciers.min(MAX_EQUIVALENT_ICONS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_walk_8520_steps() {
        let reward = walk_reward(8520.0).unwrap();
        assert!(approx(reward.carbon_saved_kg, 1.278));
        assert!(approx(reward.calories, 255.6));
        assert_eq!(reward.coins, 40.0);
        assert_eq!(reward.credited_coins(), 40);
        assert_eq!(reward.credited_calories(), 256);
    }

    #[test]
    fn test_walk_formula_over_range() {
        for steps in (0..50_000u32).step_by(337) {
            let steps = steps as f64;
            let reward = walk_reward(steps).unwrap();
            assert_eq!(reward.carbon_saved_kg, (steps / 1000.0) * 0.15);
            assert_eq!(reward.coins, (steps / 1000.0).floor() * 5.0);
        }
    }

    #[test]
    fn test_walk_below_one_thousand_steps_earns_no_coins() {
        let reward = walk_reward(999.0).unwrap();
        assert_eq!(reward.coins, 0.0);
        assert!(reward.carbon_saved_kg > 0.0);
    }

    #[test]
    fn test_bike_coins_not_floored() {
        let reward = bike_reward(4.25).unwrap();
        assert_eq!(reward.coins, 42.5);
        assert_eq!(reward.credited_coins(), 42);
        assert!(approx(reward.carbon_saved_kg, 1.0625));
        assert!(approx(reward.calories, 170.0));
    }

    #[test]
    fn test_bike_coins_monotonic() {
        let mut previous = 0.0;
        for tenths in 0..500 {
            let km = tenths as f64 / 10.0;
            let coins = bike_reward(km).unwrap().coins;
            assert_eq!(coins, km * 10.0);
            assert!(coins >= previous);
            previous = coins;
        }
    }

    #[test]
    fn test_transit_has_no_calories() {
        let reward = transit_reward(2.0).unwrap();
        assert_eq!(reward.carbon_saved_kg, 1.0);
        assert_eq!(reward.calories, 0.0);
        assert_eq!(reward.coins, 30.0);
    }

    #[test]
    fn test_zero_magnitude_is_all_zero() {
        assert_eq!(walk_reward(0.0).unwrap(), Reward::ZERO);
        assert_eq!(bike_reward(0.0).unwrap(), Reward::ZERO);
        assert_eq!(transit_reward(0.0).unwrap(), Reward::ZERO);
    }

    #[test]
    fn test_negative_and_non_finite_rejected() {
        assert!(matches!(
            walk_reward(-1.0),
            Err(RewardError::InvalidMagnitude { field: "steps", .. })
        ));
        assert!(bike_reward(f64::NAN).is_err());
        assert!(transit_reward(f64::INFINITY).is_err());
        assert!(check_duration(-5.0).is_err());
        assert!(check_duration(0.0).is_ok());
    }

    #[test]
    fn test_huge_magnitudes_rejected() {
        assert!(matches!(
            bike_reward(1e308),
            Err(RewardError::TooLarge { field: "distance_km", .. })
        ));
        assert!(walk_reward(1e308).is_err());
        assert!(transit_reward(f64::MAX).is_err());
        assert!(check_duration(1e308).is_err());

        // The caps themselves are accepted and stay finite
        let reward = bike_reward(MAX_DISTANCE_KM).unwrap();
        assert_eq!(reward.coins, 10_000.0);
        assert!(walk_reward(MAX_STEPS).unwrap().calories.is_finite());
        assert_eq!(transit_reward(MAX_TRIPS).unwrap().coins, 1500.0);
        assert!(check_duration(MAX_DURATION_SECONDS).is_ok());
    }

    #[test]
    fn test_activity_kind_serde_tagging() {
        let kind: ActivityKind =
            serde_json::from_str(r#"{"type":"public_transport","trips":3}"#).unwrap();
        assert_eq!(kind, ActivityKind::PublicTransport { trips: 3.0 });
        assert_eq!(kind.type_name(), "public_transport");
        assert_eq!(
            ActivityKind::from_parts("cycling", 12.0),
            Some(ActivityKind::Bike { distance_km: 12.0 })
        );
        assert_eq!(ActivityKind::from_parts("swim", 1.0), None);
    }

    #[test]
    fn test_equivalents() {
        let eq = equivalents(255.6, 1.278);
        assert_eq!(eq.burgers, 1);
        assert_eq!(eq.glaciers, 1);

        let eq = equivalents(2600.0, 7.6);
        assert_eq!(eq.burgers, 10);
        assert_eq!(eq.burger_icons, MAX_EQUIVALENT_ICONS);
        assert_eq!(eq.glaciers, 8);
        assert_eq!(eq.glacier_icons, MAX_EQUIVALENT_ICONS);
    }
}
