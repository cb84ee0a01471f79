// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Logged activity model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::reward::{ActivityKind, Reward};

/// Activity row to insert; the backend assigns `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    pub user_id: Uuid,
    /// "walk", "bike" or "public_transport"
    pub activity_type: String,
    pub steps: f64,
    pub distance_km: f64,
    pub trips: f64,
    /// Carbon saved (kg)
    pub carbon_saved: f64,
    pub calories_burned: f64,
    pub coins_earned: f64,
    pub duration_seconds: f64,
    pub created_at: DateTime<Utc>,
}

impl NewActivity {
    /// Build the row for a validated activity and its reward.
    pub fn from_reward(
        user_id: Uuid,
        kind: &ActivityKind,
        reward: &Reward,
        duration_seconds: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (steps, distance_km, trips) = match *kind {
            // Walking distance is estimated at one meter per step.
            ActivityKind::Walk { steps } => (steps, steps / 1000.0, 0.0),
            ActivityKind::Bike { distance_km } => (0.0, distance_km, 0.0),
            ActivityKind::PublicTransport { trips } => (0.0, 0.0, trips),
        };

        Self {
            user_id,
            activity_type: kind.type_name().to_string(),
            steps,
            distance_km,
            trips,
            carbon_saved: reward.carbon_saved_kg,
            calories_burned: reward.calories,
            coins_earned: reward.coins,
            duration_seconds,
            created_at,
        }
    }
}

/// Stored activity record (`user_activities`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub activity_type: String,
    #[serde(default)]
    pub steps: f64,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub trips: f64,
    #[serde(default)]
    pub carbon_saved: f64,
    #[serde(default)]
    pub calories_burned: f64,
    #[serde(default)]
    pub coins_earned: f64,
    #[serde(default)]
    pub duration_seconds: f64,
    pub created_at: DateTime<Utc>,
}
