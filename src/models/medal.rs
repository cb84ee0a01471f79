// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Persisted badge state per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::services::badge::BadgeProgress;

/// One user's progress on one badge (`user_medals`), unique on
/// `(user_id, medal_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserMedal {
    pub user_id: Uuid,
    pub medal_id: String,
    pub medal_name: String,
    pub medal_icon: String,
    #[serde(default)]
    pub medal_description: String,
    #[serde(default)]
    pub current_progress: f64,
    pub requirement: f64,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl UserMedal {
    /// Row reflecting an evaluation. Once unlocked, a medal stays unlocked
    /// and keeps its original unlock time.
    pub fn from_progress(
        user_id: Uuid,
        progress: &BadgeProgress,
        previous: Option<&UserMedal>,
        now: DateTime<Utc>,
    ) -> Self {
        let was_unlocked = previous.is_some_and(|m| m.is_unlocked);
        let unlocked_at = match previous.and_then(|m| m.unlocked_at) {
            Some(at) if was_unlocked => Some(at),
            _ if progress.unlocked || was_unlocked => Some(now),
            _ => None,
        };

        Self {
            user_id,
            medal_id: progress.id.clone(),
            medal_name: progress.name.clone(),
            medal_icon: progress.icon.clone(),
            medal_description: progress.description.clone(),
            current_progress: progress.current_progress,
            requirement: progress.requirement,
            is_unlocked: progress.unlocked || was_unlocked,
            unlocked_at,
        }
    }
}
