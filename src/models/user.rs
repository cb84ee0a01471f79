//! User profile model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::services::claim::TreeStage;
use crate::services::title::{resolve_title, Title};

/// Profile row (`profiles`), keyed by the auth user's UUID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: Option<String>,
    /// Green coins available to spend
    #[serde(default)]
    pub points: u64,
    /// Cumulative carbon saved (kg)
    #[serde(default)]
    pub carbon_saved: f64,
    #[serde(default)]
    pub calories_burned: u64,
    /// Earned coins waiting to be claimed into `points`
    #[serde(default)]
    pub unclaimed_points: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Fresh profile with zero balances.
    pub fn new(id: Uuid, username: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username,
            points: 0,
            carbon_saved: 0.0,
            calories_burned: 0,
            unclaimed_points: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Title is always derived, never stored.
    pub fn title(&self) -> Title {
        resolve_title(self.carbon_saved)
    }

    pub fn tree_stage(&self) -> TreeStage {
        TreeStage::for_points(self.points)
    }

    pub fn view(&self) -> ProfileView {
        let title = self.title();
        ProfileView {
            id: self.id,
            username: self.username.clone(),
            green_coins: self.points,
            carbon_saved_kg: self.carbon_saved,
            calories_burned: self.calories_burned,
            unclaimed_points: self.unclaimed_points,
            title,
            title_rank: title.rank(),
            tree_stage: self.tree_stage(),
        }
    }
}

/// Profile as returned by the API, with derived fields.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileView {
    pub id: Uuid,
    pub username: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub green_coins: u64,
    pub carbon_saved_kg: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub calories_burned: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub unclaimed_points: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub title: Title,
    pub title_rank: u8,
    pub tree_stage: TreeStage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_derives_title_and_stage() {
        let mut profile = UserProfile::new(Uuid::new_v4(), Some("li".to_string()), Utc::now());
        profile.carbon_saved = 12.0;
        profile.points = 1600;

        let view = profile.view();
        assert_eq!(view.title, Title::Seedling);
        assert_eq!(view.title_rank, 1);
        assert_eq!(view.tree_stage, TreeStage::Sapling);
    }

    #[test]
    fn test_deserialize_sparse_row() {
        let row = serde_json::json!({
            "id": "6f1c2d4e-8a7b-4c3d-9e2f-1a2b3c4d5e6f",
            "username": null,
            "created_at": "2024-07-01T08:00:00+00:00",
            "updated_at": "2024-07-01T08:00:00+00:00"
        });
        let profile: UserProfile = serde_json::from_value(row).unwrap();
        assert_eq!(profile.points, 0);
        assert_eq!(profile.carbon_saved, 0.0);
        assert_eq!(profile.title(), Title::Sprout);
    }
}
