//! Per-day activity aggregates for the dashboard.
//!
//! One row per user per calendar day, accumulated as activities are logged,
//! so the weekly chart costs one range query instead of a scan of the
//! activity history.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::ActivityRecord;

/// Daily totals (`user_daily_stats`), unique on `(user_id, stats_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyStats {
    pub user_id: Uuid,
    /// Calendar day (UTC), "YYYY-MM-DD"
    pub stats_date: NaiveDate,
    #[serde(default)]
    pub total_steps: f64,
    #[serde(default)]
    pub total_carbon_saved: f64,
    #[serde(default)]
    pub total_calories_burned: f64,
    #[serde(default)]
    pub total_coins_earned: f64,
    #[serde(default)]
    pub activity_count: u32,
}

impl DailyStats {
    pub fn empty(user_id: Uuid, stats_date: NaiveDate) -> Self {
        Self {
            user_id,
            stats_date,
            total_steps: 0.0,
            total_carbon_saved: 0.0,
            total_calories_burned: 0.0,
            total_coins_earned: 0.0,
            activity_count: 0,
        }
    }

    /// Add an activity logged on this row's day.
    pub fn update_from_activity(&mut self, activity: &ActivityRecord) {
        self.total_steps += activity.steps;
        self.total_carbon_saved += activity.carbon_saved;
        self.total_calories_burned += activity.calories_burned;
        self.total_coins_earned += activity.coins_earned;
        self.activity_count += 1;
    }
}

/// One bar of the weekly chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklyDay {
    /// Weekday label (周一 … 周日)
    pub day: String,
    pub date: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub steps: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub coins: u64,
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "周一",
        Weekday::Tue => "周二",
        Weekday::Wed => "周三",
        Weekday::Thu => "周四",
        Weekday::Fri => "周五",
        Weekday::Sat => "周六",
        Weekday::Sun => "周日",
    }
}

/// First day of the seven-day window ending on `today`.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(6)).unwrap_or(today)
}

/// Seven days ending on `today`, oldest first; days without a row are zero.
pub fn weekly_series(today: NaiveDate, rows: &[DailyStats]) -> Vec<WeeklyDay> {
    week_start(today)
        .iter_days()
        .take(7)
        .map(|date| {
            let (steps, coins) = rows
                .iter()
                .filter(|r| r.stats_date == date)
                .fold((0.0, 0.0), |(s, c), r| {
                    (s + r.total_steps, c + r.total_coins_earned)
                });
            WeeklyDay {
                day: weekday_label(date.weekday()).to_string(),
                date,
                steps: steps.max(0.0) as u64,
                coins: coins.max(0.0).floor() as u64,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_activity(steps: f64, coins: f64) -> ActivityRecord {
        ActivityRecord {
            id: 1,
            user_id: Uuid::nil(),
            activity_type: "walk".to_string(),
            steps,
            distance_km: steps / 1000.0,
            trips: 0.0,
            carbon_saved: steps / 1000.0 * 0.15,
            calories_burned: steps / 1000.0 * 30.0,
            coins_earned: coins,
            duration_seconds: 600.0,
            created_at: Utc.with_ymd_and_hms(2024, 7, 3, 9, 0, 0).unwrap(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_update_from_activity_accumulates() {
        let mut stats = DailyStats::empty(Uuid::nil(), date(2024, 7, 3));
        stats.update_from_activity(&make_activity(8520.0, 40.0));
        stats.update_from_activity(&make_activity(2000.0, 10.0));

        assert_eq!(stats.total_steps, 10520.0);
        assert_eq!(stats.total_coins_earned, 50.0);
        assert_eq!(stats.activity_count, 2);
    }

    #[test]
    fn test_weekly_series_fills_gaps() {
        // 2024-07-07 is a Sunday
        let today = date(2024, 7, 7);
        let mut monday = DailyStats::empty(Uuid::nil(), date(2024, 7, 1));
        monday.total_steps = 8500.0;
        monday.total_coins_earned = 40.0;
        let mut sunday = DailyStats::empty(Uuid::nil(), today);
        sunday.total_steps = 1200.0;
        sunday.total_coins_earned = 5.5;

        let series = weekly_series(today, &[sunday, monday]);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].day, "周一");
        assert_eq!(series[0].steps, 8500);
        assert_eq!(series[0].coins, 40);
        assert_eq!(series[3].steps, 0);
        assert_eq!(series[6].day, "周日");
        assert_eq!(series[6].coins, 5);
    }

    #[test]
    fn test_week_start() {
        assert_eq!(week_start(date(2024, 3, 3)), date(2024, 2, 26));
    }
}
