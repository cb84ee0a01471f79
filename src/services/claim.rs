// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carbon-tree claim state machine.
//!
//! Tracks a user's claimed point total and their pending (unclaimed) pool,
//! and sequences the "claim" that moves the pool into the total:
//!
//! ```text
//! Idle --begin_claim--> Claiming --tick (elapsed >= duration)--> Claimed --take_outcome--> Idle
//! ```
//!
//! The displayed total counts up with a cubic ease-out while claiming. All
//! decisions depend only on elapsed wall-clock time, never on how many times
//! the machine was polled, so a client animating at 60 fps and a server
//! polled twice reach the same final state.
//!
//! Persisted totals are only applied when they are at least as new as the
//! last ones applied, so a poll that read the profile before a claim was
//! stored cannot bring the claimed pool back.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::time::{Duration, Instant};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::UserProfile;

/// Points needed to grow from a sprout into a sapling.
pub const SAPLING_MIN_POINTS: u64 = 1500;
/// Points needed to grow from a sapling into a full tree.
pub const TREE_MIN_POINTS: u64 = 5000;

/// Growth stage of the carbon tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum TreeStage {
    Sprout,
    Sapling,
    Tree,
}

impl TreeStage {
    /// Stage reached at a point total.
    pub fn for_points(points: u64) -> Self {
        if points >= TREE_MIN_POINTS {
            TreeStage::Tree
        } else if points >= SAPLING_MIN_POINTS {
            TreeStage::Sapling
        } else {
            TreeStage::Sprout
        }
    }

    /// Zero-based stage index.
    pub const fn index(&self) -> u8 {
        match self {
            TreeStage::Sprout => 0,
            TreeStage::Sapling => 1,
            TreeStage::Tree => 2,
        }
    }
}

/// Phase of the claim sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ClaimPhase {
    Idle,
    Claiming,
    /// Transfer applied; the celebration has not been consumed yet.
    Claimed,
}

/// Result of asking the machine to start a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStart {
    Started(ClaimPlan),
    /// A claim is already animating; the request is ignored.
    AlreadyClaiming,
    /// The unclaimed pool is empty; nothing happens.
    NothingToClaim,
}

/// What an in-flight claim will do once it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClaimPlan {
    pub from_total: u64,
    pub to_total: u64,
    pub amount: u64,
    pub target_stage: TreeStage,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub duration_ms: u64,
}

/// A completed claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClaimOutcome {
    pub previous_total: u64,
    pub new_total: u64,
    pub claimed: u64,
    pub stage_before: TreeStage,
    pub stage_after: TreeStage,
    /// The tree grew a stage; show the celebration.
    pub stage_advanced: bool,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    plan: ClaimPlan,
    started_at: Instant,
}

/// Claim state for one user.
#[derive(Debug, Clone)]
pub struct ClaimMachine {
    total_points: u64,
    unclaimed: u64,
    stage: TreeStage,
    phase: ClaimPhase,
    in_flight: Option<InFlight>,
    outcome: Option<ClaimOutcome>,
    duration: Duration,
    /// `updated_at` of the persisted profile last applied.
    synced_at: Option<DateTime<Utc>>,
}

/// Cubic ease-out on `[0, 1]`.
pub fn ease_out(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

impl ClaimMachine {
    pub fn new(total_points: u64, unclaimed: u64, duration: Duration) -> Self {
        Self {
            total_points,
            unclaimed,
            stage: TreeStage::for_points(total_points),
            phase: ClaimPhase::Idle,
            in_flight: None,
            outcome: None,
            duration,
            synced_at: None,
        }
    }

    /// Machine seeded from a stored profile.
    pub fn from_profile(profile: &UserProfile, duration: Duration) -> Self {
        let mut machine = Self::new(profile.points, profile.unclaimed_points, duration);
        machine.synced_at = Some(profile.updated_at);
        machine
    }

    pub fn phase(&self) -> ClaimPhase {
        self.phase
    }

    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    pub fn unclaimed(&self) -> u64 {
        self.unclaimed
    }

    /// Highest stage reached so far.
    pub fn stage(&self) -> TreeStage {
        self.stage
    }

    pub fn is_claiming(&self) -> bool {
        self.phase == ClaimPhase::Claiming
    }

    /// Plan of the in-flight claim, if any.
    pub fn plan(&self) -> Option<ClaimPlan> {
        self.in_flight.map(|f| f.plan)
    }

    /// Add earned points to the unclaimed pool.
    pub fn deposit(&mut self, amount: u64) {
        self.unclaimed = self.unclaimed.saturating_add(amount);
    }

    /// Overwrite totals from a persisted profile. Ignored while a claim is
    /// in flight or when the profile is older than the last one applied.
    pub fn resync(&mut self, profile: &UserProfile) -> bool {
        if self.is_claiming() {
            return false;
        }
        if matches!(self.synced_at, Some(at) if profile.updated_at < at) {
            tracing::debug!(user_id = %profile.id, "Ignoring stale profile read");
            return false;
        }
        self.total_points = profile.points;
        self.unclaimed = profile.unclaimed_points;
        self.stage = self.stage.max(TreeStage::for_points(profile.points));
        self.synced_at = Some(profile.updated_at);
        true
    }

    /// Start moving the whole unclaimed pool into the total.
    pub fn begin_claim(&mut self, now: Instant) -> ClaimStart {
        if self.is_claiming() {
            return ClaimStart::AlreadyClaiming;
        }
        if self.unclaimed == 0 {
            return ClaimStart::NothingToClaim;
        }

        // A pending celebration from the previous claim is dropped.
        self.outcome = None;

        let amount = self.unclaimed;
        let to_total = self.total_points.saturating_add(amount);
        let plan = ClaimPlan {
            from_total: self.total_points,
            to_total,
            amount,
            target_stage: self.stage.max(TreeStage::for_points(to_total)),
            duration_ms: self.duration.as_millis() as u64,
        };

        self.in_flight = Some(InFlight {
            plan,
            started_at: now,
        });
        self.phase = ClaimPhase::Claiming;
        ClaimStart::Started(plan)
    }

    /// Animation progress in `[0, 1]`; 0 when not claiming.
    pub fn progress(&self, now: Instant) -> f64 {
        match self.in_flight {
            Some(flight) => {
                if self.duration.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_duration_since(flight.started_at);
                (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
            }
            None => 0.0,
        }
    }

    /// Total to draw at `now`.
    pub fn display_total(&self, now: Instant) -> u64 {
        match self.in_flight {
            Some(flight) => {
                let counted = (flight.plan.amount as f64 * ease_out(self.progress(now))).floor();
                flight.plan.from_total + (counted as u64).min(flight.plan.amount)
            }
            None => self.total_points,
        }
    }

    /// Advance to `now`; applies the transfer exactly once when the
    /// animation reaches its end.
    pub fn tick(&mut self, now: Instant) -> Option<ClaimOutcome> {
        let flight = self.in_flight?;
        if self.progress(now) < 1.0 {
            return None;
        }

        let plan = flight.plan;
        let stage_before = self.stage;
        let new_stage = TreeStage::for_points(plan.to_total);

        self.total_points = plan.to_total;
        self.unclaimed = self.unclaimed.saturating_sub(plan.amount);
        self.stage = stage_before.max(new_stage);
        self.in_flight = None;
        self.phase = ClaimPhase::Claimed;

        let outcome = ClaimOutcome {
            previous_total: plan.from_total,
            new_total: plan.to_total,
            claimed: plan.amount,
            stage_before,
            stage_after: self.stage,
            stage_advanced: new_stage > stage_before,
        };
        self.outcome = Some(outcome);

        tracing::debug!(
            claimed = plan.amount,
            new_total = plan.to_total,
            stage_advanced = outcome.stage_advanced,
            "Claim completed"
        );

        Some(outcome)
    }

    /// Consume the completed claim and return to `Idle`.
    pub fn take_outcome(&mut self) -> Option<ClaimOutcome> {
        if self.phase == ClaimPhase::Claimed {
            self.phase = ClaimPhase::Idle;
        }
        self.outcome.take()
    }

    /// Undo a completed transfer whose persistence failed.
    pub fn revert(&mut self, outcome: &ClaimOutcome) {
        self.total_points = outcome.previous_total;
        self.unclaimed = self.unclaimed.saturating_add(outcome.claimed);
        self.outcome = None;
        self.phase = ClaimPhase::Idle;
    }
}

/// Claim machines for active users.
pub struct ClaimSessions {
    sessions: DashMap<Uuid, ClaimMachine>,
    duration: Duration,
}

impl ClaimSessions {
    pub fn new(duration: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            duration,
        }
    }

    /// Run `f` on the user's machine, creating it from `profile` if absent
    /// and resyncing an idle one. The map guard is released before
    /// returning.
    pub fn with_session<R>(
        &self,
        profile: &UserProfile,
        f: impl FnOnce(&mut ClaimMachine) -> R,
    ) -> R {
        let mut entry = self
            .sessions
            .entry(profile.id)
            .or_insert_with(|| ClaimMachine::from_profile(profile, self.duration));
        if entry.phase() == ClaimPhase::Idle {
            entry.resync(profile);
        }
        f(entry.value_mut())
    }

    /// After a claim is stored: hand out its celebration and adopt the
    /// stored profile, so earlier reads no longer apply.
    pub fn finish_claim(&self, persisted: &UserProfile) -> Option<ClaimOutcome> {
        self.with_existing(persisted.id, |machine| {
            let outcome = machine.take_outcome();
            machine.resync(persisted);
            outcome
        })
        .flatten()
    }

    /// Run `f` on an existing machine only.
    pub fn with_existing<R>(&self, user_id: Uuid, f: impl FnOnce(&mut ClaimMachine) -> R) -> Option<R> {
        self.sessions
            .get_mut(&user_id)
            .map(|mut entry| f(entry.value_mut()))
    }
}
