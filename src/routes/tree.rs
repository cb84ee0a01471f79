// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carbon-tree routes.
//!
//! `POST /api/tree/claim` starts moving the unclaimed pool into the point
//! total. `GET /api/tree` advances the user's claim machine to the current
//! time; the poll that observes completion persists the transfer and
//! returns the one-time celebration.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::claim::{ClaimMachine, ClaimOutcome, ClaimPhase, ClaimPlan, ClaimStart, TreeStage};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tree", get(get_tree))
        .route("/api/tree/claim", post(start_claim))
}

/// Tree as drawn at one instant.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TreeResponse {
    pub phase: ClaimPhase,
    pub stage: TreeStage,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub display_total: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_points: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub unclaimed_points: u64,
    /// Animation progress, 0 to 1
    pub progress: f64,
    pub plan: Option<ClaimPlan>,
    /// Set once, on the poll that completed a claim.
    pub celebration: Option<ClaimOutcome>,
}

impl TreeResponse {
    fn snapshot(machine: &ClaimMachine, now: Instant) -> Self {
        Self {
            phase: machine.phase(),
            stage: machine.stage(),
            display_total: machine.display_total(now),
            total_points: machine.total_points(),
            unclaimed_points: machine.unclaimed(),
            progress: machine.progress(now),
            plan: machine.plan(),
            celebration: None,
        }
    }
}

async fn get_tree(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TreeResponse>> {
    let profile = state.ledger.ensure_profile(user.user_id).await?;
    let now = Instant::now();

    let (completed, mut response) = state.claims.with_session(&profile, |machine| {
        let completed = machine.tick(now);
        (completed, TreeResponse::snapshot(machine, now))
    });

    let Some(outcome) = completed else {
        return Ok(Json(response));
    };

    // The map guard is released; persist the transfer.
    let persisted = match state.store.claim_points(user.user_id, outcome.claimed).await {
        Ok(persisted) => persisted,
        Err(e) => {
            tracing::error!(user_id = %user.user_id, error = %e, "Failed to persist claim; reverting");
            state
                .claims
                .with_existing(user.user_id, |machine| machine.revert(&outcome));
            return Err(e);
        }
    };

    tracing::info!(
        user_id = %user.user_id,
        claimed = outcome.claimed,
        new_total = outcome.new_total,
        stage_advanced = outcome.stage_advanced,
        "Claim persisted"
    );

    let celebration = state.claims.finish_claim(&persisted);
    response.phase = ClaimPhase::Idle;
    response.celebration = celebration;
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClaimResponse {
    /// False when a claim is already running or nothing is unclaimed.
    pub accepted: bool,
    pub reason: Option<String>,
    pub plan: Option<ClaimPlan>,
}

async fn start_claim(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ClaimResponse>> {
    let profile = state.ledger.ensure_profile(user.user_id).await?;
    let start = state
        .claims
        .with_session(&profile, |machine| machine.begin_claim(Instant::now()));

    let response = match start {
        ClaimStart::Started(plan) => {
            tracing::info!(user_id = %user.user_id, amount = plan.amount, "Claim started");
            ClaimResponse {
                accepted: true,
                reason: None,
                plan: Some(plan),
            }
        }
        ClaimStart::AlreadyClaiming => ClaimResponse {
            accepted: false,
            reason: Some("already_claiming".to_string()),
            plan: None,
        },
        ClaimStart::NothingToClaim => ClaimResponse {
            accepted: false,
            reason: Some("nothing_to_claim".to_string()),
            plan: None,
        },
    };

    Ok(Json(response))
}
