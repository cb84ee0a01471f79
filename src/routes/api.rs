// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityRecord, ProfileView};
use crate::services::badge::BadgeProgress;
use crate::services::ledger::{Dashboard, LoggedActivity};
use crate::services::reward::ActivityKind;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/activities", get(get_activities).post(log_activity))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/badges", get(get_badges))
}

// ─── User Profile ────────────────────────────────────────────

/// Get current user profile, creating it on first visit.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileView>> {
    let profile = state.ledger.ensure_profile(user.user_id).await?;
    Ok(Json(profile.view()))
}

#[derive(Deserialize, Validate)]
struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 32))]
    username: String,
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileView>> {
    body.validate()?;

    let mut profile = state.ledger.ensure_profile(user.user_id).await?;
    profile.username = Some(body.username.trim().to_string());
    profile.updated_at = Utc::now();
    let profile = state.store.upsert_profile(&profile).await?;

    Ok(Json(profile.view()))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct LogActivityRequest {
    /// "walk", "bike" or "public_transport"
    #[serde(rename = "type")]
    activity_type: String,
    /// Steps, kilometers or trips depending on the type
    value: f64,
    #[serde(default)]
    duration_seconds: f64,
}

async fn log_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<LogActivityRequest>,
) -> Result<Json<LoggedActivity>> {
    let kind = ActivityKind::from_parts(&body.activity_type, body.value).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown activity type '{}'", body.activity_type))
    })?;

    let logged = state
        .ledger
        .log_activity(user.user_id, kind, body.duration_seconds)
        .await?;
    Ok(Json(logged))
}

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    20
}

const MAX_LIMIT: u32 = 100;

fn parse_cursor(cursor: Option<&str>) -> Result<Option<i64>> {
    cursor
        .map(|raw| {
            let invalid_cursor = || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;
            let id = decoded_str
                .strip_prefix("id:")
                .ok_or_else(invalid_cursor)?
                .parse::<i64>()
                .map_err(|_| invalid_cursor())?;

            if id <= 0 {
                return Err(invalid_cursor());
            }
            Ok(id)
        })
        .transpose()
}

fn encode_cursor(activity_id: i64) -> String {
    URL_SAFE_NO_PAD.encode(format!("id:{}", activity_id))
}

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityRecord>,
    pub limit: u32,
    pub next_cursor: Option<String>,
}

/// Get the user's activities, newest first.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    tracing::debug!(
        user_id = %user.user_id,
        cursor = ?params.cursor,
        limit = params.limit,
        "Fetching activities"
    );

    if params.limit == 0 {
        return Err(AppError::BadRequest("limit must be at least 1".to_string()));
    }
    let limit = params.limit.min(MAX_LIMIT);
    let before_id = parse_cursor(params.cursor.as_deref())?;

    // Fetch one extra item to determine if another page is available.
    let mut activities = state
        .store
        .get_user_activities(user.user_id, limit.saturating_add(1), before_id)
        .await?;

    let has_more = activities.len() > limit as usize;
    if has_more {
        activities.truncate(limit as usize);
    }
    let next_cursor = if has_more {
        activities.last().map(|a| encode_cursor(a.id))
    } else {
        None
    };

    Ok(Json(ActivitiesResponse {
        activities,
        limit,
        next_cursor,
    }))
}

// ─── Dashboard & Badges ──────────────────────────────────────

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Dashboard>> {
    Ok(Json(state.ledger.dashboard(user.user_id, Utc::now()).await?))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BadgesResponse {
    pub badges: Vec<BadgeProgress>,
    pub unlocked: usize,
    pub total: usize,
}

async fn get_badges(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<BadgesResponse>> {
    let badges = state.ledger.sync_badges(user.user_id).await?;
    let unlocked = badges.iter().filter(|b| b.unlocked).count();

    Ok(Json(BadgesResponse {
        total: badges.len(),
        unlocked,
        badges,
    }))
}
