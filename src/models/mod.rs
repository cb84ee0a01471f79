// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod catalog;
pub mod market;
pub mod medal;
pub mod stats;
pub mod user;

pub use activity::{ActivityRecord, NewActivity};
pub use catalog::{CompletedRoute, Route, Story};
pub use market::{InventoryItem, NewOrder, Order, Product, Withdrawal};
pub use medal::UserMedal;
pub use stats::{DailyStats, WeeklyDay};
pub use user::{ProfileView, UserProfile};
