// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! EcoRural: low-carbon commuting rewards for a rural marketplace
//!
//! This crate provides the backend API that turns walking, cycling and
//! public-transport trips into carbon savings and green coins, grows a
//! virtual carbon tree as coins are claimed, and lets users spend coins on
//! farm products.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Store;
use services::{ClaimSessions, Ledger};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub ledger: Ledger,
    /// Per-user claim machines
    pub claims: ClaimSessions,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        let claims = ClaimSessions::new(config.claim_animation);
        Self {
            ledger: Ledger::new(store.clone()),
            config,
            store,
            claims,
        }
    }
}
