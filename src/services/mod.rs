// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod badge;
pub mod claim;
pub mod ledger;
pub mod reward;
pub mod title;

pub use claim::{ClaimMachine, ClaimSessions};
pub use ledger::Ledger;
pub use reward::{calculate_reward, ActivityKind, Reward};
pub use title::{resolve_title, Title};
