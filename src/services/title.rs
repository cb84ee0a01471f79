// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cosmetic rank derived from cumulative carbon saved.

use serde::{Serialize, Serializer};

/// Carbon saved (kg) below which a user is a Sprout.
const SEEDLING_MIN_KG: f64 = 10.0;
/// Carbon saved (kg) above which a user is a Golden Ear.
const SEEDLING_MAX_KG: f64 = 50.0;

/// User title, ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Title {
    /// 绿芽
    Sprout,
    /// 青苗
    Seedling,
    /// 金穗
    GoldenEar,
}

impl Title {
    /// Display label shown in the app.
    pub const fn label(&self) -> &'static str {
        match self {
            Title::Sprout => "绿芽",
            Title::Seedling => "青苗",
            Title::GoldenEar => "金穗",
        }
    }

    /// Numeric rank, 0 for the lowest tier.
    pub const fn rank(&self) -> u8 {
        match self {
            Title::Sprout => 0,
            Title::Seedling => 1,
            Title::GoldenEar => 2,
        }
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Title {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Resolve the title for a cumulative carbon-saved total.
///
/// `< 10` is Sprout, `10..=50` is Seedling, `> 50` is Golden Ear.
/// NaN resolves to Sprout; infinities follow their sign.
pub fn resolve_title(carbon_saved_kg: f64) -> Title {
    if carbon_saved_kg.is_nan() || carbon_saved_kg < SEEDLING_MIN_KG {
        Title::Sprout
    } else if carbon_saved_kg <= SEEDLING_MAX_KG {
        Title::Seedling
    } else {
        Title::GoldenEar
    }
}
