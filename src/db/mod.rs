//! Database layer (Supabase PostgREST or in-process tables).

pub mod memory;
pub mod postgrest;
pub mod query;
pub mod store;

pub use store::Store;

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const USER_ACTIVITIES: &str = "user_activities";
    pub const USER_MEDALS: &str = "user_medals";
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
    /// Inventory, one row per (user, product)
    pub const USER_ITEMS: &str = "user_items";
    pub const STORIES: &str = "stories";
    pub const ROUTES: &str = "routes";
    /// Completed routes
    pub const USER_ROUTES: &str = "user_routes";
    /// Per-day aggregates keyed by (user, date)
    pub const USER_DAILY_STATS: &str = "user_daily_stats";
    pub const WITHDRAWALS: &str = "withdrawals";
}
