use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::lenient;

/// Categories the dashboard always reports, even before any habit uses them.
pub const DASHBOARD_CATEGORIES: [&str; 4] = ["fitness", "nutrition", "sleep", "mindfulness"];

/// Cached summary under `users/U/stats`. Derived, never authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    #[serde(default, deserialize_with = "lenient::count")]
    pub current_streak: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub best_streak: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub missed_count: u32,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub weekly_trend: i64,
    #[serde(default)]
    pub category_scores: BTreeMap<String, u32>,
}
