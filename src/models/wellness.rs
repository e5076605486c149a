use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;

/// One persisted score per user per calendar day, at
/// `users/U/wellnessScores/<YYYY-MM-DD>`. Rewriting a day replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessScore {
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub score: u32,
    #[serde(rename = "habits", alias = "habitsCount", default, deserialize_with = "lenient::count")]
    pub habits_count: u32,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub timestamp: i64,
}

impl WellnessScore {
    pub fn new(date: NaiveDate, score: u8, habits_count: u32, timestamp: i64) -> Self {
        Self {
            date: Some(date),
            score: u32::from(score),
            habits_count,
            timestamp,
        }
    }
}
