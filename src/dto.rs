//! Request/response shapes for the HTTP surface that are not stored records.
//!
//! Stored records (`models::*`) are serialized as-is; these wrap them with
//! their store keys or carry query parameters.

use serde::{Deserialize, Serialize};

use crate::models::habit::Habit;
use crate::models::mood::MoodEntry;

/// A habit together with its key under `users/U/habits`.
#[derive(Debug, Serialize)]
pub struct HabitResponse {
    pub id: String,
    #[serde(flatten)]
    pub habit: Habit,
}

impl From<Habit> for HabitResponse {
    fn from(habit: Habit) -> Self {
        Self {
            id: habit.id.clone(),
            habit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MoodResponse {
    pub date: String,
    pub mood: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<MoodEntry> for MoodResponse {
    fn from(entry: MoodEntry) -> Self {
        Self {
            mood: entry.token().to_string(),
            date: entry.date_key,
            note: entry.note,
        }
    }
}

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: String,
}

/// `?range=week|month|year|all`; absent means the configured default.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}
