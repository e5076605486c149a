//! Canonical per-user locations.

use chrono::NaiveDate;

pub fn user_root(uid: &str) -> String {
    format!("users/{}", uid)
}

pub fn habits(uid: &str) -> String {
    format!("users/{}/habits", uid)
}

pub fn habit(uid: &str, habit_id: &str) -> String {
    format!("users/{}/habits/{}", uid, habit_id)
}

pub fn moods(uid: &str) -> String {
    format!("users/{}/moods", uid)
}

pub fn mood(uid: &str, date_key: &str) -> String {
    format!("users/{}/moods/{}", uid, date_key)
}

pub fn stats(uid: &str) -> String {
    format!("users/{}/stats", uid)
}

pub fn wellness_scores(uid: &str) -> String {
    format!("users/{}/wellnessScores", uid)
}

pub fn wellness_score(uid: &str, date: NaiveDate) -> String {
    format!("users/{}/wellnessScores/{}", uid, date.format("%Y-%m-%d"))
}
