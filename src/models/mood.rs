use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::lenient;

/// Token used when a mood is missing or cannot be resolved.
pub const NEUTRAL_MOOD: &str = "😐";

/// Sentiment assigned to tokens outside the vocabulary.
pub const NEUTRAL_SENTIMENT: u8 = 5;

/// The mood vocabulary offered by the picker, with its sentiment on a 1–10 scale.
///
/// This is the single sentiment table shared by the scorer and the
/// aggregator; nothing else maps emoji to numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Joyful,
    Loving,
    Excited,
    Content,
    Relaxed,
    Neutral,
    Tired,
    Worried,
    Pensive,
    Sad,
    Anxious,
    Angry,
}

impl Mood {
    pub const ALL: [Mood; 13] = [
        Mood::Happy,
        Mood::Joyful,
        Mood::Loving,
        Mood::Excited,
        Mood::Content,
        Mood::Relaxed,
        Mood::Neutral,
        Mood::Tired,
        Mood::Worried,
        Mood::Pensive,
        Mood::Sad,
        Mood::Anxious,
        Mood::Angry,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Joyful => "😄",
            Mood::Loving => "😍",
            Mood::Excited => "🤩",
            Mood::Content => "🙂",
            Mood::Relaxed => "😌",
            Mood::Neutral => NEUTRAL_MOOD,
            Mood::Tired => "😴",
            Mood::Worried => "😟",
            Mood::Pensive => "😔",
            Mood::Sad => "😢",
            Mood::Anxious => "😰",
            Mood::Angry => "😠",
        }
    }

    pub fn sentiment(self) -> u8 {
        match self {
            Mood::Happy | Mood::Joyful | Mood::Loving | Mood::Excited => 10,
            Mood::Content => 8,
            Mood::Relaxed => 7,
            Mood::Neutral => NEUTRAL_SENTIMENT,
            Mood::Tired => 4,
            Mood::Worried | Mood::Pensive => 3,
            Mood::Sad | Mood::Anxious => 2,
            Mood::Angry => 1,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL.into_iter().find(|m| m.token() == token)
    }
}

/// Sentiment of a stored mood token; unknown tokens are neutral.
pub fn sentiment_of(token: &str) -> u8 {
    Mood::from_token(token)
        .map(Mood::sentiment)
        .unwrap_or(NEUTRAL_SENTIMENT)
}

/// One mood log, stored under `users/U/moods/<YYYY-MM-DD>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    #[serde(skip)]
    pub date_key: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mood: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<serde_json::Value>,
}

impl MoodEntry {
    /// The stored token, or the neutral token when none was recorded.
    pub fn token(&self) -> &str {
        let token = self.mood.trim();
        if token.is_empty() {
            NEUTRAL_MOOD
        } else {
            token
        }
    }

    pub fn sentiment(&self) -> u8 {
        sentiment_of(self.token())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertMoodRequest {
    #[validate(length(min = 1, max = 16, message = "Mood is required"))]
    pub mood: String,
    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// Moods are keyed by calendar day; anything else is rejected.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}
