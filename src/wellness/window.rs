//! Relative time windows over date-keyed record collections.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::mood::MoodEntry;
use crate::models::wellness::WellnessScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    #[default]
    Week,
    Month,
    Year,
    All,
}

impl TimeWindow {
    /// Unrecognised names select everything.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::All,
        }
    }

    /// Earliest instant still inside the window, or `None` for `All`.
    ///
    /// `Week` is a rolling seven days; `Month` and `Year` start at midnight of
    /// the same calendar day one month / one year back (clamped to the end of
    /// shorter months).
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months_back = match self {
            Self::Week => return Some(now - Duration::days(7)),
            Self::Month => 1,
            Self::Year => 12,
            Self::All => return None,
        };
        let day = now
            .date_naive()
            .checked_sub_months(Months::new(months_back))
            .unwrap_or(NaiveDate::MIN);
        Some(start_of_day(day))
    }

    pub fn contains(self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.start(now).map_or(true, |start| date >= start)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        })
    }
}

/// A record that may carry its own instant, overriding the date in its key.
pub trait Timestamped {
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

impl Timestamped for Value {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.get("timestamp").and_then(parse_timestamp)
    }
}

impl Timestamped for MoodEntry {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().and_then(parse_timestamp)
    }
}

impl Timestamped for WellnessScore {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        if self.timestamp <= 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

/// Milliseconds since the epoch, or a date string.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

/// `YYYY-MM-DD` (UTC midnight) or RFC 3339.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(start_of_day(day));
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The instant a record belongs to: its own timestamp first, then its key.
pub fn record_date<V: Timestamped>(key: &str, value: &V) -> Option<DateTime<Utc>> {
    value.timestamp().or_else(|| parse_date(key))
}

/// Split records into those inside `window` and the keys that carry no usable date.
pub fn partition_by_window<V: Timestamped + Clone>(
    records: &BTreeMap<String, V>,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> (BTreeMap<String, V>, Vec<String>) {
    let mut kept = BTreeMap::new();
    let mut undated = Vec::new();
    for (key, value) in records {
        match record_date(key, value) {
            Some(date) if window.contains(date, now) => {
                kept.insert(key.clone(), value.clone());
            }
            Some(_) => {}
            None => undated.push(key.clone()),
        }
    }
    (kept, undated)
}

/// Records inside `window` relative to `now`. Undated records are dropped.
pub fn filter_by_window<V: Timestamped + Clone>(
    records: &BTreeMap<String, V>,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> BTreeMap<String, V> {
    partition_by_window(records, window, now).0
}
