//! Direction and headline insights over a day-by-day score series.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregate::HabitSummary;
use super::window::record_date;
use crate::models::stats::DailyStats;
use crate::models::wellness::WellnessScore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePoint {
    pub date: String,
    pub score: u32,
    pub habits: u32,
    #[serde(skip)]
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
    /// Fewer than two points: nothing to compare.
    NoTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub delta: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub trend: Trend,
    pub best_day: Option<ScorePoint>,
    pub average_score: u32,
    pub average_completion: u32,
    pub current_streak: u32,
}

/// Scores in chronological order. Entries without a usable date are skipped.
pub fn score_series(scores: &BTreeMap<String, WellnessScore>) -> Vec<ScorePoint> {
    let mut series: Vec<ScorePoint> = scores
        .iter()
        .filter_map(|(key, score)| {
            let at = record_date(key, score)?;
            Some(ScorePoint {
                date: key.clone(),
                score: score.score,
                habits: score.habits_count,
                at,
            })
        })
        .collect();
    // stable: same-instant entries keep key order
    series.sort_by_key(|p| p.at);
    series
}

pub fn trend(series: &[ScorePoint]) -> Trend {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => (first, last),
        _ => {
            return Trend {
                direction: TrendDirection::NoTrend,
                delta: None,
            }
        }
    };
    let delta = i64::from(last.score) - i64::from(first.score);
    let direction = match delta {
        d if d > 0 => TrendDirection::Up,
        d if d < 0 => TrendDirection::Down,
        _ => TrendDirection::Flat,
    };
    Trend {
        direction,
        delta: Some(delta),
    }
}

/// Highest score; the earliest such day wins ties.
pub fn best_day(series: &[ScorePoint]) -> Option<&ScorePoint> {
    series
        .iter()
        .fold(None, |best: Option<&ScorePoint>, p| match best {
            Some(b) if b.score >= p.score => Some(b),
            _ => Some(p),
        })
}

pub fn average_score(series: &[ScorePoint]) -> u32 {
    if series.is_empty() {
        return 0;
    }
    let sum: u64 = series.iter().map(|p| u64::from(p.score)).sum();
    (sum as f64 / series.len() as f64).round() as u32
}

pub fn derive_insights(
    series: &[ScorePoint],
    habits: &HabitSummary,
    stats: &DailyStats,
) -> Insights {
    Insights {
        trend: trend(series),
        best_day: best_day(series).cloned(),
        average_score: average_score(series),
        average_completion: habits.completion_rate,
        current_streak: stats.current_streak,
    }
}
