//! Rebuilds the cached `DailyStats` summary after a habit or mood change.

use std::collections::BTreeMap;

use crate::models::habit::Habit;
use crate::models::stats::{DailyStats, DASHBOARD_CATEGORIES};

use super::trend::{trend, ScorePoint};

/// Completion percentage per habit category.
pub fn category_scores(habits: &[Habit]) -> BTreeMap<String, u32> {
    let mut tally: BTreeMap<String, (u32, u32)> = DASHBOARD_CATEGORIES
        .iter()
        .map(|c| (c.to_string(), (0, 0)))
        .collect();
    for habit in habits {
        let category = habit.category.trim().to_lowercase();
        if category.is_empty() {
            continue;
        }
        let (done, total) = tally.entry(category).or_insert((0, 0));
        *total += 1;
        if habit.completed_today {
            *done += 1;
        }
    }
    tally
        .into_iter()
        .map(|(category, (done, total))| {
            let pct = if total == 0 {
                0
            } else {
                (f64::from(done) / f64::from(total) * 100.0).round() as u32
            };
            (category, pct)
        })
        .collect()
}

/// `current_streak` counts habits completed today and `best_streak` never decreases.
/// `weekly_trend` is the score change across `week_series`.
pub fn recompute_stats(habits: &[Habit], previous: &DailyStats, week_series: &[ScorePoint]) -> DailyStats {
    let current_streak = habits.iter().filter(|h| h.completed_today).count() as u32;
    let missed_count = habits.len() as u32 - current_streak;
    DailyStats {
        current_streak,
        best_streak: previous.best_streak.max(current_streak),
        missed_count,
        weekly_trend: trend(week_series).delta.unwrap_or(0),
        category_scores: category_scores(habits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn habit(category: &str, done: bool) -> Habit {
        Habit {
            category: category.into(),
            completed_today: done,
            ..Habit::default()
        }
    }

    fn point(day: u32, score: u32) -> ScorePoint {
        ScorePoint {
            date: format!("2024-01-{:02}", day),
            score,
            habits: 0,
            at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_counts_completed_and_missed() {
        let habits = [habit("fitness", true), habit("sleep", false), habit("fitness", true)];
        let stats = recompute_stats(&habits, &DailyStats::default(), &[]);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.missed_count, 1);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.weekly_trend, 0);
    }

    #[test]
    fn test_best_streak_is_kept() {
        let previous = DailyStats {
            best_streak: 7,
            ..DailyStats::default()
        };
        let stats = recompute_stats(&[habit("fitness", true)], &previous, &[]);
        assert_eq!(stats.best_streak, 7);
    }

    #[test]
    fn test_weekly_trend_from_series() {
        let stats = recompute_stats(&[], &DailyStats::default(), &[point(1, 40), point(7, 65)]);
        assert_eq!(stats.weekly_trend, 25);
    }

    #[test]
    fn test_category_scores_include_dashboard_defaults() {
        let scores = category_scores(&[habit("Fitness", true), habit("fitness", false), habit("Music", true)]);
        assert_eq!(scores["fitness"], 50);
        assert_eq!(scores["nutrition"], 0);
        assert_eq!(scores["sleep"], 0);
        assert_eq!(scores["mindfulness"], 0);
        assert_eq!(scores["music"], 100);
    }
}
