//! Composite daily wellness score.
//!
//! Weights: habit completion 50, mood sentiment 30, streak 20.

use serde::Serialize;

use crate::models::habit::Habit;
use crate::models::mood::MoodEntry;
use crate::models::stats::DailyStats;

pub const HABIT_WEIGHT: f64 = 50.0;
pub const MOOD_WEIGHT: f64 = 30.0;
pub const STREAK_POINTS_PER_DAY: u32 = 4;
pub const STREAK_CAP_DAYS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub habit: f64,
    pub mood: f64,
    pub streak: f64,
    pub total: u8,
}

pub fn habit_component(habits: &[Habit]) -> f64 {
    if habits.is_empty() {
        return 0.0;
    }
    let completed = habits.iter().filter(|h| h.completed_today).count();
    completed as f64 / habits.len() as f64 * HABIT_WEIGHT
}

pub fn mood_component(moods: &[MoodEntry]) -> f64 {
    if moods.is_empty() {
        return 0.0;
    }
    let total: u32 = moods.iter().map(|m| u32::from(m.sentiment())).sum();
    let average = f64::from(total) / moods.len() as f64;
    average / 10.0 * MOOD_WEIGHT
}

pub fn streak_component(current_streak: u32) -> f64 {
    f64::from(current_streak.min(STREAK_CAP_DAYS) * STREAK_POINTS_PER_DAY)
}

pub fn score_breakdown(habits: &[Habit], moods: &[MoodEntry], stats: &DailyStats) -> ScoreBreakdown {
    let habit = habit_component(habits);
    let mood = mood_component(moods);
    let streak = streak_component(stats.current_streak);
    let total = (habit + mood + streak).round().clamp(0.0, 100.0) as u8;
    ScoreBreakdown {
        habit,
        mood,
        streak,
        total,
    }
}

/// Score in `0..=100`. Pure: the caller decides whether and where to persist it.
pub fn compute_wellness_score(habits: &[Habit], moods: &[MoodEntry], stats: &DailyStats) -> u8 {
    score_breakdown(habits, moods, stats).total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habits(completed: usize, total: usize) -> Vec<Habit> {
        (0..total)
            .map(|i| Habit {
                id: format!("h{}", i),
                completed_today: i < completed,
                ..Habit::default()
            })
            .collect()
    }

    fn moods(tokens: &[&str]) -> Vec<MoodEntry> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, t)| MoodEntry {
                date_key: format!("2024-01-{:02}", i + 1),
                mood: t.to_string(),
                ..MoodEntry::default()
            })
            .collect()
    }

    fn streak(days: u32) -> DailyStats {
        DailyStats {
            current_streak: days,
            ..DailyStats::default()
        }
    }

    #[test]
    fn test_worked_example() {
        let breakdown = score_breakdown(&habits(1, 2), &moods(&["😊"]), &streak(3));
        assert_eq!(breakdown.habit, 25.0);
        assert_eq!(breakdown.mood, 30.0);
        assert_eq!(breakdown.streak, 12.0);
        assert_eq!(breakdown.total, 67);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(compute_wellness_score(&[], &[], &streak(0)), 0);
    }

    #[test]
    fn test_maximal_inputs_score_hundred() {
        let moods = moods(&["😊", "😄", "🤩", "😍"]);
        assert_eq!(compute_wellness_score(&habits(100, 100), &moods, &streak(40)), 100);
    }

    #[test]
    fn test_streak_caps_at_five_days() {
        assert_eq!(streak_component(5), 20.0);
        assert_eq!(streak_component(365), 20.0);
        assert_eq!(streak_component(2), 8.0);
    }

    #[test]
    fn test_unknown_mood_counts_as_neutral() {
        // sentiment 5 -> 15 points
        assert_eq!(compute_wellness_score(&[], &moods(&["🦀"]), &streak(0)), 15);
    }

    #[test]
    fn test_mood_average_rounds_total() {
        // (10 + 1) / 2 = 5.5 -> 16.5 -> 17
        assert_eq!(compute_wellness_score(&[], &moods(&["😊", "😠"]), &streak(0)), 17);
    }

    #[test]
    fn test_monotonic_in_completion() {
        let moods = moods(&["😐", "😢"]);
        for total in 1..=12 {
            let mut previous = 0;
            for completed in 0..=total {
                let score = compute_wellness_score(&habits(completed, total), &moods, &streak(2));
                assert!(score >= previous, "{}/{} dropped", completed, total);
                assert!(score <= 100);
                previous = score;
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let h = habits(3, 7);
        let m = moods(&["🙂", "😴", "😰"]);
        let s = streak(4);
        assert_eq!(
            compute_wellness_score(&h, &m, &s),
            compute_wellness_score(&h, &m, &s)
        );
    }
}
