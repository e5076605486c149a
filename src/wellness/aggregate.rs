//! Habit and mood roll-ups for the analytics views.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::habit::Habit;
use crate::models::lenient::as_f64;
use crate::models::mood::{MoodEntry, NEUTRAL_MOOD};

pub const UNNAMED_HABIT: &str = "Unnamed Habit";
pub const WEEK_SLOTS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStat {
    pub name: String,
    pub completion_rate: u32,
    pub streak: u32,
    pub completed_today: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HabitSummary {
    pub habits: Vec<HabitStat>,
    pub total_completed: u32,
    pub total_habits: u32,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSummary {
    pub distribution: BTreeMap<String, u32>,
    pub total_moods: u32,
    pub top_mood: String,
    pub top_mood_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitExtremes {
    pub best: String,
    pub worst: String,
}

fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (f64::from(part) / f64::from(whole) * 100.0).round() as u32
}

fn display_name(habit: &Habit) -> String {
    let name = habit.name.trim();
    if name.is_empty() {
        UNNAMED_HABIT.to_string()
    } else {
        name.to_string()
    }
}

/// Per-habit rate: an explicit stored rate wins, otherwise today's completion.
pub fn habit_completion_rate(habit: &Habit) -> u32 {
    match habit.completion_rate {
        Some(rate) => rate.round().clamp(0.0, 100.0) as u32,
        None if habit.completed_today => 100,
        None => 0,
    }
}

pub fn aggregate_habits(habits: &[Habit]) -> HabitSummary {
    let stats: Vec<HabitStat> = habits
        .iter()
        .map(|h| HabitStat {
            name: display_name(h),
            completion_rate: habit_completion_rate(h),
            streak: h.streak,
            completed_today: h.completed_today,
        })
        .collect();
    let total_habits = stats.len() as u32;
    let total_completed = stats.iter().filter(|s| s.completed_today).count() as u32;

    HabitSummary {
        habits: stats,
        total_completed,
        total_habits,
        completion_rate: percentage(total_completed, total_habits),
    }
}

/// Distribution and mode of the given moods. Ties go to the mood seen first.
pub fn aggregate_moods(moods: &[MoodEntry]) -> MoodSummary {
    let mut distribution: BTreeMap<String, u32> = BTreeMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for entry in moods {
        let token = entry.token();
        let count = distribution.entry(token.to_string()).or_insert(0);
        if *count == 0 {
            first_seen.push(token);
        }
        *count += 1;
    }

    let mut top_mood = NEUTRAL_MOOD;
    let mut top_count = 0;
    for token in first_seen {
        let count = distribution.get(token).copied().unwrap_or(0);
        if count > top_count {
            top_mood = token;
            top_count = count;
        }
    }

    let total_moods = moods.len() as u32;
    MoodSummary {
        top_mood: top_mood.to_string(),
        top_mood_percentage: percentage(top_count, total_moods),
        distribution,
        total_moods,
    }
}

/// Sum of the seven weekly slots; missing or non-numeric slots count as zero.
pub fn weekly_total(habit: &Habit) -> f64 {
    (0..WEEK_SLOTS)
        .map(|i| habit.weekly_data.get(i).and_then(as_f64).unwrap_or(0.0))
        .sum()
}

/// Best and worst habit by weekly total, first one winning ties.
pub fn select_extremes(habits: &[Habit]) -> Option<HabitExtremes> {
    let mut iter = habits.iter().map(|h| (h, weekly_total(h)));
    let (first, first_total) = iter.next()?;
    let (mut best, mut best_total) = (first, first_total);
    let (mut worst, mut worst_total) = (first, first_total);
    for (habit, total) in iter {
        if total > best_total {
            best = habit;
            best_total = total;
        }
        if total < worst_total {
            worst = habit;
            worst_total = total;
        }
    }
    Some(HabitExtremes {
        best: display_name(best),
        worst: display_name(worst),
    })
}

/// Highest completion rates first, at most `limit` of them.
pub fn top_performers(summary: &HabitSummary, limit: usize) -> Vec<HabitStat> {
    let mut ranked = summary.habits.clone();
    ranked.sort_by(|a, b| b.completion_rate.cmp(&a.completion_rate));
    ranked.truncate(limit);
    ranked
}

pub fn best_streak(stats: &[HabitStat]) -> u32 {
    stats.iter().map(|s| s.streak).max().unwrap_or(0)
}
