//! Rule-based lifestyle suggestions from numeric habit fields.

use crate::models::habit::Habit;
use crate::models::lenient::as_f64;

pub const MIN_SLEEP_HOURS: f64 = 7.0;
pub const MIN_DAILY_STEPS: f64 = 7000.0;
pub const MIN_WATER_LITRES: f64 = 2.0;

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Always returns at least one suggestion.
pub fn suggest(habits: &[Habit]) -> Vec<String> {
    let sleep: Vec<f64> = habits.iter().filter_map(|h| h.sleep_hours).collect();
    let steps: Vec<f64> = habits
        .iter()
        .filter_map(|h| h.steps.as_ref().and_then(as_f64))
        .collect();
    let water: Vec<f64> = habits.iter().filter_map(|h| h.water_intake).collect();

    let mut suggestions = Vec::new();
    if average(&sleep) < MIN_SLEEP_HOURS {
        suggestions.push("🛌 Try to get at least 7 hours of sleep for better health.".to_string());
    }
    if average(&steps) < MIN_DAILY_STEPS {
        suggestions.push("🚶 Aim for 7,000+ steps daily for better fitness.".to_string());
    }
    if average(&water) < MIN_WATER_LITRES {
        suggestions.push("💧 Drink at least 2 liters of water daily.".to_string());
    }
    if suggestions.is_empty() {
        suggestions.push("🎉 Excellent! Keep up your healthy habits.".to_string());
    }
    suggestions
}
