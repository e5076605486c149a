use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use super::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub goal: String,
    #[serde(rename = "type", default, deserialize_with = "habit_type")]
    pub kind: HabitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub reminder: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub current: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub streak: u32,
    #[serde(
        default,
        alias = "lastLoggedDate",
        deserialize_with = "lenient::opt_date"
    )]
    pub last_logged: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub created_at: i64,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub completed_today: bool,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub completion_rate: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub weekly_data: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub sleep_hours: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub water_intake: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum HabitType {
    #[default]
    Daily,
    Weekly,
}

fn habit_type<'de, D: Deserializer<'de>>(d: D) -> Result<HabitType, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if s.eq_ignore_ascii_case("weekly") => HabitType::Weekly,
        _ => HabitType::Daily,
    })
}

impl Habit {
    /// Clear a completion flag left over from an earlier day.
    ///
    /// Records without `lastLogged` keep their flag: nothing says which day it
    /// belongs to.
    pub fn settle(&mut self, today: NaiveDate) {
        if self.completed_today && self.last_logged.map_or(false, |last| last != today) {
            self.completed_today = false;
        }
    }

    /// Flip today's completion, keeping the streak and counter in step.
    ///
    /// Completing extends the streak when the previous log was yesterday and
    /// restarts it otherwise; un-completing rolls both counters back by one.
    pub fn toggle(&mut self, today: NaiveDate) {
        self.settle(today);
        if self.completed_today {
            self.completed_today = false;
            self.current = self.current.saturating_sub(1);
            self.streak = self.streak.saturating_sub(1);
        } else {
            self.complete(today);
        }
    }

    /// Mark the habit done for `today`. No-op if it already is.
    pub fn complete(&mut self, today: NaiveDate) {
        self.settle(today);
        if self.completed_today {
            return;
        }
        self.completed_today = true;
        self.current = self.current.saturating_add(1);
        self.streak = match self.last_logged {
            // last == today: undone earlier today, which took one off
            Some(last) if last == today || last == today - Duration::days(1) => {
                self.streak.saturating_add(1)
            }
            _ => 1,
        };
        self.last_logged = Some(today);
    }

    /// Fields touched by a completion change, as a partial document.
    pub fn completion_patch(&self) -> Value {
        serde_json::json!({
            "completedToday": self.completed_today,
            "current": self.current,
            "streak": self.streak,
            "lastLogged": self.last_logged,
        })
    }
}

fn trimmed_min_two(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < 2 {
        return Err(ValidationError::new("too_short"));
    }
    Ok(())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitRequest {
    #[validate(custom(function = "trimmed_min_two", message = "Habit name must be at least 2 characters"))]
    pub name: String,
    #[validate(custom(function = "not_blank", message = "Category is required"))]
    pub category: String,
    #[validate(custom(function = "trimmed_min_two", message = "Goal must be at least 2 characters"))]
    pub goal: String,
    #[serde(rename = "type")]
    pub kind: HabitType,
    pub steps: Option<Value>,
    pub reminder: Option<String>,
}

impl CreateHabitRequest {
    pub fn into_habit(self, id: String, created_at: i64) -> Habit {
        Habit {
            id,
            name: self.name.trim().to_string(),
            category: self.category,
            goal: self.goal.trim().to_string(),
            kind: self.kind,
            steps: self.steps,
            reminder: self.reminder,
            created_at,
            ..Habit::default()
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateHabitRequest {
    #[validate(custom(function = "trimmed_min_two", message = "Habit name must be at least 2 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank", message = "Category is required"))]
    pub category: Option<String>,
    #[validate(custom(function = "trimmed_min_two", message = "Goal must be at least 2 characters"))]
    pub goal: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<HabitType>,
    pub steps: Option<Value>,
    pub reminder: Option<String>,
}

impl UpdateHabitRequest {
    /// Only the fields present in the request, trimmed where the stored form is trimmed.
    pub fn to_patch(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        if let Some(name) = &self.name {
            patch.insert("name".into(), Value::String(name.trim().to_string()));
        }
        if let Some(category) = &self.category {
            patch.insert("category".into(), Value::String(category.clone()));
        }
        if let Some(goal) = &self.goal {
            patch.insert("goal".into(), Value::String(goal.trim().to_string()));
        }
        if let Some(kind) = self.kind {
            patch.insert("type".into(), serde_json::json!(kind));
        }
        if let Some(steps) = &self.steps {
            patch.insert("steps".into(), steps.clone());
        }
        if let Some(reminder) = &self.reminder {
            patch.insert("reminder".into(), Value::String(reminder.clone()));
        }
        patch
    }
}
