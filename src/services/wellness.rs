//! Reads a user's records, runs the analytics core, and performs the one write.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::habit::Habit;
use crate::models::mood::MoodEntry;
use crate::models::stats::DailyStats;
use crate::models::wellness::WellnessScore;
use crate::store::{paths, RecordStore, StoreResult};
use crate::wellness::aggregate::{best_streak, top_performers, HabitExtremes, HabitStat};
use crate::wellness::window::{partition_by_window, Timestamped};
use crate::wellness::{
    aggregate_habits, aggregate_moods, compute_wellness_score, derive_insights, score_series,
    select_extremes, stats::recompute_stats, suggest::suggest, HabitSummary, Insights,
    MoodSummary, ScorePoint, TimeWindow,
};

/// Habits shown in the performance ranking.
const TOP_HABITS: usize = 5;

/// Everything the engine reads for one user, captured at read time.
#[derive(Debug, Clone, Default)]
pub struct UserSnapshot {
    pub habits: Vec<Habit>,
    pub moods: BTreeMap<String, MoodEntry>,
    pub stats: DailyStats,
    pub scores: BTreeMap<String, WellnessScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub range: TimeWindow,
    pub scores: Vec<ScorePoint>,
    pub habits: HabitSummary,
    pub top_habits: Vec<HabitStat>,
    pub best_streak: u32,
    pub extremes: Option<HabitExtremes>,
    pub moods: MoodSummary,
    pub stats: DailyStats,
    pub insights: Insights,
    pub suggestions: Vec<String>,
}

/// Decode each child of a collection, skipping (and logging) children that
/// are not JSON objects.
fn decode_children<T: DeserializeOwned>(path: &str, children: Option<Map<String, Value>>) -> BTreeMap<String, T> {
    let mut records = BTreeMap::new();
    for (key, value) in children.unwrap_or_default() {
        if !value.is_object() {
            tracing::warn!(path = %path, key = %key, "Skipping malformed record");
            continue;
        }
        match serde_json::from_value::<T>(value) {
            Ok(record) => {
                records.insert(key, record);
            }
            Err(e) => tracing::warn!(path = %path, key = %key, error = %e, "Skipping malformed record"),
        }
    }
    records
}

fn windowed<V: Timestamped + Clone>(
    uid: &str,
    collection: &str,
    records: &BTreeMap<String, V>,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> BTreeMap<String, V> {
    let (kept, undated) = partition_by_window(records, window, now);
    for key in undated {
        tracing::warn!(user_id = %uid, collection, key = %key, "Dropping record with unparseable date");
    }
    kept
}

#[derive(Clone)]
pub struct WellnessService {
    store: Arc<dyn RecordStore>,
}

impl WellnessService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn load_habits(&self, uid: &str) -> StoreResult<Vec<Habit>> {
        let path = paths::habits(uid);
        let children = self.store.read_all(&path).await?;
        Ok(decode_children::<Habit>(&path, children)
            .into_iter()
            .map(|(id, mut habit)| {
                habit.id = id;
                habit
            })
            .collect())
    }

    /// Habits as of `today`: completion flags from earlier days are cleared.
    pub async fn load_habits_on(&self, uid: &str, today: NaiveDate) -> StoreResult<Vec<Habit>> {
        let mut habits = self.load_habits(uid).await?;
        for habit in habits.iter_mut() {
            habit.settle(today);
        }
        Ok(habits)
    }

    pub async fn load_moods(&self, uid: &str) -> StoreResult<BTreeMap<String, MoodEntry>> {
        let path = paths::moods(uid);
        let children = self.store.read_all(&path).await?;
        let mut moods = decode_children::<MoodEntry>(&path, children);
        for (key, entry) in moods.iter_mut() {
            entry.date_key = key.clone();
        }
        Ok(moods)
    }

    pub async fn load_stats(&self, uid: &str) -> StoreResult<DailyStats> {
        let path = paths::stats(uid);
        Ok(match self.store.read_path(&path).await? {
            Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(path = %path, error = %e, "Ignoring malformed stats");
                DailyStats::default()
            }),
            _ => DailyStats::default(),
        })
    }

    pub async fn load_scores(&self, uid: &str) -> StoreResult<BTreeMap<String, WellnessScore>> {
        let path = paths::wellness_scores(uid);
        let children = self.store.read_all(&path).await?;
        Ok(decode_children(&path, children))
    }

    /// The four collections are read concurrently; a write landing between
    /// reads can leave the snapshot mixed.
    pub async fn load_snapshot(&self, uid: &str) -> StoreResult<UserSnapshot> {
        let (habits, moods, stats, scores) = tokio::try_join!(
            self.load_habits(uid),
            self.load_moods(uid),
            self.load_stats(uid),
            self.load_scores(uid),
        )?;
        Ok(UserSnapshot {
            habits,
            moods,
            stats,
            scores,
        })
    }

    async fn load_snapshot_on(&self, uid: &str, today: NaiveDate) -> StoreResult<UserSnapshot> {
        let mut snapshot = self.load_snapshot(uid).await?;
        for habit in snapshot.habits.iter_mut() {
            habit.settle(today);
        }
        Ok(snapshot)
    }

    /// Refresh the cached stats and today's wellness score.
    ///
    /// The score uses every mood ever logged; windows only apply to the
    /// analytics views.
    pub async fn recompute(&self, uid: &str, now: DateTime<Utc>) -> StoreResult<WellnessScore> {
        let snapshot = self.load_snapshot_on(uid, now.date_naive()).await?;

        let recent_scores = windowed(uid, "wellnessScores", &snapshot.scores, TimeWindow::Week, now);
        let stats = recompute_stats(&snapshot.habits, &snapshot.stats, &score_series(&recent_scores));

        let moods: Vec<MoodEntry> = snapshot.moods.into_values().collect();
        let score = compute_wellness_score(&snapshot.habits, &moods, &stats);
        let today = now.date_naive();
        let record = WellnessScore::new(
            today,
            score,
            snapshot.habits.len() as u32,
            now.timestamp_millis(),
        );

        self.store
            .upsert(&paths::stats(uid), serde_json::to_value(&stats)?)
            .await?;
        self.store
            .upsert(&paths::wellness_score(uid, today), serde_json::to_value(&record)?)
            .await?;

        tracing::info!(user_id = %uid, date = %today, score, "Wellness score recomputed");
        Ok(record)
    }

    pub async fn score_history(
        &self,
        uid: &str,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ScorePoint>> {
        let scores = self.load_scores(uid).await?;
        Ok(score_series(&windowed(uid, "wellnessScores", &scores, window, now)))
    }

    pub async fn analytics(
        &self,
        uid: &str,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> StoreResult<AnalyticsReport> {
        let snapshot = self.load_snapshot_on(uid, now.date_naive()).await?;

        let series = score_series(&windowed(uid, "wellnessScores", &snapshot.scores, window, now));
        let moods: Vec<MoodEntry> = windowed(uid, "moods", &snapshot.moods, window, now)
            .into_values()
            .collect();

        let habits = aggregate_habits(&snapshot.habits);
        let top_habits = top_performers(&habits, TOP_HABITS);
        let insights = derive_insights(&series, &habits, &snapshot.stats);

        Ok(AnalyticsReport {
            range: window,
            best_streak: best_streak(&top_habits),
            extremes: select_extremes(&snapshot.habits),
            moods: aggregate_moods(&moods),
            suggestions: suggest(&snapshot.habits),
            scores: series,
            top_habits,
            habits,
            stats: snapshot.stats,
            insights,
        })
    }
}
