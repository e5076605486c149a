//! Pure analytics core: windowing, scoring, aggregation and trends.
//!
//! Nothing in here touches storage or the clock; callers pass snapshots and `now`.

pub mod aggregate;
pub mod score;
pub mod stats;
pub mod suggest;
pub mod trend;
pub mod window;

pub use aggregate::{aggregate_habits, aggregate_moods, select_extremes, HabitSummary, MoodSummary};
pub use score::{compute_wellness_score, score_breakdown, ScoreBreakdown};
pub use trend::{derive_insights, score_series, Insights, ScorePoint, Trend, TrendDirection};
pub use window::{filter_by_window, partition_by_window, TimeWindow};
