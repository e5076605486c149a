pub mod debounce;
pub mod wellness;

pub use debounce::RecomputeDebouncer;
pub use wellness::{AnalyticsReport, UserSnapshot, WellnessService};
