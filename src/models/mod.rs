pub mod habit;
pub mod lenient;
pub mod mood;
pub mod stats;
pub mod wellness;
