pub mod habits;
pub mod health;
pub mod moods;
pub mod wellness;
pub mod ws;
