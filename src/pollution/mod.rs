//! Pollution module - the four counters and the difficulty they drive.

pub mod difficulty;
pub mod persistence;
mod plugin;
mod state;

pub use difficulty::{DifficultyConfig, DifficultySnapshot, PredatorBase, PredatorParameters};
pub use persistence::{PollutionRecord, SavePath};
pub use plugin::*;
pub use state::{GrowthConfig, PollutionKind, PollutionScores, PollutionState, MAX_SCORE};
