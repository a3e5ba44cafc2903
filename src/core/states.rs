//! Game state definitions that control when the simulation runs.
//!
//! Simulation systems only run in `InGame`. The presentation layer decides
//! when to move between states; the core only ever requests `GameOver`
//! (player killed) and `LevelComplete`.

use bevy::prelude::*;

/// Main game states.
///
/// - Start in `Loading` while data files are read
/// - `InGame` runs the simulation
/// - `Paused` freezes the simulation but keeps the world
/// - `GameOver` when the player dies
/// - `LevelComplete` when the level's goal is reached
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - loading configuration and save data
    #[default]
    Loading,
    /// Active gameplay
    InGame,
    /// Game is paused
    Paused,
    /// Player has died
    GameOver,
    /// Level goal reached
    LevelComplete,
}

/// Difficulty tier of the current scene.
///
/// Chosen by scene setup code; drives the boat target count table and
/// whether a chasing boat may appear.
#[derive(Resource, Debug, Clone, Copy, Eq, PartialEq, Hash, Default, serde::Deserialize, serde::Serialize)]
pub enum SceneTier {
    #[default]
    Easy,
    Medium,
    Hard,
}
