//! Tidewater - pollution-driven difficulty for an underwater game, in Bevy.
//!
//! Four pollution counters grow over time and drive everything else: spawn
//! pacing, hazard danger, prey populations, fog, the predator's senses and
//! the size of the fishing fleet.
//!
//! # Architecture
//!
//! The simulation is organized into plugins, each handling one concern:
//!
//! - **Core**: Game states, global events, configuration, errors
//! - **Pollution**: The four counters, difficulty curves, persistence
//! - **World**: Category index, spatial queries, effect sinks
//! - **Predator**: Patrol/chase/destroy/return state machine
//! - **Boats**: Fishing fleet and its area-damage nets
//! - **Spawner**: Trash hazards and fish
//!
//! Rendering, audio, UI and player input live outside this crate. They read
//! the events in [`core::events`] and drive the player entity.

pub mod boats;
pub mod core;
pub mod pollution;
pub mod predator;
pub mod spawner;
pub mod world;

use bevy::prelude::*;

/// Main simulation plugin that adds all sub-plugins.
pub struct TidewaterPlugin;

impl Plugin for TidewaterPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Pollution counters and difficulty
            .add_plugins(pollution::PollutionPlugin)

            // Category index and effects
            .add_plugins(world::WorldPlugin)

            // Agents
            .add_plugins(predator::PredatorPlugin)
            .add_plugins(boats::BoatPlugin)
            .add_plugins(spawner::SpawnerPlugin);
    }
}
