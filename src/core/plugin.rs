//! Core plugin that sets up game states, events, config and system ordering.

use bevy::prelude::*;

use super::config::{load_sim_config, SimConfig};
use super::events::*;
use super::states::*;

/// Per-frame ordering of the simulation.
///
/// Pollution is advanced first, derived difficulty is recomputed from it,
/// agents act on the committed values, then requested effects are applied.
/// Every set except `Difficulty` only runs in `InGame`, so score requests
/// made from menus still reach the snapshot.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimSet {
    Pollution,
    Difficulty,
    Agents,
    Effects,
}

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states and the scene tier
/// - Global events (PollutionChanged, KillEvent, etc.)
/// - Simulation config loading
/// - `SimSet` ordering, with gameplay sets gated on `GameState::InGame`
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Initialize game states
            .init_state::<GameState>()
            .init_resource::<SceneTier>()
            .init_resource::<SimConfig>()

            // Register global events
            .add_event::<PollutionChanged>()
            .add_event::<SetPollutionScores>()
            .add_event::<RestartSession>()
            .add_event::<ObstacleDestroyed>()
            .add_event::<PredatorStateChanged>()
            .add_event::<BoatPopulationChanged>()
            .add_event::<LevelComplete>()
            .add_event::<EntityRegistered>()
            .add_event::<DamageEvent>()
            .add_event::<DespawnEvent>()
            .add_event::<KillEvent>()

            .add_systems(Startup, load_sim_config)

            // Config is read synchronously at startup, so loading is done
            // by the time the first Loading frame runs.
            .add_systems(OnEnter(GameState::Loading), finish_loading)

            .configure_sets(
                Update,
                (
                    SimSet::Pollution,
                    SimSet::Difficulty,
                    SimSet::Agents,
                    SimSet::Effects,
                )
                    .chain(),
            )
            .configure_sets(
                Update,
                (SimSet::Pollution, SimSet::Agents, SimSet::Effects).run_if(in_state(GameState::InGame)),
            )

            .add_systems(Update, handle_level_complete.run_if(in_state(GameState::InGame)));
    }
}

/// Move from Loading into gameplay.
fn finish_loading(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}

/// Leave gameplay when the presentation layer reports the level done.
fn handle_level_complete(
    mut events: EventReader<LevelComplete>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if events.read().last().is_some() {
        info!("Level complete");
        next_state.set(GameState::LevelComplete);
    }
}
