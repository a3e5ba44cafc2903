//! Global events used for cross-system communication.
//!
//! The simulation core never calls into presentation code. It publishes
//! these events and whoever cares (HUD, audio, camera, save system) reads
//! them with an `EventReader`. Effect events (`DamageEvent`, `DespawnEvent`,
//! `KillEvent`) flow the other way: the core requests an effect and the
//! effect systems in `world` apply it to the ECS.

use bevy::prelude::*;

use crate::pollution::PollutionScores;
use crate::predator::PredatorState;
use crate::world::Category;

/// Sent whenever the pollution counters change, by growth or overwrite.
#[derive(Event, Debug, Clone, Copy)]
pub struct PollutionChanged {
    pub scores: PollutionScores,
}

/// Sent when a predator finishes breaking an obstacle.
#[derive(Event, Debug, Clone, Copy)]
pub struct ObstacleDestroyed {
    /// The obstacle that was destroyed
    pub obstacle: Entity,
    /// The predator that destroyed it
    pub destroyed_by: Entity,
}

/// Sent on every predator state transition. Debug/UI only.
#[derive(Event, Debug, Clone, Copy)]
pub struct PredatorStateChanged {
    pub predator: Entity,
    pub state: PredatorState,
}

/// Sent whenever a boat is added to or removed from the fleet.
#[derive(Event, Debug, Clone)]
pub struct BoatPopulationChanged {
    /// All boats alive after the change, chasing boat last if present
    pub active: Vec<Entity>,
}

/// Sent when the player completes the current level.
#[derive(Event, Debug, Clone, Copy)]
pub struct LevelComplete;

/// Sent when an entity is added to the category index.
#[derive(Event, Debug, Clone, Copy)]
pub struct EntityRegistered {
    pub entity: Entity,
    pub category: Category,
}

/// Request to reduce an entity's health.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: Entity,
    /// Damage amount
    pub amount: f32,
}

/// Request to remove an entity from the world.
#[derive(Event, Debug, Clone, Copy)]
pub struct DespawnEvent {
    pub entity: Entity,
}

/// Request to kill an entity outright (health to zero).
#[derive(Event, Debug, Clone, Copy)]
pub struct KillEvent {
    /// Entity that dies
    pub target: Entity,
    /// Entity responsible, if any
    pub killed_by: Option<Entity>,
}

/// Request to overwrite the pollution counters, e.g. from a quiz result.
#[derive(Event, Debug, Clone, Copy)]
pub struct SetPollutionScores {
    pub scores: PollutionScores,
}

/// Request to start a fresh session: pollution back to zero.
#[derive(Event, Debug, Clone, Copy)]
pub struct RestartSession;
