//! Spawner components.

use bevy::prelude::*;

/// Marker for trash pieces.
#[derive(Component)]
pub struct Trash;

/// Marker for fish.
#[derive(Component)]
pub struct Fish;

/// Hurts the player on contact, once.
#[derive(Component, Debug, Clone, Copy)]
pub struct Hazard {
    /// Severity in [0, 1]
    pub danger: f32,
    /// Set once the hazard has dealt its damage
    pub spent: bool,
}

impl Hazard {
    pub fn new(danger: f32) -> Self {
        Self {
            danger: danger.clamp(0.0, 1.0),
            spent: false,
        }
    }
}
