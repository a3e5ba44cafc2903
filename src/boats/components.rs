//! Boat components.

use bevy::prelude::*;

/// Marker for fishing boats managed by the fleet.
#[derive(Component)]
pub struct Boat;

/// Marker for the single boat that hunts the player.
#[derive(Component)]
pub struct ChasingBoat;

/// Where a boat is cruising to.
#[derive(Component, Debug, Clone, Copy)]
pub struct BoatCourse {
    pub destination: Vec3,
}
