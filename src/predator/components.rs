//! Predator components.

use bevy::prelude::*;

/// Marker for predator entities.
#[derive(Component)]
pub struct Predator;
