//! Components shared by every simulation entity.

use bevy::prelude::*;

use super::spatial::Category;

/// Marker component for the player.
#[derive(Component)]
pub struct Player;

/// Puts an entity into the category index. Scene setup adds this; the
/// tracking systems register, update and unregister the entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct Tagged {
    pub category: Category,
    /// Bounding sphere radius used by index queries
    pub radius: f32,
}

impl Tagged {
    pub fn new(category: Category, radius: f32) -> Self {
        Self { category, radius }
    }
}

/// Player concealment flag, set by the presentation layer while the player
/// hides. `behind` is the obstacle providing cover.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hiding {
    pub behind: Option<Entity>,
}

/// Component for entities that can take damage.
#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            maximum: max,
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.current);
        self.current -= actual;
        actual
    }

    pub fn kill(&mut self) {
        self.current = 0.0;
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}
