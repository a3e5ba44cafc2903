//! The world query port the simulation core depends on.
//!
//! Core logic never touches the physics engine directly. It asks a
//! `SpatialQuery` which entities overlap a volume, whether a line is
//! blocked, where an entity is and what kind of thing it is. The game
//! implements it with Rapier (`PhysicsWorld`); tests use the plain
//! `EntityIndex`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of thing an entity is, for queries and effect routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Player,
    Trash,
    Fish,
    Boat,
    ChasingBoat,
    Predator,
    BreakableObstacle,
    UnbreakableObstacle,
}

impl Category {
    /// Whether rays stop at this kind of entity. Fish and trash are
    /// sensors and never block line of sight.
    pub fn blocks_rays(self) -> bool {
        !matches!(self, Category::Fish | Category::Trash)
    }
}

/// One entity found by an overlap query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapHit {
    pub entity: Entity,
    pub category: Category,
}

/// First thing a ray ran into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
}

/// World queries consumed by the simulation core.
pub trait SpatialQuery {
    /// Entities of the given categories overlapping a sphere. An empty
    /// category list matches everything.
    fn overlap_sphere(&self, center: Vec3, radius: f32, categories: &[Category]) -> Vec<OverlapHit>;

    /// First entity hit on the segment `from -> to`, skipping `exclude`.
    fn raycast(&self, from: Vec3, to: Vec3, exclude: &[Entity]) -> Option<RayHit>;

    /// Closest entity of a category to `from`.
    fn find_nearest(&self, category: Category, from: Vec3) -> Option<Entity>;

    /// Current position of an entity, `None` if it no longer exists.
    fn position_of(&self, entity: Entity) -> Option<Vec3>;

    /// Category of an entity, `None` if it is unknown.
    fn category_of(&self, entity: Entity) -> Option<Category>;

    /// Whether nothing but `target` blocks the segment from `from` to the
    /// target's position.
    fn has_line_of_sight(&self, from: Vec3, target: Entity, exclude: &[Entity]) -> bool {
        let Some(to) = self.position_of(target) else {
            return false;
        };
        match self.raycast(from, to, exclude) {
            None => true,
            Some(hit) => hit.entity == target,
        }
    }
}
