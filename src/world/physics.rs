//! Rapier-backed implementation of the world query port.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::registry::EntityIndex;
use super::spatial::{Category, OverlapHit, RayHit, SpatialQuery};

/// World queries for systems: shape overlaps and rays go through Rapier,
/// categories and positions come from the `EntityIndex`.
///
/// Colliders that are not in the index are ignored. Without a physics
/// context (headless runs) every query falls back to the index bounds.
#[derive(SystemParam)]
pub struct PhysicsWorld<'w, 's> {
    rapier_context: Query<'w, 's, &'static RapierContext>,
    index: Res<'w, EntityIndex>,
}

impl SpatialQuery for PhysicsWorld<'_, '_> {
    fn overlap_sphere(&self, center: Vec3, radius: f32, categories: &[Category]) -> Vec<OverlapHit> {
        let Ok(context) = self.rapier_context.get_single() else {
            return self.index.overlap_sphere(center, radius, categories);
        };

        let shape = Collider::ball(radius);
        let mut hits = Vec::new();

        context.intersections_with_shape(
            center,
            Quat::IDENTITY,
            &shape,
            QueryFilter::default(),
            |hit_entity| {
                if let Some(category) = self.index.category_of(hit_entity) {
                    if categories.is_empty() || categories.contains(&category) {
                        hits.push(OverlapHit {
                            entity: hit_entity,
                            category,
                        });
                    }
                }
                true // Continue checking other entities
            },
        );

        hits
    }

    fn raycast(&self, from: Vec3, to: Vec3, exclude: &[Entity]) -> Option<RayHit> {
        let Ok(context) = self.rapier_context.get_single() else {
            return self.index.raycast(from, to, exclude);
        };

        let delta = to - from;
        let max_distance = delta.length();
        if max_distance <= f32::EPSILON {
            return None;
        }
        let direction = delta / max_distance;

        let skip = |entity: Entity| !exclude.contains(&entity);
        let filter = QueryFilter::default().exclude_sensors().predicate(&skip);

        context
            .cast_ray(from, direction, max_distance, true, filter)
            .map(|(entity, toi)| RayHit {
                entity,
                point: from + direction * toi,
            })
    }

    fn find_nearest(&self, category: Category, from: Vec3) -> Option<Entity> {
        self.index.find_nearest(category, from)
    }

    fn position_of(&self, entity: Entity) -> Option<Vec3> {
        self.index.position_of(entity)
    }

    fn category_of(&self, entity: Entity) -> Option<Category> {
        self.index.category_of(entity)
    }
}
