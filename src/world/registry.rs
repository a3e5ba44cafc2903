//! Category index of simulation entities.
//!
//! Replaces tag-based lookups: scene setup registers entities with a
//! category, the tracking systems keep positions fresh, and queries run
//! against simple sphere bounds.

use bevy::prelude::*;
use std::collections::{BTreeSet, HashMap};

use super::spatial::{Category, OverlapHit, RayHit, SpatialQuery};

/// Bounds and kind of one registered entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    pub category: Category,
    pub position: Vec3,
    /// Bounding sphere radius
    pub radius: f32,
}

/// All registered entities, keyed by handle and by category.
#[derive(Resource, Debug, Default)]
pub struct EntityIndex {
    entries: HashMap<Entity, IndexEntry>,
    by_category: HashMap<Category, BTreeSet<Entity>>,
}

impl EntityIndex {
    /// Add or replace an entity. Returns `true` if it was new.
    pub fn register(&mut self, entity: Entity, category: Category, position: Vec3, radius: f32) -> bool {
        let previous = self.entries.insert(
            entity,
            IndexEntry {
                category,
                position,
                radius: radius.max(0.0),
            },
        );

        if let Some(old) = previous {
            if old.category != category {
                self.remove_from_category(entity, old.category);
            }
        }
        self.by_category.entry(category).or_default().insert(entity);

        previous.is_none()
    }

    pub fn unregister(&mut self, entity: Entity) -> Option<IndexEntry> {
        let entry = self.entries.remove(&entity)?;
        self.remove_from_category(entity, entry.category);
        Some(entry)
    }

    fn remove_from_category(&mut self, entity: Entity, category: Category) {
        if let Some(set) = self.by_category.get_mut(&category) {
            set.remove(&entity);
        }
    }

    pub fn update_position(&mut self, entity: Entity, position: Vec3) {
        if let Some(entry) = self.entries.get_mut(&entity) {
            entry.position = position;
        }
    }

    pub fn get(&self, entity: Entity) -> Option<&IndexEntry> {
        self.entries.get(&entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    /// Entities of one category, in handle order.
    pub fn entities_in(&self, category: Category) -> impl Iterator<Item = Entity> + '_ {
        self.by_category
            .get(&category)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn count(&self, category: Category) -> usize {
        self.by_category.get(&category).map_or(0, |set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entry distance along a normalized ray to a sphere, if within `max`.
fn ray_sphere(origin: Vec3, dir: Vec3, max: f32, center: Vec3, radius: f32) -> Option<f32> {
    let m = origin - center;
    let b = m.dot(dir);
    let c = m.length_squared() - radius * radius;

    // Outside and pointing away
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()).max(0.0);
    (t <= max).then_some(t)
}

impl SpatialQuery for EntityIndex {
    fn overlap_sphere(&self, center: Vec3, radius: f32, categories: &[Category]) -> Vec<OverlapHit> {
        let mut hits: Vec<OverlapHit> = self
            .entries
            .iter()
            .filter(|(_, entry)| categories.is_empty() || categories.contains(&entry.category))
            .filter(|(_, entry)| entry.position.distance(center) <= radius + entry.radius)
            .map(|(&entity, entry)| OverlapHit {
                entity,
                category: entry.category,
            })
            .collect();
        hits.sort_by_key(|hit| hit.entity);
        hits
    }

    fn raycast(&self, from: Vec3, to: Vec3, exclude: &[Entity]) -> Option<RayHit> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        let dir = delta / length;

        self.entries
            .iter()
            .filter(|(entity, entry)| entry.category.blocks_rays() && !exclude.contains(*entity))
            .filter_map(|(&entity, entry)| {
                ray_sphere(from, dir, length, entry.position, entry.radius).map(|t| (entity, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(entity, t)| RayHit {
                entity,
                point: from + dir * t,
            })
    }

    fn find_nearest(&self, category: Category, from: Vec3) -> Option<Entity> {
        self.entities_in(category)
            .filter_map(|entity| self.entries.get(&entity).map(|e| (entity, e.position.distance_squared(from))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, _)| entity)
    }

    fn position_of(&self, entity: Entity) -> Option<Vec3> {
        self.entries.get(&entity).map(|entry| entry.position)
    }

    fn category_of(&self, entity: Entity) -> Option<Category> {
        self.entries.get(&entity).map(|entry| entry.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    #[test]
    fn test_register_and_recategorize() {
        let mut index = EntityIndex::default();
        assert!(index.register(entity(1), Category::Fish, Vec3::ZERO, 0.5));
        assert!(!index.register(entity(1), Category::Trash, Vec3::ZERO, 0.5));
        assert_eq!(index.count(Category::Fish), 0);
        assert_eq!(index.count(Category::Trash), 1);

        assert!(index.unregister(entity(1)).is_some());
        assert!(index.is_empty());
        assert_eq!(index.count(Category::Trash), 0);
    }

    #[test]
    fn test_overlap_filters_category_and_distance() {
        let mut index = EntityIndex::default();
        index.register(entity(1), Category::Fish, Vec3::new(1.0, 0.0, 0.0), 0.5);
        index.register(entity(2), Category::Trash, Vec3::new(0.0, 1.0, 0.0), 0.5);
        index.register(entity(3), Category::Fish, Vec3::new(10.0, 0.0, 0.0), 0.5);

        let hits = index.overlap_sphere(Vec3::ZERO, 1.0, &[Category::Fish]);
        assert_eq!(hits, vec![OverlapHit { entity: entity(1), category: Category::Fish }]);

        let all = index.overlap_sphere(Vec3::ZERO, 1.0, &[]);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_raycast_returns_closest_blocker() {
        let mut index = EntityIndex::default();
        index.register(entity(1), Category::UnbreakableObstacle, Vec3::new(5.0, 0.0, 0.0), 1.0);
        index.register(entity(2), Category::BreakableObstacle, Vec3::new(3.0, 0.0, 0.0), 1.0);

        let hit = index.raycast(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), &[]).unwrap();
        assert_eq!(hit.entity, entity(2));
        assert!((hit.point.x - 2.0).abs() < 1e-4);

        let skipped = index.raycast(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), &[entity(2)]).unwrap();
        assert_eq!(skipped.entity, entity(1));

        assert!(index.raycast(Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0), &[]).is_none());
        assert!(index.raycast(Vec3::ZERO, Vec3::ZERO, &[]).is_none());
    }

    #[test]
    fn test_raycast_passes_through_fish_and_trash() {
        let mut index = EntityIndex::default();
        index.register(entity(1), Category::Fish, Vec3::new(3.0, 0.0, 0.0), 1.0);
        index.register(entity(2), Category::Trash, Vec3::new(5.0, 0.0, 0.0), 1.0);
        assert!(index.raycast(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), &[]).is_none());
    }

    #[test]
    fn test_raycast_stops_at_segment_end() {
        let mut index = EntityIndex::default();
        index.register(entity(1), Category::UnbreakableObstacle, Vec3::new(8.0, 0.0, 0.0), 1.0);
        assert!(index.raycast(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), &[]).is_none());
    }

    #[test]
    fn test_line_of_sight() {
        let mut index = EntityIndex::default();
        let target = entity(1);
        index.register(target, Category::Player, Vec3::new(10.0, 0.0, 0.0), 0.5);
        assert!(index.has_line_of_sight(Vec3::ZERO, target, &[]));

        index.register(entity(2), Category::UnbreakableObstacle, Vec3::new(5.0, 0.0, 0.0), 1.0);
        assert!(!index.has_line_of_sight(Vec3::ZERO, target, &[]));
        assert!(!index.has_line_of_sight(Vec3::ZERO, entity(99), &[]));
    }

    #[test]
    fn test_find_nearest() {
        let mut index = EntityIndex::default();
        index.register(entity(1), Category::Boat, Vec3::new(5.0, 0.0, 0.0), 1.0);
        index.register(entity(2), Category::Boat, Vec3::new(-2.0, 0.0, 0.0), 1.0);
        index.register(entity(3), Category::Fish, Vec3::new(0.5, 0.0, 0.0), 1.0);
        assert_eq!(index.find_nearest(Category::Boat, Vec3::ZERO), Some(entity(2)));
        assert_eq!(index.find_nearest(Category::Predator, Vec3::ZERO), None);
    }
}
