//! Boat population control.
//!
//! The fleet moves toward its target count one boat per reconcile call so a
//! pollution jump never spawns or removes a wave of boats at once. Placement
//! is best-effort: a bounded random search that settles for its last
//! candidate rather than blocking.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;
use std::f32::consts::TAU;

use crate::core::{SceneTier, SimError};

/// Fleet tuning and scene layout.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct FleetConfig {
    /// Points boats spawn at and cruise between
    pub path_points: Vec<(f32, f32, f32)>,
    pub min_distance_between_boats: f32,
    /// Random placement tries before settling
    pub placement_attempts: u32,
    /// Chasing boat spawn band around the target
    pub chaser_min_distance: f32,
    pub chaser_max_distance: f32,
    pub chaser_attempts: u32,
    /// Seconds between reconcile steps
    pub reconcile_interval: f32,
    pub boat_speed: f32,
    pub chaser_speed: f32,
    /// Distance at which a boat counts as having reached its path point
    pub arrival_distance: f32,
    /// Bounding radius registered for each boat
    pub boat_radius: f32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            path_points: Vec::new(),
            min_distance_between_boats: 12.0,
            placement_attempts: 50,
            chaser_min_distance: 40.0,
            chaser_max_distance: 60.0,
            chaser_attempts: 10,
            reconcile_interval: 2.0,
            boat_speed: 4.0,
            chaser_speed: 7.0,
            arrival_distance: 2.0,
            boat_radius: 3.0,
        }
    }
}

/// One boat the fleet tracks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoatSlot {
    pub entity: Entity,
    pub position: Vec3,
}

/// Result of a placement search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Every attempt violated the spacing rule and the fallback was taken
    pub exhausted: bool,
}

/// One reconcile step for the caller to carry out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FleetAction {
    /// Spawn a normal boat, then report it with `add_boat`
    SpawnBoat(Placement),
    /// This boat has already been dropped from the fleet; despawn it
    DespawnBoat(Entity),
    /// Spawn the chasing boat, then report it with `set_chaser`
    SpawnChaser(Placement),
    /// The chasing boat has already been dropped; despawn it
    DespawnChaser(Entity),
}

/// The scene's boats.
#[derive(Resource, Debug, Clone, Default)]
pub struct BoatFleet {
    boats: Vec<BoatSlot>,
    chaser: Option<BoatSlot>,
    path_points: Vec<Vec3>,
    min_distance: f32,
    placement_attempts: u32,
    chaser_band: (f32, f32),
    chaser_attempts: u32,
}

impl BoatFleet {
    /// Build a fleet for a scene. Fails without path points, which leaves
    /// the scene without boats.
    pub fn new(config: &FleetConfig) -> Result<Self, SimError> {
        if config.path_points.is_empty() {
            return Err(SimError::ConfigurationError("fleet has no path points".into()));
        }

        let min = config.chaser_min_distance.max(0.0);
        let max = config.chaser_max_distance.max(min);

        Ok(Self {
            boats: Vec::new(),
            chaser: None,
            path_points: config
                .path_points
                .iter()
                .map(|&(x, y, z)| Vec3::new(x, y, z))
                .collect(),
            min_distance: config.min_distance_between_boats,
            placement_attempts: config.placement_attempts.max(1),
            chaser_band: (min, max),
            chaser_attempts: config.chaser_attempts.max(1),
        })
    }

    pub fn boats(&self) -> &[BoatSlot] {
        &self.boats
    }

    pub fn chaser(&self) -> Option<BoatSlot> {
        self.chaser
    }

    pub fn path_points(&self) -> &[Vec3] {
        &self.path_points
    }

    /// Every live boat, chasing boat last.
    pub fn active_handles(&self) -> Vec<Entity> {
        self.boats
            .iter()
            .chain(self.chaser.iter())
            .map(|slot| slot.entity)
            .collect()
    }

    pub fn add_boat(&mut self, entity: Entity, position: Vec3) {
        self.boats.push(BoatSlot { entity, position });
    }

    pub fn set_chaser(&mut self, entity: Entity, position: Vec3) {
        self.chaser = Some(BoatSlot { entity, position });
    }

    pub fn update_position(&mut self, entity: Entity, position: Vec3) {
        if let Some(slot) = self
            .boats
            .iter_mut()
            .chain(self.chaser.iter_mut())
            .find(|slot| slot.entity == entity)
        {
            slot.position = position;
        }
    }

    /// Forget boats that no longer exist. Returns whether any were dropped.
    pub fn retain_alive(&mut self, mut alive: impl FnMut(Entity) -> bool) -> bool {
        let before = self.boats.len() + self.chaser.iter().count();
        self.boats.retain(|slot| alive(slot.entity));
        if self.chaser.is_some_and(|slot| !alive(slot.entity)) {
            self.chaser = None;
        }
        before != self.boats.len() + self.chaser.iter().count()
    }

    /// A random path point for a boat to cruise to.
    pub fn random_path_point(&self, rng: &mut impl Rng) -> Option<Vec3> {
        if self.path_points.is_empty() {
            return None;
        }
        Some(self.path_points[rng.gen_range(0..self.path_points.len())])
    }

    fn clear_of_boats(&self, candidate: Vec3) -> bool {
        self.boats
            .iter()
            .chain(self.chaser.iter())
            .all(|slot| slot.position.distance(candidate) >= self.min_distance)
    }

    /// Pick a path point away from every boat, or the last one tried.
    pub fn place_boat(&self, rng: &mut impl Rng) -> Placement {
        let mut candidate = self.path_points.first().copied().unwrap_or(Vec3::ZERO);
        for _ in 0..self.placement_attempts {
            let Some(point) = self.random_path_point(rng) else {
                break;
            };
            candidate = point;
            if self.clear_of_boats(candidate) {
                return Placement {
                    position: candidate,
                    exhausted: false,
                };
            }
        }
        Placement {
            position: candidate,
            exhausted: true,
        }
    }

    /// Pick a point in the annulus around `target`, or one beyond it.
    pub fn place_chaser(&self, target: Vec3, rng: &mut impl Rng) -> Placement {
        let (min, max) = self.chaser_band;
        let ring = |angle: f32, distance: f32| target + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance;

        for _ in 0..self.chaser_attempts {
            let angle = rng.gen_range(0.0..TAU);
            let distance = if max > min { rng.gen_range(min..=max) } else { min };
            let candidate = ring(angle, distance);
            if self.clear_of_boats(candidate) {
                return Placement {
                    position: candidate,
                    exhausted: false,
                };
            }
        }

        let angle = rng.gen_range(0.0..TAU);
        Placement {
            position: ring(angle, max + self.min_distance),
            exhausted: true,
        }
    }

    /// One step toward `target` normal boats.
    pub fn reconcile(&mut self, target: usize, rng: &mut impl Rng) -> Option<FleetAction> {
        if self.boats.len() > target {
            let slot = self.boats.remove(0);
            return Some(FleetAction::DespawnBoat(slot.entity));
        }
        if self.boats.len() < target {
            return Some(FleetAction::SpawnBoat(self.place_boat(rng)));
        }
        None
    }

    /// Keep at most one chasing boat, and only in the hardest tier.
    ///
    /// `target` is the position the chaser hunts; without one no chaser is
    /// spawned.
    pub fn reconcile_chaser(
        &mut self,
        tier: SceneTier,
        target: Option<Vec3>,
        rng: &mut impl Rng,
    ) -> Result<Option<FleetAction>, SimError> {
        match (tier, self.chaser) {
            (SceneTier::Hard, Some(_)) => Ok(None),
            (SceneTier::Hard, None) => {
                let target = target
                    .ok_or_else(|| SimError::MissingReference("chasing boat has no target".into()))?;
                Ok(Some(FleetAction::SpawnChaser(self.place_chaser(target, rng))))
            }
            (_, Some(slot)) => {
                self.chaser = None;
                Ok(Some(FleetAction::DespawnChaser(slot.entity)))
            }
            (_, None) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(points: Vec<(f32, f32, f32)>) -> FleetConfig {
        FleetConfig {
            path_points: points,
            min_distance_between_boats: 10.0,
            ..default()
        }
    }

    fn spread_points() -> Vec<(f32, f32, f32)> {
        (0..20).map(|i| (i as f32 * 50.0, 0.0, 0.0)).collect()
    }

    /// Apply one action as the plugin would.
    fn apply(fleet: &mut BoatFleet, action: FleetAction, next_id: &mut u32) {
        match action {
            FleetAction::SpawnBoat(placement) => {
                fleet.add_boat(Entity::from_raw(*next_id), placement.position);
                *next_id += 1;
            }
            FleetAction::SpawnChaser(placement) => {
                fleet.set_chaser(Entity::from_raw(*next_id), placement.position);
                *next_id += 1;
            }
            FleetAction::DespawnBoat(_) | FleetAction::DespawnChaser(_) => {}
        }
    }

    #[test]
    fn test_requires_path_points() {
        assert!(matches!(
            BoatFleet::new(&config(Vec::new())),
            Err(SimError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_reconcile_is_one_step_per_call() {
        let mut fleet = BoatFleet::new(&config(spread_points())).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut next_id = 1;

        let action = fleet.reconcile(2, &mut rng).unwrap();
        apply(&mut fleet, action, &mut next_id);
        assert_eq!(fleet.boats().len(), 1);

        let action = fleet.reconcile(2, &mut rng).unwrap();
        apply(&mut fleet, action, &mut next_id);
        assert_eq!(fleet.boats().len(), 2);

        assert_eq!(fleet.reconcile(2, &mut rng), None);
    }

    #[test]
    fn test_reconcile_removes_first_boat() {
        let mut fleet = BoatFleet::new(&config(spread_points())).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        fleet.add_boat(Entity::from_raw(1), Vec3::ZERO);
        fleet.add_boat(Entity::from_raw(2), Vec3::X * 100.0);
        fleet.add_boat(Entity::from_raw(3), Vec3::X * 200.0);

        assert_eq!(
            fleet.reconcile(1, &mut rng),
            Some(FleetAction::DespawnBoat(Entity::from_raw(1)))
        );
        assert_eq!(fleet.boats().len(), 2);
    }

    #[test]
    fn test_placement_respects_spacing() {
        let mut fleet = BoatFleet::new(&config(spread_points())).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut next_id = 1;
        for _ in 0..8 {
            let action = fleet.reconcile(8, &mut rng).unwrap();
            if let FleetAction::SpawnBoat(placement) = action {
                assert!(!placement.exhausted);
            }
            apply(&mut fleet, action, &mut next_id);
        }

        let boats = fleet.boats();
        for (i, a) in boats.iter().enumerate() {
            for b in &boats[i + 1..] {
                assert!(a.position.distance(b.position) >= 10.0);
            }
        }
    }

    #[test]
    fn test_placement_settles_when_exhausted() {
        let mut fleet = BoatFleet::new(&config(vec![(5.0, 0.0, 5.0)])).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        fleet.add_boat(Entity::from_raw(1), Vec3::new(5.0, 0.0, 5.0));

        let placement = fleet.place_boat(&mut rng);
        assert!(placement.exhausted);
        assert_eq!(placement.position, Vec3::new(5.0, 0.0, 5.0));
    }

    #[test]
    fn test_chaser_only_in_hard_tier_and_capped() {
        let mut fleet = BoatFleet::new(&config(spread_points())).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut next_id = 1;
        let target = Some(Vec3::ZERO);

        assert_eq!(fleet.reconcile_chaser(SceneTier::Medium, target, &mut rng), Ok(None));

        let action = fleet
            .reconcile_chaser(SceneTier::Hard, target, &mut rng)
            .unwrap()
            .unwrap();
        apply(&mut fleet, action, &mut next_id);
        assert!(fleet.chaser().is_some());
        assert_eq!(fleet.reconcile_chaser(SceneTier::Hard, target, &mut rng), Ok(None));

        let chaser = fleet.chaser().unwrap().entity;
        assert_eq!(
            fleet.reconcile_chaser(SceneTier::Easy, target, &mut rng),
            Ok(Some(FleetAction::DespawnChaser(chaser)))
        );
        assert!(fleet.chaser().is_none());
    }

    #[test]
    fn test_chaser_spawns_in_band() {
        let fleet = BoatFleet::new(&config(spread_points())).unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        let target = Vec3::new(10.0, -3.0, 10.0);
        for _ in 0..20 {
            let placement = fleet.place_chaser(target, &mut rng);
            assert!(!placement.exhausted);
            let offset = placement.position - target;
            assert_eq!(offset.y, 0.0);
            let distance = offset.length();
            assert!((40.0 - 1e-3..=60.0 + 1e-3).contains(&distance));
        }
    }

    #[test]
    fn test_chaser_falls_back_outside_band() {
        let mut fleet = BoatFleet::new(&FleetConfig {
            path_points: spread_points(),
            min_distance_between_boats: 200.0,
            ..default()
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        fleet.add_boat(Entity::from_raw(1), Vec3::ZERO);

        let placement = fleet.place_chaser(Vec3::ZERO, &mut rng);
        assert!(placement.exhausted);
        let distance = placement.position.length();
        assert!((distance - 260.0).abs() < 1e-2);
    }

    #[test]
    fn test_chaser_without_target_is_missing_reference() {
        let mut fleet = BoatFleet::new(&config(spread_points())).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        assert!(matches!(
            fleet.reconcile_chaser(SceneTier::Hard, None, &mut rng),
            Err(SimError::MissingReference(_))
        ));
    }

    #[test]
    fn test_retain_alive_prunes() {
        let mut fleet = BoatFleet::new(&config(spread_points())).unwrap();
        fleet.add_boat(Entity::from_raw(1), Vec3::ZERO);
        fleet.add_boat(Entity::from_raw(2), Vec3::ZERO);
        fleet.set_chaser(Entity::from_raw(3), Vec3::ZERO);

        assert!(fleet.retain_alive(|e| e == Entity::from_raw(2)));
        assert_eq!(fleet.active_handles(), vec![Entity::from_raw(2)]);
        assert!(!fleet.retain_alive(|_| true));
    }
}
