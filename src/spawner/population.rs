//! Trash and fish population rules.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

/// Spawner tuning.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Trash spawn interval range in seconds, before pollution scaling
    pub trash_interval_min: f32,
    pub trash_interval_max: f32,
    pub max_trash: usize,
    /// Fish population with clean water
    pub fish_base_count: u32,
    /// Opposite corners of the spawn volume
    pub spawn_box_min: (f32, f32, f32),
    pub spawn_box_max: (f32, f32, f32),
    /// Damage dealt by a hazard of danger 1.0
    pub max_hazard_damage: f32,
    /// Player distance at which a hazard hurts
    pub hazard_contact_radius: f32,
    pub trash_radius: f32,
    pub fish_radius: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            trash_interval_min: 3.0,
            trash_interval_max: 8.0,
            max_trash: 40,
            fish_base_count: 100,
            spawn_box_min: (-40.0, -30.0, -40.0),
            spawn_box_max: (40.0, -2.0, 40.0),
            max_hazard_damage: 25.0,
            hazard_contact_radius: 1.5,
            trash_radius: 0.8,
            fish_radius: 0.5,
        }
    }
}

impl SpawnerConfig {
    /// Uniform random point inside the spawn box. Corners may be given in
    /// any order.
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec3 {
        let a = Vec3::new(self.spawn_box_min.0, self.spawn_box_min.1, self.spawn_box_min.2);
        let b = Vec3::new(self.spawn_box_max.0, self.spawn_box_max.1, self.spawn_box_max.2);
        let (lo, hi) = (a.min(b), a.max(b));
        Vec3::new(
            axis(rng, lo.x, hi.x),
            axis(rng, lo.y, hi.y),
            axis(rng, lo.z, hi.z),
        )
    }
}

fn axis(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

/// How a hazard of the given danger hurts the player.
pub fn hazard_damage(danger: f32, max_damage: f32) -> f32 {
    danger.clamp(0.0, 1.0) * max_damage
}

/// One fish population correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FishAdjustment {
    /// Spawn this many to reach the cap
    Spawn(u32),
    /// Remove one fish; the rest go on later ticks
    DespawnOne,
    Hold,
}

/// Compare the live fish count to the allowed population.
pub fn fish_adjustment(current: u32, allowed: u32) -> FishAdjustment {
    match current.cmp(&allowed) {
        std::cmp::Ordering::Less => FishAdjustment::Spawn(allowed - current),
        std::cmp::Ordering::Greater => FishAdjustment::DespawnOne,
        std::cmp::Ordering::Equal => FishAdjustment::Hold,
    }
}

/// Countdown to the next trash spawn.
#[derive(Resource, Debug, Clone, Default)]
pub struct TrashTimer {
    remaining: f32,
}

impl TrashTimer {
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Count down by `dt`. Returns true when the timer has run out; the
    /// caller re-arms it.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }

    pub fn rearm(&mut self, interval: f32) {
        self.remaining = interval.max(0.0);
    }
}
