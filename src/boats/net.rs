//! Fishing net: a segmented cylinder dragged behind each boat.
//!
//! A detection pass stacks `segments` sphere overlaps from the bottom to the
//! top of the cylinder, merges the hits, and turns each unique hit into an
//! effect. Passes are throttled to one per `damage_interval`.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;

use crate::core::SimError;
use crate::world::{Category, SpatialQuery};

/// Net tuning.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct NetConfig {
    /// Distance behind the boat, along its flattened heading
    pub rear_offset: f32,
    /// Distance below the boat
    pub down_offset: f32,
    pub radius: f32,
    pub height: f32,
    /// Number of sphere samples, at least 2
    pub segments: u32,
    /// Seconds between detection passes
    pub damage_interval: f32,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            rear_offset: 6.0,
            down_offset: 5.0,
            radius: 3.0,
            height: 8.0,
            segments: 5,
            damage_interval: 0.5,
        }
    }
}

/// What a pass does to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetEffect {
    /// Player caught in the net
    Kill(Entity),
    /// Fish or trash scooped up
    Despawn(Entity),
}

/// Categories the net reacts to.
const NET_TARGETS: [Category; 3] = [Category::Player, Category::Fish, Category::Trash];

fn classify(entity: Entity, category: Category) -> Option<NetEffect> {
    match category {
        Category::Player => Some(NetEffect::Kill(entity)),
        Category::Fish | Category::Trash => Some(NetEffect::Despawn(entity)),
        _ => None,
    }
}

/// Vertical cylinder geometry for one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetCylinder {
    pub center: Vec3,
    pub bottom: Vec3,
    pub top: Vec3,
}

/// Net state attached to a boat.
#[derive(Component, Debug, Clone)]
pub struct NetVolume {
    config: NetConfig,
    last_fired: Option<f64>,
}

impl NetVolume {
    pub fn new(config: NetConfig) -> Result<Self, SimError> {
        if config.segments < 2 {
            return Err(SimError::ConfigurationError(format!(
                "net needs at least 2 segments, got {}",
                config.segments
            )));
        }
        Ok(Self {
            config,
            last_fired: None,
        })
    }

    pub fn last_fired(&self) -> Option<f64> {
        self.last_fired
    }

    /// Cylinder trailing a boat at `position` heading along `forward`.
    pub fn cylinder(&self, position: Vec3, forward: Vec3) -> Result<NetCylinder, SimError> {
        let flat = Vec3::new(forward.x, 0.0, forward.z);
        let heading = flat
            .try_normalize()
            .ok_or_else(|| SimError::DegenerateGeometry("boat heading has no horizontal component".into()))?;

        let center = position - heading * self.config.rear_offset - Vec3::Y * self.config.down_offset;
        let half = Vec3::Y * (self.config.height * 0.5);
        Ok(NetCylinder {
            center,
            bottom: center - half,
            top: center + half,
        })
    }

    /// Sample heights, bottom to top inclusive.
    pub fn sample_points(&self, cylinder: &NetCylinder) -> Vec<Vec3> {
        let last = (self.config.segments - 1) as f32;
        (0..self.config.segments)
            .map(|i| cylinder.bottom.lerp(cylinder.top, i as f32 / last))
            .collect()
    }

    /// Whether a pass may run at `now`.
    pub fn ready(&self, now: f64) -> bool {
        self.last_fired
            .map_or(true, |last| now - last >= self.config.damage_interval as f64)
    }

    /// Run one detection pass. Returns one effect per unique entity hit.
    ///
    /// Calls inside the damage interval return nothing. A degenerate boat
    /// heading skips the pass without consuming the interval.
    pub fn detect(
        &mut self,
        now: f64,
        position: Vec3,
        forward: Vec3,
        world: &impl SpatialQuery,
    ) -> Result<Vec<NetEffect>, SimError> {
        if !self.ready(now) {
            return Ok(Vec::new());
        }

        let cylinder = self.cylinder(position, forward)?;
        self.last_fired = Some(now);

        let mut seen = HashSet::new();
        let mut effects = Vec::new();

        for point in self.sample_points(&cylinder) {
            for hit in world.overlap_sphere(point, self.config.radius, &NET_TARGETS) {
                if !seen.insert(hit.entity) {
                    continue;
                }
                if let Some(effect) = classify(hit.entity, hit.category) {
                    effects.push(effect);
                }
            }
        }

        Ok(effects)
    }
}
