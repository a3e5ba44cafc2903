//! Predator behavior: patrol, chase, break cover, return.
//!
//! The brain owns no transform. Each tick it receives the predator's pose,
//! what it knows about the player and a world to query, and answers with a
//! velocity plus any effects (state change, destroyed obstacle, kill).

use bevy::prelude::*;
use serde::Deserialize;

use crate::core::SimError;
use crate::pollution::{PredatorBase, PredatorParameters};
use crate::world::SpatialQuery;

/// Predator tuning.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct PredatorConfig {
    /// Perception and pursuit before pollution scaling
    pub base: PredatorBase,
    pub patrol_speed: f32,
    /// Seconds between vision checks while patrolling
    pub vision_check_interval: f32,
    /// Scales the vertical part of chase velocity, below 1
    pub vertical_chase_factor: f32,
    /// Seconds spent next to an obstacle before it breaks
    pub destroy_time: f32,
    /// How close the predator must be to work on an obstacle
    pub destroy_proximity: f32,
    /// Kill radius while breaking cover
    pub capture_radius: f32,
    /// Kill radius in every state
    pub contact_radius: f32,
    /// Distance at which a returning predator has found its path
    pub return_threshold: f32,
    /// Seconds a returning predator searches before patrolling anyway
    pub search_duration: f32,
    /// Distance at which a patrol waypoint counts as reached
    pub waypoint_arrival: f32,
    /// Patrol path, visited in order and looped
    pub waypoints: Vec<(f32, f32, f32)>,
    /// Where the scene's predator is spawned, if it has one
    pub spawn_point: Option<(f32, f32, f32)>,
    /// Collider and index radius
    pub body_radius: f32,
}

impl Default for PredatorConfig {
    fn default() -> Self {
        Self {
            base: PredatorBase::default(),
            patrol_speed: 3.0,
            vision_check_interval: 0.25,
            vertical_chase_factor: 0.3,
            destroy_time: 2.0,
            destroy_proximity: 3.0,
            capture_radius: 2.0,
            contact_radius: 1.5,
            return_threshold: 2.0,
            search_duration: 8.0,
            waypoint_arrival: 1.5,
            waypoints: Vec::new(),
            spawn_point: None,
            body_radius: 2.0,
        }
    }
}

/// The four behaviors. The obstacle being broken only exists while
/// `Destroying`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredatorState {
    #[default]
    Patrolling,
    Chasing,
    Destroying { obstacle: Entity },
    Returning,
}

/// What is hiding the player, as seen by the predator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concealment {
    #[default]
    Exposed,
    /// Behind cover the predator can break
    Breakable(Entity),
    /// Behind cover it cannot
    Unbreakable,
}

/// The player as the predator perceives it this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub entity: Entity,
    pub position: Vec3,
    pub concealment: Concealment,
}

/// Predator position and facing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredatorPose {
    pub position: Vec3,
    pub forward: Vec3,
}

/// Something the caller must carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredatorEffect {
    StateChanged(PredatorState),
    DestroyObstacle(Entity),
    Kill(Entity),
}

/// Result of one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredatorStep {
    pub velocity: Vec3,
    pub effects: Vec<PredatorEffect>,
}

/// Everything fixed for one tick besides the pose and target.
#[derive(Debug, Clone, Copy)]
pub struct PredatorContext<'a> {
    /// The predator's own entity, skipped by line-of-sight rays
    pub me: Entity,
    pub config: &'a PredatorConfig,
    pub params: PredatorParameters,
}

/// Per-predator state machine.
#[derive(Component, Debug, Clone)]
pub struct PredatorBrain {
    state: PredatorState,
    /// Time spent at the current obstacle
    state_timer: f32,
    search_timer: f32,
    vision_timer: f32,
    last_known_target: Vec3,
    waypoint_index: usize,
    waypoints: Vec<Vec3>,
}

impl PredatorBrain {
    /// A patrolling brain. Fails without waypoints, which leaves the scene
    /// without a predator.
    pub fn new(waypoints: Vec<Vec3>) -> Result<Self, SimError> {
        if waypoints.is_empty() {
            return Err(SimError::ConfigurationError("predator has no patrol waypoints".into()));
        }
        Ok(Self {
            state: PredatorState::Patrolling,
            state_timer: 0.0,
            search_timer: 0.0,
            vision_timer: 0.0,
            last_known_target: Vec3::ZERO,
            waypoint_index: 0,
            waypoints,
        })
    }

    pub fn state(&self) -> PredatorState {
        self.state
    }

    pub fn last_known_target(&self) -> Vec3 {
        self.last_known_target
    }

    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    pub fn current_waypoint(&self) -> Vec3 {
        self.waypoints[self.waypoint_index]
    }

    fn nearest_waypoint(&self, from: Vec3) -> usize {
        self.waypoints
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.distance_squared(from).total_cmp(&b.1.distance_squared(from)))
            .map_or(0, |(i, _)| i)
    }

    fn enter(&mut self, state: PredatorState, pose: &PredatorPose, step: &mut PredatorStep) {
        self.state = state;
        self.state_timer = 0.0;
        match state {
            PredatorState::Returning => {
                self.search_timer = 0.0;
                self.waypoint_index = self.nearest_waypoint(pose.position);
            }
            PredatorState::Patrolling => self.vision_timer = 0.0,
            _ => {}
        }
        step.effects.push(PredatorEffect::StateChanged(state));
    }

    /// Whether the predator can see the target right now: in range, inside
    /// both view cones, not hiding and with a clear line of sight.
    pub fn can_see(
        pose: &PredatorPose,
        target: &TargetView,
        ctx: &PredatorContext,
        world: &impl SpatialQuery,
    ) -> bool {
        if target.concealment != Concealment::Exposed {
            return false;
        }

        let to_target = target.position - pose.position;
        if to_target.length() > ctx.params.detection_radius {
            return false;
        }

        let Some(facing) = Vec3::new(pose.forward.x, 0.0, pose.forward.z).try_normalize() else {
            return false;
        };
        let flat = Vec3::new(to_target.x, 0.0, to_target.z);
        let flat_distance = flat.length();

        let horizontal = if flat_distance > f32::EPSILON {
            facing.angle_between(flat)
        } else {
            0.0
        };
        if horizontal > (ctx.params.horizontal_angle * 0.5).to_radians() {
            return false;
        }

        let vertical = to_target.y.abs().atan2(flat_distance);
        if vertical > (ctx.params.vertical_angle * 0.5).to_radians() {
            return false;
        }

        world.has_line_of_sight(pose.position, target.entity, &[ctx.me])
    }

    /// Advance the state machine by `dt` seconds.
    pub fn tick(
        &mut self,
        dt: f32,
        pose: PredatorPose,
        target: Option<TargetView>,
        ctx: &PredatorContext,
        world: &impl SpatialQuery,
    ) -> PredatorStep {
        let mut step = PredatorStep::default();

        if let Some(target) = target {
            if pose.position.distance(target.position) <= ctx.config.contact_radius {
                step.effects.push(PredatorEffect::Kill(target.entity));
                if self.state != PredatorState::Returning {
                    self.enter(PredatorState::Returning, &pose, &mut step);
                }
                return step;
            }
        }

        let state = self.state;
        match state {
            PredatorState::Patrolling => self.patrol(dt, &pose, target, ctx, world, &mut step),
            PredatorState::Chasing => self.chase(&pose, target, ctx, &mut step),
            PredatorState::Destroying { obstacle } => {
                self.destroy(dt, obstacle, &pose, target, ctx, world, &mut step)
            }
            PredatorState::Returning => self.return_to_path(dt, &pose, ctx, &mut step),
        }

        step
    }

    fn patrol(
        &mut self,
        dt: f32,
        pose: &PredatorPose,
        target: Option<TargetView>,
        ctx: &PredatorContext,
        world: &impl SpatialQuery,
        step: &mut PredatorStep,
    ) {
        if pose.position.distance(self.current_waypoint()) <= ctx.config.waypoint_arrival {
            self.waypoint_index = (self.waypoint_index + 1) % self.waypoints.len();
        }
        step.velocity = (self.current_waypoint() - pose.position).normalize_or_zero() * ctx.config.patrol_speed;

        self.vision_timer += dt;
        if self.vision_timer < ctx.config.vision_check_interval {
            return;
        }
        self.vision_timer = 0.0;

        if let Some(target) = target {
            if Self::can_see(pose, &target, ctx, world) {
                self.last_known_target = target.position;
                self.enter(PredatorState::Chasing, pose, step);
            }
        }
    }

    fn chase(
        &mut self,
        pose: &PredatorPose,
        target: Option<TargetView>,
        ctx: &PredatorContext,
        step: &mut PredatorStep,
    ) {
        let Some(target) = target else {
            self.enter(PredatorState::Returning, pose, step);
            return;
        };

        match target.concealment {
            Concealment::Exposed => self.last_known_target = target.position,
            Concealment::Breakable(obstacle) => {
                self.enter(PredatorState::Destroying { obstacle }, pose, step);
                return;
            }
            Concealment::Unbreakable => {
                self.enter(PredatorState::Returning, pose, step);
                return;
            }
        }

        let offset = self.last_known_target - pose.position;
        if offset.length() > ctx.params.chase_radius {
            self.enter(PredatorState::Returning, pose, step);
            return;
        }

        let mut velocity = offset.normalize_or_zero() * ctx.params.chase_speed;
        velocity.y *= ctx.config.vertical_chase_factor;
        step.velocity = velocity;
    }

    #[allow(clippy::too_many_arguments)]
    fn destroy(
        &mut self,
        dt: f32,
        obstacle: Entity,
        pose: &PredatorPose,
        target: Option<TargetView>,
        ctx: &PredatorContext,
        world: &impl SpatialQuery,
        step: &mut PredatorStep,
    ) {
        let Some(target) = target else {
            self.enter(PredatorState::Returning, pose, step);
            return;
        };

        if pose.position.distance(target.position) <= ctx.config.capture_radius {
            step.effects.push(PredatorEffect::Kill(target.entity));
            self.enter(PredatorState::Returning, pose, step);
            return;
        }

        let Some(obstacle_position) = world.position_of(obstacle) else {
            self.enter(PredatorState::Returning, pose, step);
            return;
        };

        let offset = obstacle_position - pose.position;
        if offset.length() > ctx.config.destroy_proximity {
            step.velocity = offset.normalize_or_zero() * ctx.params.chase_speed;
            return;
        }

        self.state_timer += dt;
        if self.state_timer < ctx.config.destroy_time {
            return;
        }

        step.effects.push(PredatorEffect::DestroyObstacle(obstacle));

        // The broken obstacle no longer hides anything
        let uncovered = match target.concealment {
            Concealment::Exposed => true,
            Concealment::Breakable(cover) => cover == obstacle,
            Concealment::Unbreakable => false,
        };
        let in_range = pose.position.distance(target.position) <= ctx.params.chase_radius;
        let visible = uncovered
            && in_range
            && match world.raycast(pose.position, target.position, &[ctx.me, obstacle]) {
                None => true,
                Some(hit) => hit.entity == target.entity,
            };

        if visible {
            self.last_known_target = target.position;
            self.enter(PredatorState::Chasing, pose, step);
        } else {
            self.enter(PredatorState::Returning, pose, step);
        }
    }

    fn return_to_path(&mut self, dt: f32, pose: &PredatorPose, ctx: &PredatorContext, step: &mut PredatorStep) {
        self.search_timer += dt;

        let offset = self.current_waypoint() - pose.position;
        if offset.length() <= ctx.config.return_threshold || self.search_timer > ctx.config.search_duration {
            self.enter(PredatorState::Patrolling, pose, step);
            return;
        }

        step.velocity = offset.normalize_or_zero() * ctx.config.patrol_speed;
    }
}
