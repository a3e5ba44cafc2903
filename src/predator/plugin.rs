//! Predator plugin - spawning, thinking and contact kills.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::brain::{Concealment, PredatorBrain, PredatorContext, PredatorEffect, PredatorPose, TargetView};
use super::components::Predator;
use crate::core::{GameState, KillEvent, ObstacleDestroyed, PredatorStateChanged, SimConfig, SimSet};
use crate::pollution::DifficultySnapshot;
use crate::world::{Category, Hiding, PhysicsWorld, Player, SpatialQuery, Tagged};

/// Predator plugin - spawns the scene's predator and runs its brain.
pub struct PredatorPlugin;

impl Plugin for PredatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::InGame), spawn_predator)
            .add_systems(OnEnter(GameState::GameOver), despawn_predators)
            .add_systems(OnEnter(GameState::LevelComplete), despawn_predators)
            .add_systems(
                Update,
                (think_predators, predator_contact_kills)
                    .chain()
                    .in_set(SimSet::Agents),
            );
    }
}

/// Spawn the predator at its configured spawn point, once per scene.
pub fn spawn_predator(mut commands: Commands, config: Res<SimConfig>, existing: Query<(), With<Predator>>) {
    if !existing.is_empty() {
        return;
    }
    let Some((x, y, z)) = config.predator.spawn_point else {
        debug!("No predator spawn point configured");
        return;
    };

    let waypoints = config
        .predator
        .waypoints
        .iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z))
        .collect();
    let brain = match PredatorBrain::new(waypoints) {
        Ok(brain) => brain,
        Err(e) => {
            error!("{}, predator disabled for this scene", e);
            return;
        }
    };

    let radius = config.predator.body_radius;
    let entity = commands
        .spawn((
            Predator,
            brain,
            Tagged::new(Category::Predator, radius),
            Transform::from_xyz(x, y, z),
            Collider::ball(radius),
            RigidBody::KinematicPositionBased,
        ))
        .id();
    info!("Predator {:?} spawned at ({}, {}, {})", entity, x, y, z);
}

pub fn despawn_predators(mut commands: Commands, predators: Query<Entity, With<Predator>>) {
    for entity in predators.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

/// Resolve the player's cover to what the predator cares about.
fn concealment(hiding: Option<&Hiding>, world: &impl SpatialQuery) -> Concealment {
    let Some(obstacle) = hiding.and_then(|h| h.behind) else {
        return Concealment::Exposed;
    };
    match world.category_of(obstacle) {
        Some(Category::BreakableObstacle) => Concealment::Breakable(obstacle),
        Some(Category::UnbreakableObstacle) => Concealment::Unbreakable,
        // Cover that is gone or not an obstacle hides nothing
        _ => Concealment::Exposed,
    }
}

/// Tick every predator brain, move it, and publish its effects.
#[allow(clippy::too_many_arguments)]
pub fn think_predators(
    time: Res<Time>,
    config: Res<SimConfig>,
    snapshot: Res<DifficultySnapshot>,
    world: PhysicsWorld,
    player_query: Query<(Entity, &Transform, Option<&Hiding>), (With<Player>, Without<Predator>)>,
    mut predators: Query<(Entity, &mut Transform, &mut PredatorBrain), With<Predator>>,
    mut state_changes: EventWriter<PredatorStateChanged>,
    mut destroyed: EventWriter<ObstacleDestroyed>,
    mut kills: EventWriter<KillEvent>,
) {
    let dt = time.delta_secs();
    let target = player_query.get_single().ok().map(|(entity, transform, hiding)| TargetView {
        entity,
        position: transform.translation,
        concealment: concealment(hiding, &world),
    });

    for (predator, mut transform, mut brain) in predators.iter_mut() {
        let ctx = PredatorContext {
            me: predator,
            config: &config.predator,
            params: snapshot.predator,
        };
        let pose = PredatorPose {
            position: transform.translation,
            forward: transform.forward().as_vec3(),
        };

        let step = brain.tick(dt, pose, target, &ctx, &world);

        for effect in step.effects {
            match effect {
                PredatorEffect::StateChanged(state) => {
                    debug!("Predator {:?} -> {:?}", predator, state);
                    state_changes.send(PredatorStateChanged { predator, state });
                }
                PredatorEffect::DestroyObstacle(obstacle) => {
                    info!("Predator {:?} broke obstacle {:?}", predator, obstacle);
                    destroyed.send(ObstacleDestroyed {
                        obstacle,
                        destroyed_by: predator,
                    });
                }
                PredatorEffect::Kill(target) => {
                    kills.send(KillEvent {
                        target,
                        killed_by: Some(predator),
                    });
                }
            }
        }

        transform.translation += step.velocity * dt;

        // Face the direction of travel, staying upright
        let flat = Vec3::new(step.velocity.x, 0.0, step.velocity.z);
        if flat.length_squared() > f32::EPSILON {
            let look_target = transform.translation + flat;
            transform.look_at(look_target, Vec3::Y);
        }
    }
}

/// Kill the player when a predator's body touches it.
pub fn predator_contact_kills(
    config: Res<SimConfig>,
    world: PhysicsWorld,
    predators: Query<(Entity, &Transform), With<Predator>>,
    mut kills: EventWriter<KillEvent>,
) {
    for (predator, transform) in predators.iter() {
        for hit in world.overlap_sphere(transform.translation, config.predator.body_radius, &[Category::Player]) {
            kills.send(KillEvent {
                target: hit.entity,
                killed_by: Some(predator),
            });
        }
    }
}
