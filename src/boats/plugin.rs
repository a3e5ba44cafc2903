//! Boat plugin - fleet population, boat motion and net passes.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{Boat, BoatCourse, ChasingBoat};
use super::fleet::{BoatFleet, FleetAction, Placement};
use super::net::{NetEffect, NetVolume};
use crate::core::{
    BoatPopulationChanged, DespawnEvent, GameState, KillEvent, SceneTier, SimConfig, SimError,
    SimSet,
};
use crate::pollution::DifficultySnapshot;
use crate::world::{Category, PhysicsWorld, Player, SpatialQuery, Tagged};

/// Net template cloned onto every spawned boat. Absent when the net config
/// is invalid, in which case boats sail without nets.
#[derive(Resource, Clone)]
pub struct BoatNet(pub NetVolume);

/// Countdown to the next reconcile step.
#[derive(Resource, Default)]
pub struct ReconcileTimer(pub f32);

/// Boat plugin - keeps the fleet at its pollution-driven size.
pub struct BoatPlugin;

impl Plugin for BoatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ReconcileTimer>()
            .add_systems(OnEnter(GameState::InGame), setup_fleet)
            .add_systems(OnEnter(GameState::GameOver), teardown_fleet)
            .add_systems(OnEnter(GameState::LevelComplete), teardown_fleet)
            .add_systems(
                Update,
                (reconcile_fleet, steer_boats, steer_chasing_boat, sync_fleet_positions, drag_nets)
                    .chain()
                    .in_set(SimSet::Agents),
            );
    }
}

/// Build the fleet for the scene. Resuming from pause keeps the old one.
pub fn setup_fleet(mut commands: Commands, config: Res<SimConfig>, fleet: Option<Res<BoatFleet>>) {
    if fleet.is_some() {
        return;
    }

    match BoatFleet::new(&config.fleet) {
        Ok(fleet) => {
            info!("Boat fleet ready with {} path points", fleet.path_points().len());
            commands.insert_resource(fleet);
        }
        Err(e) => warn!("{}, boats disabled for this scene", e),
    }

    match NetVolume::new(config.net.clone()) {
        Ok(net) => commands.insert_resource(BoatNet(net)),
        Err(e) => warn!("{}, boats will not drag nets", e),
    }
}

/// Remove every boat and the fleet itself.
pub fn teardown_fleet(mut commands: Commands, boats: Query<Entity, Or<(With<Boat>, With<ChasingBoat>)>>) {
    for entity in boats.iter() {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<BoatFleet>();
    commands.remove_resource::<BoatNet>();
}

fn log_placement(kind: &str, placement: &Placement, attempts: u32) {
    if placement.exhausted {
        let error = SimError::ExhaustedRetry {
            context: format!("placing {}", kind),
            attempts,
        };
        warn!("{}, using {:?}", error, placement.position);
    }
}

fn spawn_boat(
    commands: &mut Commands,
    position: Vec3,
    destination: Vec3,
    radius: f32,
    net: Option<&BoatNet>,
) -> Entity {
    let heading = Vec3::new(destination.x, position.y, destination.z);
    let mut boat = commands.spawn((
        Boat,
        BoatCourse { destination },
        Tagged::new(Category::Boat, radius),
        Transform::from_translation(position).looking_at(heading, Vec3::Y),
        Collider::ball(radius),
        RigidBody::KinematicPositionBased,
    ));
    if let Some(net) = net {
        boat.insert(net.0.clone());
    }
    boat.id()
}

/// One reconcile step every `reconcile_interval` seconds.
#[allow(clippy::too_many_arguments)]
pub fn reconcile_fleet(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SimConfig>,
    tier: Res<SceneTier>,
    snapshot: Res<DifficultySnapshot>,
    mut timer: ResMut<ReconcileTimer>,
    fleet: Option<ResMut<BoatFleet>>,
    net: Option<Res<BoatNet>>,
    boats: Query<(), Or<(With<Boat>, With<ChasingBoat>)>>,
    player: Query<&Transform, With<Player>>,
    mut population: EventWriter<BoatPopulationChanged>,
) {
    let Some(mut fleet) = fleet else {
        return;
    };

    timer.0 -= time.delta_secs();
    if timer.0 > 0.0 {
        return;
    }
    timer.0 = config.fleet.reconcile_interval;

    let mut rng = rand::thread_rng();
    let radius = config.fleet.boat_radius;
    let mut changed = fleet.retain_alive(|entity| boats.contains(entity));

    if let Some(action) = fleet.reconcile(snapshot.boat_target, &mut rng) {
        match action {
            FleetAction::SpawnBoat(placement) => {
                log_placement("boat", &placement, config.fleet.placement_attempts);
                let destination = fleet.random_path_point(&mut rng).unwrap_or(placement.position);
                let entity = spawn_boat(&mut commands, placement.position, destination, radius, net.as_deref());
                fleet.add_boat(entity, placement.position);
            }
            FleetAction::DespawnBoat(entity) => {
                commands.entity(entity).despawn_recursive();
            }
            _ => {}
        }
        changed = true;
    }

    let target = player.get_single().ok().map(|t| t.translation);
    match fleet.reconcile_chaser(*tier, target, &mut rng) {
        Ok(Some(FleetAction::SpawnChaser(placement))) => {
            log_placement("chasing boat", &placement, config.fleet.chaser_attempts);
            let mut chaser = commands.spawn((
                ChasingBoat,
                Tagged::new(Category::ChasingBoat, radius),
                Transform::from_translation(placement.position),
                Collider::ball(radius),
                RigidBody::KinematicPositionBased,
            ));
            if let Some(net) = net.as_deref() {
                chaser.insert(net.0.clone());
            }
            let entity = chaser.id();
            fleet.set_chaser(entity, placement.position);
            info!("Chasing boat spawned at {:?}", placement.position);
            changed = true;
        }
        Ok(Some(FleetAction::DespawnChaser(entity))) => {
            commands.entity(entity).despawn_recursive();
            changed = true;
        }
        Ok(_) => {}
        Err(e) => debug!("{}", e),
    }

    if changed {
        population.send(BoatPopulationChanged {
            active: fleet.active_handles(),
        });
    }
}

/// Cruise toward the current path point, then pick another.
pub fn steer_boats(
    time: Res<Time>,
    config: Res<SimConfig>,
    fleet: Option<Res<BoatFleet>>,
    mut boats: Query<(&mut Transform, &mut BoatCourse), With<Boat>>,
) {
    let Some(fleet) = fleet else {
        return;
    };
    let mut rng = rand::thread_rng();
    let step = config.fleet.boat_speed * time.delta_secs();

    for (mut transform, mut course) in boats.iter_mut() {
        let to_destination = course.destination - transform.translation;
        if to_destination.length() <= config.fleet.arrival_distance {
            if let Some(next) = fleet.random_path_point(&mut rng) {
                course.destination = next;
            }
            continue;
        }

        let direction = to_destination.normalize();
        transform.translation += direction * step.min(to_destination.length());
        let look_target = Vec3::new(course.destination.x, transform.translation.y, course.destination.z);
        if look_target != transform.translation {
            transform.look_at(look_target, Vec3::Y);
        }
    }
}

/// Steer the chasing boat horizontally toward the nearest player.
pub fn steer_chasing_boat(
    time: Res<Time>,
    config: Res<SimConfig>,
    world: PhysicsWorld,
    mut chasers: Query<&mut Transform, With<ChasingBoat>>,
) {
    for mut transform in chasers.iter_mut() {
        let Some(player_position) = world
            .find_nearest(Category::Player, transform.translation)
            .and_then(|player| world.position_of(player))
        else {
            continue;
        };

        let target = Vec3::new(player_position.x, transform.translation.y, player_position.z);
        let offset = target - transform.translation;
        let distance = offset.length();
        if distance <= config.fleet.arrival_distance {
            continue;
        }

        let step = (config.fleet.chaser_speed * time.delta_secs()).min(distance);
        transform.translation += offset / distance * step;
        transform.look_at(target, Vec3::Y);
    }
}

/// Keep the fleet's spacing data current.
pub fn sync_fleet_positions(
    fleet: Option<ResMut<BoatFleet>>,
    boats: Query<(Entity, &Transform), (Or<(With<Boat>, With<ChasingBoat>)>, Changed<Transform>)>,
) {
    let Some(mut fleet) = fleet else {
        return;
    };
    for (entity, transform) in boats.iter() {
        fleet.update_position(entity, transform.translation);
    }
}

/// Run each boat's net pass and request the resulting effects.
pub fn drag_nets(
    time: Res<Time>,
    world: PhysicsWorld,
    mut nets: Query<(Entity, &Transform, &mut NetVolume)>,
    mut kills: EventWriter<KillEvent>,
    mut despawns: EventWriter<DespawnEvent>,
) {
    let now = time.elapsed_secs_f64();

    for (boat, transform, mut net) in nets.iter_mut() {
        let effects = match net.detect(now, transform.translation, transform.forward().as_vec3(), &world) {
            Ok(effects) => effects,
            Err(e) => {
                debug!("Net pass skipped for {:?}: {}", boat, e);
                continue;
            }
        };

        for effect in effects {
            match effect {
                NetEffect::Kill(target) => {
                    kills.send(KillEvent {
                        target,
                        killed_by: Some(boat),
                    });
                }
                NetEffect::Despawn(entity) => {
                    despawns.send(DespawnEvent { entity });
                }
            }
        }
    }
}
