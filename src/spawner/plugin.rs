//! Spawner plugin - trash and fish upkeep, hazard contact damage.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{Fish, Hazard, Trash};
use super::population::{fish_adjustment, hazard_damage, FishAdjustment, TrashTimer};
use crate::core::{DamageEvent, GameState, SimConfig, SimSet};
use crate::pollution::difficulty::{danger_level, max_entities_allowed, spawn_interval};
use crate::pollution::DifficultySnapshot;
use crate::world::{Category, PhysicsWorld, Player, SpatialQuery, Tagged};

/// Spawner plugin - keeps trash and fish populations in line with pollution.
pub struct SpawnerPlugin;

impl Plugin for SpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrashTimer>()
            .add_systems(OnEnter(GameState::GameOver), clear_spawned)
            .add_systems(OnEnter(GameState::LevelComplete), clear_spawned)
            .add_systems(
                Update,
                (spawn_trash, balance_fish, hazard_contact)
                    .chain()
                    .in_set(SimSet::Agents),
            );
    }
}

/// Spawn one trash hazard each time the timer runs out.
pub fn spawn_trash(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SimConfig>,
    snapshot: Res<DifficultySnapshot>,
    mut timer: ResMut<TrashTimer>,
    trash: Query<(), With<Trash>>,
) {
    if !timer.tick(time.delta_secs()) {
        return;
    }

    let spawner = &config.spawner;
    let mut rng = rand::thread_rng();
    let trash_score = snapshot.scores.trash;
    timer.rearm(spawn_interval(
        trash_score,
        spawner.trash_interval_min,
        spawner.trash_interval_max,
        &config.difficulty,
        &mut rng,
    ));

    if trash.iter().count() >= spawner.max_trash {
        return;
    }

    let danger = danger_level(trash_score, &config.difficulty, &mut rng);
    let position = spawner.random_point(&mut rng);
    commands.spawn((
        Trash,
        Hazard::new(danger),
        Tagged::new(Category::Trash, spawner.trash_radius),
        Transform::from_translation(position),
        Collider::ball(spawner.trash_radius),
        Sensor,
    ));
    debug!("Trash spawned at {:?} with danger {:.2}", position, danger);
}

/// Top fish up to the allowed population, or thin it one fish per tick.
pub fn balance_fish(
    mut commands: Commands,
    config: Res<SimConfig>,
    snapshot: Res<DifficultySnapshot>,
    fish: Query<Entity, With<Fish>>,
) {
    let spawner = &config.spawner;
    let allowed = max_entities_allowed(
        spawner.fish_base_count,
        snapshot.scores.fishing,
        snapshot.scores.carbon,
        &config.difficulty,
    );

    match fish_adjustment(fish.iter().count() as u32, allowed) {
        FishAdjustment::Spawn(missing) => {
            let mut rng = rand::thread_rng();
            for _ in 0..missing {
                commands.spawn((
                    Fish,
                    Tagged::new(Category::Fish, spawner.fish_radius),
                    Transform::from_translation(spawner.random_point(&mut rng)),
                    Collider::ball(spawner.fish_radius),
                    Sensor,
                ));
            }
            debug!("Spawned {} fish, cap {}", missing, allowed);
        }
        FishAdjustment::DespawnOne => {
            if let Some(entity) = fish.iter().next() {
                commands.entity(entity).despawn_recursive();
            }
        }
        FishAdjustment::Hold => {}
    }
}

/// Damage the player once for each hazard it touches.
pub fn hazard_contact(
    config: Res<SimConfig>,
    world: PhysicsWorld,
    player_query: Query<(Entity, &Transform), With<Player>>,
    mut hazards: Query<&mut Hazard>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let Ok((player, transform)) = player_query.get_single() else {
        return;
    };

    let hits = world.overlap_sphere(
        transform.translation,
        config.spawner.hazard_contact_radius,
        &[Category::Trash],
    );
    for hit in hits {
        let Ok(mut hazard) = hazards.get_mut(hit.entity) else {
            continue;
        };
        if hazard.spent {
            continue;
        }
        hazard.spent = true;

        let amount = hazard_damage(hazard.danger, config.spawner.max_hazard_damage);
        info!("Player touched hazard {:?} for {:.1} damage", hit.entity, amount);
        damage_events.send(DamageEvent {
            target: player,
            amount,
        });
    }
}

/// Remove every spawned fish and piece of trash.
pub fn clear_spawned(
    mut commands: Commands,
    mut timer: ResMut<TrashTimer>,
    spawned: Query<Entity, Or<(With<Trash>, With<Fish>)>>,
) {
    for entity in spawned.iter() {
        commands.entity(entity).despawn_recursive();
    }
    timer.rearm(0.0);
}
