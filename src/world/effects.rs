//! Effect sinks: apply damage, kill and despawn requests to the ECS.

use bevy::prelude::*;
use std::collections::HashSet;

use super::components::{Health, Player};
use crate::core::{DamageEvent, DespawnEvent, GameState, KillEvent, ObstacleDestroyed};

/// Reduce health and turn lethal damage into a kill.
pub fn apply_damage(
    mut damage_events: EventReader<DamageEvent>,
    mut health_query: Query<&mut Health>,
    mut kill_events: EventWriter<KillEvent>,
) {
    for event in damage_events.read() {
        let Ok(mut health) = health_query.get_mut(event.target) else {
            continue;
        };
        if health.is_dead() {
            continue;
        }

        let dealt = health.take_damage(event.amount);
        debug!("{:?} took {} damage", event.target, dealt);

        if health.is_dead() {
            kill_events.send(KillEvent {
                target: event.target,
                killed_by: None,
            });
        }
    }
}

/// Kill entities. The player dying ends the run; anything else is removed.
pub fn apply_kills(
    mut commands: Commands,
    mut kill_events: EventReader<KillEvent>,
    mut health_query: Query<&mut Health>,
    player_query: Query<(), With<Player>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let mut handled = HashSet::new();

    for event in kill_events.read() {
        if !handled.insert(event.target) {
            continue;
        }

        if let Ok(mut health) = health_query.get_mut(event.target) {
            health.kill();
        }

        if player_query.get(event.target).is_ok() {
            info!("Player killed by {:?}", event.killed_by);
            next_state.set(GameState::GameOver);
        } else if let Some(mut entity) = commands.get_entity(event.target) {
            entity.despawn_recursive();
        }
    }
}

/// Remove entities on request, including obstacles a predator broke.
pub fn apply_despawns(
    mut commands: Commands,
    mut despawn_events: EventReader<DespawnEvent>,
    mut destroyed_events: EventReader<ObstacleDestroyed>,
) {
    let targets = despawn_events
        .read()
        .map(|e| e.entity)
        .chain(destroyed_events.read().map(|e| e.obstacle))
        .collect::<HashSet<_>>();

    for target in targets {
        if let Some(mut entity) = commands.get_entity(target) {
            entity.despawn_recursive();
        }
    }
}
