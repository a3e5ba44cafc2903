//! World plugin - category index upkeep and effect application.

use bevy::prelude::*;

use super::components::Tagged;
use super::effects::{apply_damage, apply_despawns, apply_kills};
use super::registry::EntityIndex;
use crate::core::{EntityRegistered, SimSet};

/// World plugin - keeps the `EntityIndex` in sync with tagged entities and
/// applies requested effects at the end of each simulation frame.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EntityIndex>()
            .add_systems(
                Update,
                (register_tagged, sync_index_positions, unregister_removed)
                    .chain()
                    .before(SimSet::Pollution),
            )
            .add_systems(
                Update,
                (apply_damage, apply_kills, apply_despawns)
                    .chain()
                    .in_set(SimSet::Effects),
            );
    }
}

/// Register newly tagged entities.
pub fn register_tagged(
    mut index: ResMut<EntityIndex>,
    query: Query<(Entity, &Tagged, Option<&Transform>), Added<Tagged>>,
    mut registered: EventWriter<EntityRegistered>,
) {
    for (entity, tagged, transform) in query.iter() {
        let position = transform.map_or(Vec3::ZERO, |t| t.translation);

        if index.register(entity, tagged.category, position, tagged.radius) {
            registered.send(EntityRegistered {
                entity,
                category: tagged.category,
            });
        }
    }
}

/// Copy moved transforms into the index.
pub fn sync_index_positions(
    mut index: ResMut<EntityIndex>,
    query: Query<(Entity, &Transform), (With<Tagged>, Changed<Transform>)>,
) {
    for (entity, transform) in query.iter() {
        index.update_position(entity, transform.translation);
    }
}

/// Drop entities whose tag was removed or that were despawned.
pub fn unregister_removed(mut index: ResMut<EntityIndex>, mut removed: RemovedComponents<Tagged>) {
    for entity in removed.read() {
        index.unregister(entity);
    }
}
