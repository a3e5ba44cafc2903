//! World module - the query port, the category index and effect sinks.

mod components;
mod effects;
mod physics;
mod plugin;
mod registry;
mod spatial;

pub use components::{Health, Hiding, Player, Tagged};
pub use effects::{apply_damage, apply_despawns, apply_kills};
pub use physics::PhysicsWorld;
pub use plugin::*;
pub use registry::{EntityIndex, IndexEntry};
pub use spatial::{Category, OverlapHit, RayHit, SpatialQuery};
