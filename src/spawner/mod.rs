//! Spawner module - trash hazards and fish, paced by pollution.

mod components;
mod plugin;
pub mod population;

pub use components::{Fish, Hazard, Trash};
pub use plugin::*;
pub use population::{fish_adjustment, hazard_damage, FishAdjustment, SpawnerConfig, TrashTimer};
