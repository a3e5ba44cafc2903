//! Boats module - fishing boats, their nets and the fleet controller.

mod components;
pub mod fleet;
pub mod net;
mod plugin;

pub use components::{Boat, BoatCourse, ChasingBoat};
pub use fleet::{BoatFleet, BoatSlot, FleetAction, FleetConfig, Placement};
pub use net::{NetConfig, NetCylinder, NetEffect, NetVolume};
pub use plugin::*;
