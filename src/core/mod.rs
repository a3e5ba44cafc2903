//! Core module - states, events, config, errors and system ordering.
//!
//! This module provides the foundation that all other simulation plugins
//! build upon.

mod config;
mod error;
mod events;
mod plugin;
mod states;

pub use config::{load_sim_config, SimConfig, SIM_CONFIG_PATH};
pub use error::SimError;
pub use events::*;
pub use plugin::{CorePlugin, SimSet};
pub use states::*;
