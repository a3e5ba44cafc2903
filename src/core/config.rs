//! Simulation tuning loaded from RON.

use bevy::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::error::SimError;
use crate::boats::{FleetConfig, NetConfig};
use crate::pollution::{DifficultyConfig, GrowthConfig};
use crate::predator::PredatorConfig;
use crate::spawner::SpawnerConfig;

/// Default location of the simulation data file.
pub const SIM_CONFIG_PATH: &str = "assets/data/simulation.ron";

/// All simulation tunables. Every section falls back to its defaults when
/// omitted from the file.
#[derive(Resource, Deserialize, Clone, Debug, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub growth: GrowthConfig,
    #[serde(default)]
    pub difficulty: DifficultyConfig,
    #[serde(default)]
    pub predator: PredatorConfig,
    #[serde(default)]
    pub net: NetConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub spawner: SpawnerConfig,
}

impl SimConfig {
    /// Parse a config from RON text. `origin` is only used in error messages.
    pub fn from_ron(contents: &str, origin: &str) -> Result<Self, SimError> {
        ron::from_str(contents).map_err(|e| SimError::ParseError {
            path: origin.to_string(),
            details: e.to_string(),
        })
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|e| SimError::ReadError {
            path: display.clone(),
            details: e.to_string(),
        })?;
        Self::from_ron(&contents, &display)
    }
}

/// Load the simulation config, keeping defaults if the file is missing or bad.
pub fn load_sim_config(mut config: ResMut<SimConfig>) {
    let path = Path::new(SIM_CONFIG_PATH);

    if !path.exists() {
        warn!("Simulation config not found: {:?}, using defaults", path);
        return;
    }

    match SimConfig::load(path) {
        Ok(loaded) => {
            info!("Loaded simulation config from {:?}", path);
            *config = loaded;
        }
        Err(e) => error!("{}, using defaults", e),
    }
}
