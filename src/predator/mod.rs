//! Predator module - the patrol/chase/destroy/return state machine.

pub mod brain;
mod components;
mod plugin;

pub use brain::{
    Concealment, PredatorBrain, PredatorConfig, PredatorContext, PredatorEffect, PredatorPose,
    PredatorState, PredatorStep, TargetView,
};
pub use components::Predator;
pub use plugin::*;
