//! Tidewater - Entry Point
//!
//! Runs the pollution simulation with the default Bevy window and Rapier
//! physics. Tuning lives in `assets/data/simulation.ron`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

fn main() {
    App::new()
        // Bevy default plugins
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Tidewater".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))

        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())

        // Our simulation plugin
        .add_plugins(tidewater::TidewaterPlugin)

        .run();
}
