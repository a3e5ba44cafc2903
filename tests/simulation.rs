//! Headless runs of the full simulation plugin stack.

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use tidewater::boats::{Boat, NetConfig, NetVolume};
use tidewater::core::{
    BoatPopulationChanged, GameState, ObstacleDestroyed, PollutionChanged, PredatorStateChanged,
    RestartSession, SetPollutionScores,
};
use tidewater::pollution::{DifficultySnapshot, PollutionScores, PollutionState, SavePath};
use tidewater::predator::{Predator, PredatorBrain, PredatorState};
use tidewater::spawner::Hazard;
use tidewater::world::{Category, EntityIndex, Health, Player, Tagged};
use tidewater::TidewaterPlugin;

fn save_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("tidewater_it_{}_{}", std::process::id(), name))
        .join("pollution.ron")
}

/// App stepped 100ms per update, already in gameplay.
fn test_app(name: &str) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(SavePath(save_path(name)))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .add_plugins(TidewaterPlugin);

    for _ in 0..5 {
        app.update();
        if *app.world().resource::<State<GameState>>().get() == GameState::InGame {
            return app;
        }
    }
    panic!("never reached InGame");
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

/// Events sent during the last update.
fn current_events<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world()
        .resource::<Events<E>>()
        .iter_current_update_events()
        .cloned()
        .collect()
}

fn live_boats(app: &mut App) -> Vec<Entity> {
    let mut query = app.world_mut().query_filtered::<Entity, With<Boat>>();
    let mut boats: Vec<Entity> = query.iter(app.world()).collect();
    boats.sort();
    boats
}

/// Step `updates` frames, recording the boat count after each and checking
/// every population event against the live boats.
fn run_fleet(app: &mut App, updates: usize) -> Vec<usize> {
    let mut counts = Vec::with_capacity(updates);
    for _ in 0..updates {
        app.update();
        let live = live_boats(app);
        if let Some(event) = current_events::<BoatPopulationChanged>(app).last() {
            let mut active = event.active.clone();
            active.sort();
            assert_eq!(active, live);
        }
        counts.push(live.len());
    }
    counts
}

/// Counts move by one at a time, and no faster than one step per
/// reconcile interval (2 s, 20 frames).
fn assert_single_steps(counts: &[usize]) {
    let changes: Vec<usize> = counts
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] != w[1])
        .map(|(i, w)| {
            assert_eq!(w[0].abs_diff(w[1]), 1);
            i
        })
        .collect();
    for pair in changes.windows(2) {
        assert!(pair[1] - pair[0] >= 19, "changes at {:?}", changes);
    }
}

fn spawn_player(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Player,
            Health::new(100.0),
            Tagged::new(Category::Player, 0.5),
            Transform::from_translation(position),
        ))
        .id()
}

#[test]
fn test_score_override_updates_difficulty() {
    let mut app = test_app("override");
    let clean = *app.world().resource::<DifficultySnapshot>();

    app.world_mut().send_event(SetPollutionScores {
        scores: PollutionScores::new(10, 10, 10, 10),
    });
    app.update();

    let pollution = app.world().resource::<PollutionState>();
    assert_eq!(pollution.aggregate(), 10.0);

    let snapshot = app.world().resource::<DifficultySnapshot>();
    assert_eq!(snapshot.boat_target, 5);
    assert!(snapshot.fog_visibility < clean.fog_visibility);
    assert!(snapshot.predator.detection_radius < clean.predator.detection_radius);
}

#[test]
fn test_score_request_publishes_clamped_scores() {
    let mut app = test_app("clamped");
    app.world_mut().send_event(SetPollutionScores {
        scores: PollutionScores {
            carbon: 200,
            trash: 4,
            fishing: 11,
            sewage: 0,
        },
    });
    app.update();

    let events = current_events::<PollutionChanged>(&app);
    let event = events.last().unwrap();
    assert_eq!(event.scores, PollutionScores::new(10, 4, 10, 0));
    assert_eq!(app.world().resource::<DifficultySnapshot>().scores, event.scores);
}

#[test]
fn test_fleet_converges_one_boat_per_interval() {
    let mut app = test_app("fleet");

    // Easy tier, fishing 10 -> five boats
    app.world_mut().send_event(SetPollutionScores {
        scores: PollutionScores::new(0, 0, 10, 0),
    });
    let rising = run_fleet(&mut app, 150);
    assert_single_steps(&rising);
    assert_eq!(*rising.last().unwrap(), 5);
    assert!(rising.windows(2).all(|w| w[1] >= w[0]));

    // Fishing 0 -> back down to two, one removal at a time
    app.world_mut().send_event(SetPollutionScores {
        scores: PollutionScores::new(0, 0, 0, 0),
    });
    let falling = run_fleet(&mut app, 100);
    assert_single_steps(&falling);
    assert_eq!(*falling.last().unwrap(), 2);
    assert!(falling.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn test_restart_from_game_over() {
    let mut app = test_app("restart_over");
    app.world_mut().send_event(SetPollutionScores {
        scores: PollutionScores::new(5, 5, 5, 5),
    });
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::GameOver);
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(state(&app), GameState::GameOver);

    app.world_mut().send_event(RestartSession);
    app.update();
    assert_eq!(app.world().resource::<PollutionState>().aggregate(), 0.0);
    assert_eq!(app.world().resource::<DifficultySnapshot>().scores, PollutionScores::default());
}

#[test]
fn test_restart_clears_pollution() {
    let mut app = test_app("restart");
    app.world_mut().send_event(SetPollutionScores {
        scores: PollutionScores::new(4, 6, 2, 8),
    });
    app.update();
    assert_eq!(app.world().resource::<PollutionState>().aggregate(), 5.0);

    app.world_mut().send_event(RestartSession);
    app.update();
    assert_eq!(app.world().resource::<PollutionState>().aggregate(), 0.0);
    assert_eq!(app.world().resource::<DifficultySnapshot>().scores, PollutionScores::default());
}

#[test]
fn test_tagged_entities_enter_index() {
    let mut app = test_app("index");
    let player = spawn_player(&mut app, Vec3::new(1.0, -4.0, 2.0));
    app.update();

    let index = app.world().resource::<EntityIndex>();
    let entry = index.get(player).unwrap();
    assert_eq!(entry.category, Category::Player);
    assert_eq!(entry.position, Vec3::new(1.0, -4.0, 2.0));

    app.world_mut().despawn(player);
    app.update();
    assert!(!app.world().resource::<EntityIndex>().contains(player));
}

#[test]
fn test_net_catches_player() {
    let mut app = test_app("net");
    let net = NetVolume::new(NetConfig::default()).unwrap();
    let cylinder = net.cylinder(Vec3::ZERO, Vec3::NEG_Z).unwrap();

    spawn_player(&mut app, cylinder.center);
    app.world_mut().spawn((net, Transform::default()));

    app.update();
    app.update();

    assert_eq!(state(&app), GameState::GameOver);
}

#[test]
fn test_hazard_hurts_player_once() {
    let mut app = test_app("hazard");
    let position = Vec3::new(0.0, -60.0, 0.0);
    let player = spawn_player(&mut app, position);
    app.world_mut().spawn((
        Hazard::new(0.5),
        Tagged::new(Category::Trash, 0.5),
        Transform::from_translation(position),
    ));

    for _ in 0..5 {
        app.update();
    }

    let health = app.world().get::<Health>(player).unwrap();
    assert!((health.current - 87.5).abs() < 1e-4);
}

#[test]
fn test_destroyed_obstacle_is_removed() {
    let mut app = test_app("obstacle");
    let rock = app
        .world_mut()
        .spawn((
            Tagged::new(Category::BreakableObstacle, 1.0),
            Transform::from_xyz(0.0, -80.0, 0.0),
        ))
        .id();
    let predator = app.world_mut().spawn_empty().id();
    app.update();

    app.world_mut().send_event(ObstacleDestroyed {
        obstacle: rock,
        destroyed_by: predator,
    });
    app.update();
    app.update();

    assert!(app.world().get::<Tagged>(rock).is_none());
    assert!(!app.world().resource::<EntityIndex>().contains(rock));
}

#[test]
fn test_predator_hunts_visible_player() {
    let mut app = test_app("predator");
    let mut predators = app.world_mut().query_filtered::<&Transform, With<Predator>>();
    let origin = predators.single(app.world()).translation;

    // Patrol heads for the second waypoint along +X; stand in its way
    let player = spawn_player(&mut app, origin + Vec3::new(15.0, 0.0, 0.0));

    let mut seen_chase = false;
    let mut chase_announced = false;
    for _ in 0..100 {
        app.update();
        chase_announced |= current_events::<PredatorStateChanged>(&app)
            .iter()
            .any(|e| e.state == PredatorState::Chasing);
        let mut brains = app.world_mut().query::<&PredatorBrain>();
        if let Ok(brain) = brains.get_single(app.world()) {
            seen_chase |= brain.state() == PredatorState::Chasing;
        }
        if state(&app) == GameState::GameOver {
            break;
        }
    }

    assert!(seen_chase);
    assert!(chase_announced);
    assert_eq!(state(&app), GameState::GameOver);
    assert!(app.world().get::<Health>(player).unwrap().is_dead());
}
