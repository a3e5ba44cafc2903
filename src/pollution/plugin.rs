//! Pollution plugin - growth, overrides, derived difficulty and saving.

use bevy::prelude::*;

use super::difficulty::DifficultySnapshot;
use super::persistence::{load_record, save_record, PollutionRecord, SavePath};
use super::state::{PollutionScores, PollutionState};
use crate::core::{
    load_sim_config, GameState, PollutionChanged, RestartSession, SceneTier, SetPollutionScores,
    SimConfig, SimSet,
};

/// Pollution plugin - owns the session's `PollutionState` and keeps the
/// `DifficultySnapshot` in sync with it.
pub struct PollutionPlugin;

impl Plugin for PollutionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SavePath>()
            .init_resource::<PollutionState>()
            .init_resource::<DifficultySnapshot>()
            .add_systems(Startup, init_pollution.after(load_sim_config))
            // Requests are honored in any state, e.g. a restart from GameOver
            .add_systems(
                Update,
                (sync_growth_config, apply_score_overrides, restart_session)
                    .chain()
                    .before(SimSet::Pollution),
            )
            .add_systems(Update, advance_pollution.in_set(SimSet::Pollution))
            .add_systems(Update, refresh_difficulty.in_set(SimSet::Difficulty))
            .add_systems(OnExit(GameState::InGame), save_pollution);
    }
}

/// Create the session's pollution state from the save file, or clean.
pub fn init_pollution(
    config: Res<SimConfig>,
    save_path: Res<SavePath>,
    mut pollution: ResMut<PollutionState>,
    mut changed: EventWriter<PollutionChanged>,
) {
    let scores: PollutionScores = match load_record(&save_path.0) {
        Ok(Some(record)) => {
            info!("Loaded pollution record from {:?}: {:?}", save_path.0, record);
            record.into()
        }
        Ok(None) => default(),
        Err(e) => {
            error!("{}, starting clean", e);
            default()
        }
    };

    *pollution = PollutionState::with_scores(config.growth.clone(), scores);
    changed.send(PollutionChanged {
        scores: pollution.scores(),
    });
}

/// Pick up growth tuning when the config is replaced.
pub fn sync_growth_config(config: Res<SimConfig>, mut pollution: ResMut<PollutionState>) {
    if config.is_changed() {
        pollution.set_config(config.growth.clone());
    }
}

/// Apply the growth rule for this frame's elapsed time.
pub fn advance_pollution(
    time: Res<Time>,
    mut pollution: ResMut<PollutionState>,
    mut changed: EventWriter<PollutionChanged>,
) {
    if let Some(scores) = pollution.advance_tick(time.delta_secs()) {
        debug!("Pollution grew to {:?} (aggregate {})", scores, scores.aggregate());
        changed.send(PollutionChanged { scores });
    }
}

/// Overwrite the counters on request.
pub fn apply_score_overrides(
    mut requests: EventReader<SetPollutionScores>,
    mut pollution: ResMut<PollutionState>,
    mut changed: EventWriter<PollutionChanged>,
) {
    for request in requests.read() {
        let s = request.scores;
        let scores = pollution.set_scores(s.carbon, s.trash, s.fishing, s.sewage);
        info!("Pollution scores set to {:?}", scores);
        changed.send(PollutionChanged { scores });
    }
}

/// Reset pollution for a fresh session.
pub fn restart_session(
    mut requests: EventReader<RestartSession>,
    mut pollution: ResMut<PollutionState>,
    mut changed: EventWriter<PollutionChanged>,
) {
    if requests.read().last().is_some() {
        let scores = pollution.reset();
        info!("Session restarted, pollution cleared");
        changed.send(PollutionChanged { scores });
    }
}

/// Recompute derived difficulty from the latest snapshot or tier change.
pub fn refresh_difficulty(
    mut events: EventReader<PollutionChanged>,
    tier: Res<SceneTier>,
    config: Res<SimConfig>,
    mut snapshot: ResMut<DifficultySnapshot>,
) {
    let latest = events.read().last().map(|e| e.scores);
    if latest.is_none() && !tier.is_changed() && !config.is_changed() {
        return;
    }

    let scores = latest.unwrap_or(snapshot.scores);
    *snapshot = DifficultySnapshot::compute(
        scores,
        *tier,
        &config.difficulty,
        &config.predator.base,
    );
}

/// Persist the counters when leaving gameplay.
pub fn save_pollution(pollution: Res<PollutionState>, save_path: Res<SavePath>) {
    let record = PollutionRecord::from(pollution.scores());
    match save_record(&save_path.0, &record) {
        Ok(()) => info!("Saved pollution record to {:?}", save_path.0),
        Err(e) => error!("{}", e),
    }
}
