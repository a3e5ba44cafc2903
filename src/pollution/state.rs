//! Pollution counters and the growth rule.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Upper bound of every pollution counter.
pub const MAX_SCORE: u8 = 10;

/// The four pollution categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollutionKind {
    Carbon,
    Trash,
    Fishing,
    Sewage,
}

impl PollutionKind {
    pub const ALL: [PollutionKind; 4] = [
        PollutionKind::Carbon,
        PollutionKind::Trash,
        PollutionKind::Fishing,
        PollutionKind::Sewage,
    ];

    fn index(self) -> usize {
        match self {
            PollutionKind::Carbon => 0,
            PollutionKind::Trash => 1,
            PollutionKind::Fishing => 2,
            PollutionKind::Sewage => 3,
        }
    }
}

/// Immutable copy of the four counters handed to readers each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PollutionScores {
    pub carbon: u8,
    pub trash: u8,
    pub fishing: u8,
    pub sewage: u8,
}

impl PollutionScores {
    pub fn new(carbon: u8, trash: u8, fishing: u8, sewage: u8) -> Self {
        Self {
            carbon: carbon.min(MAX_SCORE),
            trash: trash.min(MAX_SCORE),
            fishing: fishing.min(MAX_SCORE),
            sewage: sewage.min(MAX_SCORE),
        }
    }

    pub fn get(&self, kind: PollutionKind) -> u8 {
        match kind {
            PollutionKind::Carbon => self.carbon,
            PollutionKind::Trash => self.trash,
            PollutionKind::Fishing => self.fishing,
            PollutionKind::Sewage => self.sewage,
        }
    }

    fn get_mut(&mut self, kind: PollutionKind) -> &mut u8 {
        match kind {
            PollutionKind::Carbon => &mut self.carbon,
            PollutionKind::Trash => &mut self.trash,
            PollutionKind::Fishing => &mut self.fishing,
            PollutionKind::Sewage => &mut self.sewage,
        }
    }

    /// Mean of the four integer counters.
    pub fn aggregate(&self) -> f32 {
        (self.carbon as f32 + self.trash as f32 + self.fishing as f32 + self.sewage as f32) / 4.0
    }

    /// Aggregate normalized to [0, 1].
    pub fn factor(&self) -> f32 {
        self.aggregate() / MAX_SCORE as f32
    }
}

/// Growth rule tuning.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GrowthConfig {
    /// Seconds between growth steps
    pub update_interval: f32,
    /// Total growth per step at zero pollution, split over four categories
    pub base_rate: f32,
    /// Linear acceleration term applied on top of the exponential one
    pub acceleration: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            update_interval: 30.0,
            base_rate: 0.4,
            acceleration: 0.05,
        }
    }
}

/// The session's pollution counters.
///
/// Growth is accumulated in per-category fractions so that sub-integer
/// rates are carried over between steps instead of being floored away.
#[derive(Resource, Debug, Clone, Default)]
pub struct PollutionState {
    scores: PollutionScores,
    fractions: [f32; 4],
    timer: f32,
    config: GrowthConfig,
}

impl PollutionState {
    pub fn new(config: GrowthConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    /// Start from persisted scores.
    pub fn with_scores(config: GrowthConfig, scores: PollutionScores) -> Self {
        Self {
            scores: PollutionScores::new(scores.carbon, scores.trash, scores.fishing, scores.sewage),
            config,
            ..default()
        }
    }

    pub fn scores(&self) -> PollutionScores {
        self.scores
    }

    pub fn aggregate(&self) -> f32 {
        self.scores.aggregate()
    }

    pub fn fraction(&self, kind: PollutionKind) -> f32 {
        self.fractions[kind.index()]
    }

    pub fn set_config(&mut self, config: GrowthConfig) {
        self.config = config;
    }

    /// Growth per step at the current aggregate, before splitting.
    pub fn growth_rate(&self) -> f32 {
        let aggregate = self.aggregate();
        self.config.base_rate * 1.25_f32.powf(aggregate) * (1.0 + self.config.acceleration * aggregate)
    }

    /// Advance the interval timer. Returns the new snapshot if at least one
    /// growth step was applied.
    pub fn advance_tick(&mut self, elapsed: f32) -> Option<PollutionScores> {
        if self.config.update_interval <= 0.0 || elapsed <= 0.0 {
            return None;
        }

        let interval = self.config.update_interval;
        self.timer += elapsed;
        let steps = (self.timer / interval).floor();
        if steps < 1.0 {
            return None;
        }
        self.timer = self.timer.rem_euclid(interval);

        // Bounded by the step count; saturated counters cannot grow further
        let mut remaining = steps as u64;
        while remaining > 0 && !self.is_saturated() {
            self.grow();
            remaining -= 1;
        }

        Some(self.scores)
    }

    /// Every counter is at the cap.
    pub fn is_saturated(&self) -> bool {
        PollutionKind::ALL.iter().all(|&kind| self.scores.get(kind) >= MAX_SCORE)
    }

    fn grow(&mut self) {
        let per_category = self.growth_rate() / 4.0;

        for kind in PollutionKind::ALL {
            let i = kind.index();
            let score = self.scores.get_mut(kind);

            if *score >= MAX_SCORE {
                self.fractions[i] = 0.0;
                continue;
            }

            self.fractions[i] += per_category;
            let whole = self.fractions[i].floor();
            self.fractions[i] -= whole;

            let room = MAX_SCORE - *score;
            let delta = (whole as u32).min(room as u32) as u8;
            *score += delta;

            if *score >= MAX_SCORE {
                self.fractions[i] = 0.0;
            }
        }
    }

    /// Hard overwrite, e.g. from a quiz result. Clears carried fractions.
    pub fn set_scores(&mut self, carbon: u8, trash: u8, fishing: u8, sewage: u8) -> PollutionScores {
        self.scores = PollutionScores::new(carbon, trash, fishing, sewage);
        self.fractions = [0.0; 4];
        self.scores
    }

    /// Back to a clean session.
    pub fn reset(&mut self) -> PollutionScores {
        self.timer = 0.0;
        self.set_scores(0, 0, 0, 0)
    }
}
