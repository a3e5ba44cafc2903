//! Difficulty curves: pure mappings from pollution to world parameters.
//!
//! Every curve is monotonic in its pollution input. Randomized curves take
//! the RNG as a parameter so callers can seed them.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use super::state::{PollutionScores, MAX_SCORE};
use crate::core::SceneTier;

/// Curve tuning.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Interval factor at zero trash
    pub interval_factor_clean: f32,
    /// Interval factor at maximum trash
    pub interval_factor_polluted: f32,
    /// Exponent of the danger curve
    pub danger_exponent: f32,
    /// Danger jitter half-width at zero trash
    pub danger_jitter_clean: f32,
    /// Danger jitter half-width at maximum trash
    pub danger_jitter_polluted: f32,
    /// Entity cap removed per point of fishing + carbon
    pub entities_per_score: u32,
    /// Entity cap never drops below this
    pub entity_floor: u32,
    /// Fog visibility distance with clean water
    pub max_visibility: f32,
    /// Fog visibility distance at maximum pollution
    pub min_visibility: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            interval_factor_clean: 1.0,
            interval_factor_polluted: 0.3,
            danger_exponent: 0.7,
            danger_jitter_clean: 0.3,
            danger_jitter_polluted: 0.05,
            entities_per_score: 9,
            entity_floor: 5,
            max_visibility: 60.0,
            min_visibility: 15.0,
        }
    }
}

/// Base predator tuning, before pollution scaling.
#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct PredatorBase {
    pub detection_radius: f32,
    pub chase_radius: f32,
    /// Full horizontal field of view, degrees
    pub horizontal_angle: f32,
    /// Full vertical field of view, degrees
    pub vertical_angle: f32,
    pub chase_speed: f32,
    /// Chase speed at full pollution, before the cap
    pub polluted_chase_speed: f32,
    /// Chase speed never exceeds this
    pub max_chase_speed: f32,
}

impl Default for PredatorBase {
    fn default() -> Self {
        Self {
            detection_radius: 30.0,
            chase_radius: 45.0,
            horizontal_angle: 120.0,
            vertical_angle: 60.0,
            chase_speed: 6.0,
            polluted_chase_speed: 12.0,
            max_chase_speed: 10.0,
        }
    }
}

/// Pollution-scaled predator perception and pursuit parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredatorParameters {
    pub detection_radius: f32,
    pub chase_radius: f32,
    pub horizontal_angle: f32,
    pub vertical_angle: f32,
    pub chase_speed: f32,
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn normalized(score: u8) -> f32 {
    (score.min(MAX_SCORE) as f32) / MAX_SCORE as f32
}

/// Multiplier applied to spawn intervals: 1.0 when clean, shrinking as
/// trash rises.
pub fn spawn_interval_factor(trash: u8, config: &DifficultyConfig) -> f32 {
    lerp(config.interval_factor_clean, config.interval_factor_polluted, normalized(trash))
}

/// Seconds until the next spawn. Higher trash means shorter intervals.
pub fn spawn_interval(trash: u8, min: f32, max: f32, config: &DifficultyConfig, rng: &mut impl Rng) -> f32 {
    let base = if max > min { rng.gen_range(min..=max) } else { min };
    base * spawn_interval_factor(trash, config)
}

/// Half-width of the danger jitter. Shrinks as trash rises.
pub fn danger_jitter(trash: u8, config: &DifficultyConfig) -> f32 {
    lerp(config.danger_jitter_clean, config.danger_jitter_polluted, normalized(trash))
}

/// Per-spawn hazard severity in [0, 1].
pub fn danger_level(trash: u8, config: &DifficultyConfig, rng: &mut impl Rng) -> f32 {
    let base = normalized(trash).powf(config.danger_exponent);
    let r = danger_jitter(trash, config);
    let jitter = if r > 0.0 { rng.gen_range(-r..=r) } else { 0.0 };
    (base + jitter).clamp(0.0, 1.0)
}

/// Population cap for prey entities.
pub fn max_entities_allowed(base: u32, fishing: u8, carbon: u8, config: &DifficultyConfig) -> u32 {
    let removed = config.entities_per_score * (fishing as u32 + carbon as u32);
    base.saturating_sub(removed).max(config.entity_floor)
}

/// Scale predator parameters by a pollution factor in [0, 1].
///
/// Perception shrinks toward half its base value while chase speed grows,
/// so murky water hides the player but a detected player is caught faster.
pub fn predator_parameters(pollution_factor: f32, base: &PredatorBase) -> PredatorParameters {
    let t = pollution_factor.clamp(0.0, 1.0);
    let shrink = lerp(1.0, 0.5, t);
    let speed = lerp(base.chase_speed, base.polluted_chase_speed, t);

    PredatorParameters {
        detection_radius: base.detection_radius * shrink,
        chase_radius: base.chase_radius * shrink,
        horizontal_angle: base.horizontal_angle * shrink,
        vertical_angle: base.vertical_angle * shrink,
        chase_speed: speed.min(base.max_chase_speed),
    }
}

/// Score band used by the boat table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// Scores 0-4
    Low,
    /// Scores 5-9
    Mid,
    /// Score 10
    Max,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=4 => ScoreBand::Low,
            5..=9 => ScoreBand::Mid,
            _ => ScoreBand::Max,
        }
    }
}

/// Target boat count per tier and band. Deliberately a step table.
const BOAT_TABLE: [[usize; 3]; 3] = [
    // Low, Mid, Max
    [2, 3, 5],  // Easy
    [4, 6, 8],  // Medium
    [6, 9, 12], // Hard
];

/// How many normal boats the fleet should hold.
pub fn boat_target_count(score: u8, tier: SceneTier) -> usize {
    let row = match tier {
        SceneTier::Easy => 0,
        SceneTier::Medium => 1,
        SceneTier::Hard => 2,
    };
    let column = match ScoreBand::from_score(score) {
        ScoreBand::Low => 0,
        ScoreBand::Mid => 1,
        ScoreBand::Max => 2,
    };
    BOAT_TABLE[row][column]
}

/// Fog visibility distance for an aggregate score in [0, 10].
pub fn fog_visibility(aggregate: f32, config: &DifficultyConfig) -> f32 {
    let t = (aggregate / MAX_SCORE as f32).clamp(0.0, 1.0);
    lerp(config.max_visibility, config.min_visibility, t)
}

/// Everything derived from the latest pollution snapshot.
///
/// Recomputed whenever pollution changes; consumers read the committed
/// values from the previous update.
#[derive(Resource, Debug, Clone, Copy)]
pub struct DifficultySnapshot {
    pub scores: PollutionScores,
    pub predator: PredatorParameters,
    pub spawn_interval_factor: f32,
    pub fog_visibility: f32,
    pub boat_target: usize,
}

impl DifficultySnapshot {
    pub fn compute(
        scores: PollutionScores,
        tier: SceneTier,
        config: &DifficultyConfig,
        predator: &PredatorBase,
    ) -> Self {
        Self {
            scores,
            predator: predator_parameters(scores.factor(), predator),
            spawn_interval_factor: spawn_interval_factor(scores.trash, config),
            fog_visibility: fog_visibility(scores.aggregate(), config),
            boat_target: boat_target_count(scores.fishing, tier),
        }
    }
}

impl Default for DifficultySnapshot {
    fn default() -> Self {
        Self::compute(
            PollutionScores::default(),
            SceneTier::default(),
            &DifficultyConfig::default(),
            &PredatorBase::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_interval_factor_endpoints() {
        let config = DifficultyConfig::default();
        assert!((spawn_interval_factor(0, &config) - 1.0).abs() < 1e-6);
        assert!((spawn_interval_factor(10, &config) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_interval_shrinks_with_trash() {
        let config = DifficultyConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let clean = spawn_interval(0, 4.0, 8.0, &config, &mut rng);
            assert!((4.0..=8.0).contains(&clean));
            let dirty = spawn_interval(10, 4.0, 8.0, &config, &mut rng);
            assert!((1.2 - 1e-5..=2.4 + 1e-5).contains(&dirty));
        }
    }

    #[test]
    fn test_danger_level_bounded_and_tightens() {
        let config = DifficultyConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        for trash in 0..=10 {
            for _ in 0..20 {
                let danger = danger_level(trash, &config, &mut rng);
                assert!((0.0..=1.0).contains(&danger));
            }
        }
        assert!(danger_jitter(10, &config) < danger_jitter(0, &config));

        // At full trash the base is 1.0, so the result sits in [0.95, 1.0]
        for _ in 0..20 {
            assert!(danger_level(10, &config, &mut rng) >= 0.95 - 1e-6);
        }
    }

    #[test]
    fn test_max_entities_allowed() {
        let config = DifficultyConfig::default();
        assert_eq!(max_entities_allowed(60, 0, 0, &config), 60);
        assert_eq!(max_entities_allowed(60, 2, 1, &config), 33);
        assert_eq!(max_entities_allowed(60, 10, 10, &config), config.entity_floor);
    }

    #[test]
    fn test_predator_parameters_inverse_coupling() {
        let base = PredatorBase::default();
        let clean = predator_parameters(0.0, &base);
        let dirty = predator_parameters(1.0, &base);

        assert_eq!(clean.detection_radius, base.detection_radius);
        assert!((dirty.detection_radius - base.detection_radius * 0.5).abs() < 1e-5);
        assert!((dirty.vertical_angle - base.vertical_angle * 0.5).abs() < 1e-5);
        assert!(dirty.chase_radius < clean.chase_radius);

        assert_eq!(clean.chase_speed, base.chase_speed);
        assert_eq!(dirty.chase_speed, base.max_chase_speed);

        let mid = predator_parameters(0.5, &base);
        assert!(mid.chase_speed > clean.chase_speed && mid.chase_speed <= dirty.chase_speed);
        assert!(mid.horizontal_angle < clean.horizontal_angle);
    }

    #[test]
    fn test_boat_target_count_table() {
        assert_eq!(boat_target_count(0, SceneTier::Easy), 2);
        assert_eq!(boat_target_count(4, SceneTier::Easy), 2);
        assert_eq!(boat_target_count(5, SceneTier::Easy), 3);
        assert_eq!(boat_target_count(9, SceneTier::Medium), 6);
        assert_eq!(boat_target_count(10, SceneTier::Hard), 12);
    }

    #[test]
    fn test_fog_visibility_monotonic() {
        let config = DifficultyConfig::default();
        let mut previous = f32::MAX;
        for step in 0..=20 {
            let visibility = fog_visibility(step as f32 * 0.5, &config);
            assert!(visibility <= previous);
            previous = visibility;
        }
        assert_eq!(fog_visibility(10.0, &config), config.min_visibility);
    }
}
