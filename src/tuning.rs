//! Game balance knobs
//!
//! Loaded from an optional JSON file; anything missing falls back to the
//! compiled-in defaults from `consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Slowest speed an agent may be configured with (pixels per frame)
const MIN_SPEED: f32 = 0.05;

/// Fastest speed that still lets every agent stop on every cell center
const MAX_SPEED: f32 = (CELL_SIZE / 2.0) / MAX_FRAME_SCALE;

/// Balance parameters for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Player speed in pixels per nominal frame
    pub player_speed: f32,
    /// Pursuer speed while hunting (pixels per nominal frame)
    pub pursuer_speed: f32,
    /// Pursuer speed while scared
    pub pursuer_scared_speed: f32,
    /// Length of power mode in ticks
    pub power_duration_ticks: u32,
    /// Minimum wall time between two pursuer turns
    pub direction_change_interval_ms: f32,
    /// Chance that a pursuer takes its best-ranked direction
    pub best_choice_probability: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: PLAYER_SPEED,
            pursuer_speed: PURSUER_SPEED,
            pursuer_scared_speed: PURSUER_SCARED_SPEED,
            power_duration_ticks: POWER_DURATION_TICKS,
            direction_change_interval_ms: DIRECTION_CHANGE_INTERVAL_MS,
            best_choice_probability: BEST_CHOICE_PROBABILITY,
        }
    }
}

impl Tuning {
    /// Parse a tuning override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Self = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Invalid tuning file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp every knob into the range the motion model can handle
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            player_speed: clamp_speed(self.player_speed, defaults.player_speed),
            pursuer_speed: clamp_speed(self.pursuer_speed, defaults.pursuer_speed),
            pursuer_scared_speed: clamp_speed(
                self.pursuer_scared_speed,
                defaults.pursuer_scared_speed,
            ),
            power_duration_ticks: self.power_duration_ticks.max(1),
            direction_change_interval_ms: if self.direction_change_interval_ms.is_finite() {
                self.direction_change_interval_ms.max(0.0)
            } else {
                defaults.direction_change_interval_ms
            },
            best_choice_probability: if self.best_choice_probability.is_finite() {
                self.best_choice_probability.clamp(0.0, 1.0)
            } else {
                defaults.best_choice_probability
            },
        }
    }
}

fn clamp_speed(speed: f32, fallback: f32) -> f32 {
    if speed.is_finite() {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let tuning = Tuning::default();
        assert_eq!(tuning.clone().sanitized(), tuning);
        assert!(tuning.pursuer_scared_speed < tuning.pursuer_speed);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player_speed": 2.5 }"#).unwrap();
        assert_eq!(tuning.player_speed, 2.5);
        assert_eq!(tuning.pursuer_speed, PURSUER_SPEED);
        assert_eq!(tuning.power_duration_ticks, POWER_DURATION_TICKS);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let tuning = Tuning::from_json(
            r#"{
                "player_speed": 50.0,
                "pursuer_speed": -1.0,
                "power_duration_ticks": 0,
                "direction_change_interval_ms": -10.0,
                "best_choice_probability": 4.0
            }"#,
        )
        .unwrap();
        assert_eq!(tuning.player_speed, MAX_SPEED);
        assert_eq!(tuning.pursuer_speed, MIN_SPEED);
        assert_eq!(tuning.power_duration_ticks, 1);
        assert_eq!(tuning.direction_change_interval_ms, 0.0);
        assert_eq!(tuning.best_choice_probability, 1.0);
    }

    #[test]
    fn test_non_finite_falls_back() {
        let tuning = Tuning {
            player_speed: f32::NAN,
            best_choice_probability: f32::INFINITY,
            ..Tuning::default()
        }
        .sanitized();
        assert_eq!(tuning.player_speed, PLAYER_SPEED);
        assert_eq!(tuning.best_choice_probability, BEST_CHOICE_PROBABILITY);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Tuning::from_json("{ player_speed: fast }").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tuning = Tuning::load(Path::new("/nonexistent/maze-chase-tuning.json"));
        assert_eq!(tuning, Tuning::default());
    }
}
