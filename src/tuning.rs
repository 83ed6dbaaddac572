//! Data-driven game balance
//!
//! Every per-frame constant is expressed against the 60 fps baseline and is
//! scaled by the clamped frame multiplier at the call site. Durations are in
//! milliseconds of host time.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Gameplay constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Flight ===
    pub gravity: f32,
    pub thrust: f32,
    /// Fastest downward speed (positive is down)
    pub max_fall: f32,
    /// Fastest upward speed (negative)
    pub max_rise: f32,
    pub scroll_speed: f32,
    /// Fog bands drift toward the player at this rate on top of the scroll
    pub fog_speed: f32,
    pub flight_move_speed: f32,
    /// Vertical fine trim from up/down input
    pub flight_trim: f32,
    pub flight_min_x: f32,
    pub flight_max_x: f32,
    pub ceiling_y: f32,
    /// Snow line; the player's feet may not cross it
    pub ground_y: f32,
    pub flight_spawn: Vec2,
    /// Scroll distance of a flight stage
    pub flight_length: f32,
    /// The shaft latches once its screen x drops below this
    pub shaft_trigger_x: f32,

    // === City ===
    pub walk_speed: f32,
    pub jump_velocity: f32,
    /// Horizontal velocity multiplier per frame with no input held
    pub walk_damping: f32,
    /// Below this horizontal speed the player stops dead
    pub walk_snap: f32,
    /// Jumps allowed after leaving the ground (2 = triple jump)
    pub air_jumps: u32,

    // === Energy, lives, scoring ===
    pub max_energy: f32,
    pub energy_drain: f32,
    pub fog_penalty: f32,
    pub starting_lives: u32,
    pub presents_needed: u32,
    pub points_per_energy: u64,
    pub points_per_life: u64,
    pub points_per_goody: u64,

    // === Timed effects (ms) ===
    pub ready_ms: f64,
    pub invincibility_ms: f64,
    pub fog_pause_ms: f64,
    /// Gravity multiplier while the fog pause window is active
    pub fog_gravity_scale: f32,
    pub beam_ms: f64,
    pub dissolve_ms: f64,
    pub zap_ms: f64,
    pub interstitial_ms: f64,

    // === Wind ===
    pub wind_warning_ms: f64,
    /// No new warnings this long after a city respawn
    pub wind_calm_ms: f64,
    /// Quiet interval before a warning, per city id
    pub wind_intervals: BTreeMap<String, f64>,
    pub default_wind_interval_ms: f64,
    pub wind_strength_min: f32,
    pub wind_strength_spread: f32,
    pub wind_duration_min_ms: f64,
    pub wind_duration_spread_ms: f64,
    pub wind_velocity_factor: f32,
    pub wind_position_factor: f32,

    // === Goodies ===
    pub goodies_enabled: bool,
    pub goody_interval_ms: f64,
    pub goody_speed_min: f32,
    pub goody_speed_spread: f32,

    // === Flow ===
    /// City whose exit shows the interstitial before the next flight
    pub interstitial_city: String,

    // === HUD messages (ms) ===
    pub message_short_ms: f64,
    pub message_ms: f64,
    pub message_long_ms: f64,
    pub message_extra_long_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        let wind_intervals = [
            ("montreal", 4500.0),
            ("nyc", 2500.0),
            ("dc", 1500.0),
            ("nashville", 500.0),
        ]
        .into_iter()
        .map(|(id, ms)| (id.to_string(), ms))
        .collect();

        Self {
            gravity: 0.12,
            thrust: 0.25,
            max_fall: 4.0,
            max_rise: -3.0,
            scroll_speed: 1.2,
            fog_speed: 1.8,
            flight_move_speed: 1.7,
            flight_trim: 0.1,
            flight_min_x: 50.0,
            flight_max_x: 750.0,
            ceiling_y: 20.0,
            ground_y: 500.0,
            flight_spawn: Vec2::new(150.0, 250.0),
            flight_length: 3000.0,
            shaft_trigger_x: 550.0,

            walk_speed: 2.5,
            jump_velocity: -4.4,
            walk_damping: 0.8,
            walk_snap: 0.5,
            air_jumps: 2,

            max_energy: 100.0,
            energy_drain: 0.082,
            fog_penalty: 20.0,
            starting_lives: 10,
            presents_needed: 3,
            points_per_energy: 100,
            points_per_life: 1000,
            points_per_goody: 500,

            ready_ms: 3000.0,
            invincibility_ms: 5000.0,
            fog_pause_ms: 2000.0,
            fog_gravity_scale: 0.15,
            beam_ms: 500.0,
            dissolve_ms: 800.0,
            zap_ms: 400.0,
            interstitial_ms: 3000.0,

            wind_warning_ms: 1500.0,
            wind_calm_ms: 3000.0,
            wind_intervals,
            default_wind_interval_ms: 4500.0,
            wind_strength_min: 2.5,
            wind_strength_spread: 2.0,
            wind_duration_min_ms: 1500.0,
            wind_duration_spread_ms: 1500.0,
            wind_velocity_factor: 0.135,
            wind_position_factor: 0.27,

            goodies_enabled: true,
            goody_interval_ms: 5000.0,
            goody_speed_min: 0.75,
            goody_speed_spread: 0.25,

            interstitial_city: "dc".to_string(),

            message_short_ms: 1000.0,
            message_ms: 1500.0,
            message_long_ms: 2000.0,
            message_extra_long_ms: 2500.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document; missing fields keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Reject values that would break the simulation's invariants.
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("gravity", self.gravity as f64),
            ("max_fall", self.max_fall as f64),
            ("max_energy", self.max_energy as f64),
            ("flight_length", self.flight_length as f64),
            ("ready_ms", self.ready_ms),
        ];
        for (field, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        let non_negative = [
            ("energy_drain", self.energy_drain as f64),
            ("fog_penalty", self.fog_penalty as f64),
            ("invincibility_ms", self.invincibility_ms),
            ("fog_pause_ms", self.fog_pause_ms),
            ("wind_warning_ms", self.wind_warning_ms),
            ("goody_interval_ms", self.goody_interval_ms),
            ("interstitial_ms", self.interstitial_ms),
        ];
        for (field, value) in non_negative {
            if value < 0.0 || !value.is_finite() {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        // Energy is a percentage
        if self.max_energy > 100.0 {
            return Err(TuningError::OutOfRange {
                field: "max_energy",
                value: self.max_energy as f64,
            });
        }

        let unit = [
            ("fog_gravity_scale", self.fog_gravity_scale as f64),
            ("walk_damping", self.walk_damping as f64),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        if self.max_rise >= 0.0 {
            return Err(TuningError::OutOfRange {
                field: "max_rise",
                value: self.max_rise as f64,
            });
        }
        if self.starting_lives == 0 {
            return Err(TuningError::OutOfRange {
                field: "starting_lives",
                value: 0.0,
            });
        }
        // A respawn must stay protected for the whole ready window
        if self.invincibility_ms < self.ready_ms {
            return Err(TuningError::OutOfRange {
                field: "invincibility_ms",
                value: self.invincibility_ms,
            });
        }
        Ok(())
    }

    /// Quiet interval before the next wind warning in a city.
    /// Unknown cities use the default interval.
    pub fn wind_interval(&self, city_id: &str) -> f64 {
        self.wind_intervals
            .get(city_id)
            .copied()
            .unwrap_or(self.default_wind_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.2, "air_jumps": 1 }"#).unwrap();
        assert_eq!(tuning.gravity, 0.2);
        assert_eq!(tuning.air_jumps, 1);
        assert_eq!(tuning.starting_lives, 10);
        assert_eq!(tuning.wind_interval("nashville"), 500.0);
    }

    #[test]
    fn test_rejects_short_invincibility() {
        let err = Tuning::from_json(r#"{ "invincibility_ms": 1000.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "invincibility_ms",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_energy_above_full() {
        let err = Tuning::from_json(r#"{ "max_energy": 150.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "max_energy",
                ..
            }
        ));
        assert!(Tuning::from_json(r#"{ "max_energy": 80.0 }"#).is_ok());
    }

    #[test]
    fn test_damping_factors_stay_in_unit_range() {
        for (json, name) in [
            (r#"{ "fog_gravity_scale": -0.1 }"#, "fog_gravity_scale"),
            (r#"{ "walk_damping": 1.5 }"#, "walk_damping"),
            (r#"{ "walk_damping": -0.5 }"#, "walk_damping"),
        ] {
            match Tuning::from_json(json) {
                Err(TuningError::OutOfRange { field, .. }) => assert_eq!(field, name),
                other => panic!("{json} gave {other:?}"),
            }
        }
        assert!(Tuning::from_json(r#"{ "walk_damping": 1.0, "fog_gravity_scale": 0.0 }"#).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ gravity: "),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_city_wind_interval() {
        let tuning = Tuning::default();
        assert_eq!(tuning.wind_interval("atlantis"), 4500.0);
        assert_eq!(tuning.wind_interval("dc"), 1500.0);
    }
}
