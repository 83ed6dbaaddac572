//! Sleigh Run - a flight-and-rooftop arcade campaign
//!
//! Core modules:
//! - `sim`: Deterministic simulation (generation, physics, collisions, mode machine)
//! - `engine`: Host boundary (advance / snapshot / commands)
//! - `tuning`: Data-driven game balance
//! - `settings`: Viewport and control scheme

pub mod engine;
pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use engine::Engine;
pub use error::TuningError;
pub use settings::{ControlScheme, Settings, Viewport};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// World dimensions in base units (the renderer scales these)
    pub const WORLD_W: f32 = 900.0;
    pub const WORLD_H: f32 = 600.0;

    /// Frame baseline the per-frame constants are tuned against (60 fps)
    pub const BASE_FRAME_MS: f64 = 16.67;
    /// Delta-time multiplier bounds: never slower than real time, at most 3 frames of catch-up
    pub const MIN_DT: f32 = 1.0;
    pub const MAX_DT: f32 = 3.0;

    /// Player bounding box
    pub const PLAYER_W: f32 = 25.0;
    pub const PLAYER_H: f32 = 15.0;

    /// Number of ambient snowflakes kept alive
    pub const SNOWFLAKES: usize = 50;
}

/// Convert a host frame delta (ms) into the clamped frame multiplier.
///
/// Slow devices get up to three frames of catch-up; fast devices are never
/// slowed below the 60 fps baseline.
#[inline]
pub fn frame_multiplier(delta_ms: f64) -> f32 {
    ((delta_ms / consts::BASE_FRAME_MS) as f32).clamp(consts::MIN_DT, consts::MAX_DT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_multiplier_clamps_both_ends() {
        assert_eq!(frame_multiplier(4.0), 1.0);
        assert_eq!(frame_multiplier(16.67), 1.0);
        assert!((frame_multiplier(33.34) - 2.0).abs() < 1e-4);
        assert_eq!(frame_multiplier(500.0), 3.0);
    }
}
