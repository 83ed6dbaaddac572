//! Host presentation settings
//!
//! The desktop and touch layouts share one engine; these settings only tell
//! the host how to map its pixels and controls onto the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{WORLD_H, WORLD_W};
use crate::sim::HeldInputs;

/// Which control surface the host is wiring up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlScheme {
    #[default]
    Keyboard,
    Touch,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::Keyboard => "Keyboard",
            ControlScheme::Touch => "Touch",
        }
    }

    /// Set or clear the held flag bound to a key name (keyboard) or on-screen
    /// button name (touch). Returns false for unbound names.
    pub fn apply(&self, held: &mut HeldInputs, name: &str, down: bool) -> bool {
        let slot = match (self, name) {
            (ControlScheme::Keyboard, "ArrowUp") | (ControlScheme::Touch, "up") => &mut held.up,
            (ControlScheme::Keyboard, "ArrowDown") | (ControlScheme::Touch, "down") => {
                &mut held.down
            }
            (ControlScheme::Keyboard, "ArrowLeft") | (ControlScheme::Touch, "left") => {
                &mut held.left
            }
            (ControlScheme::Keyboard, "ArrowRight") | (ControlScheme::Touch, "right") => {
                &mut held.right
            }
            (ControlScheme::Keyboard, " ") | (ControlScheme::Touch, "fly") => &mut held.action,
            (ControlScheme::Keyboard, "r" | "R") | (ControlScheme::Touch, "clear") => {
                &mut held.clear_fog
            }
            _ => return false,
        };
        *slot = down;
        true
    }
}

/// Mapping between host pixels and world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Pixels per world unit
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl Viewport {
    /// Fit the world into a host window. Narrow or touch displays shrink the
    /// canvas to the window width minus a 20px margin; desktops draw 1:1.
    pub fn fit(window_width: f32, scheme: ControlScheme) -> Self {
        if scheme == ControlScheme::Touch || window_width < 768.0 {
            let width = (window_width - 20.0).clamp(1.0, WORLD_W);
            Self {
                scale: width / WORLD_W,
            }
        } else {
            Self::default()
        }
    }

    /// Host canvas size in pixels
    pub fn canvas_size(&self) -> Vec2 {
        Vec2::new(WORLD_W, WORLD_H) * self.scale
    }

    /// Convert a canvas-relative pixel position into world units
    pub fn to_world(&self, pixel: Vec2) -> Vec2 {
        pixel / self.scale
    }
}

/// Host settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub control_scheme: ControlScheme,
    pub viewport: Viewport,
}

impl Settings {
    /// Build settings for a window, picking the viewport from the scheme
    pub fn for_window(window_width: f32, control_scheme: ControlScheme) -> Self {
        Self {
            control_scheme,
            viewport: Viewport::fit(window_width, control_scheme),
        }
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(err) => {
                log::warn!("Ignoring malformed settings ({err}), using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_viewport_is_unscaled() {
        let viewport = Viewport::fit(1280.0, ControlScheme::Keyboard);
        assert_eq!(viewport.scale, 1.0);
        assert_eq!(viewport.canvas_size(), Vec2::new(900.0, 600.0));
    }

    #[test]
    fn test_touch_viewport_round_trips_pixels() {
        let viewport = Viewport::fit(470.0, ControlScheme::Touch);
        assert!((viewport.scale - 0.5).abs() < 1e-6);
        assert_eq!(viewport.to_world(Vec2::new(225.0, 150.0)), Vec2::new(450.0, 300.0));
    }

    #[test]
    fn test_schemes_bind_different_names() {
        let mut held = HeldInputs::default();
        assert!(ControlScheme::Keyboard.apply(&mut held, " ", true));
        assert!(held.action);
        assert!(!ControlScheme::Keyboard.apply(&mut held, "fly", false));
        assert!(held.action);
        assert!(ControlScheme::Touch.apply(&mut held, "fly", false));
        assert!(!held.action);
    }

    #[test]
    fn test_malformed_settings_fall_back() {
        let settings = Settings::from_json("not json");
        assert_eq!(settings.control_scheme, ControlScheme::Keyboard);
    }
}
