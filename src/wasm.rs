//! Browser bindings
//!
//! The page owns the canvas, the animation frame loop and the DOM controls.
//! It forwards key and touch-button state here, calls `advance` with the
//! `requestAnimationFrame` timestamp, and draws from `snapshot_json`.

use wasm_bindgen::prelude::*;

use crate::engine::Engine;
use crate::settings::{ControlScheme, Settings};
use crate::sim::{Command, HeldInputs, Mode};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier instance
        return;
    }
    log::info!("Sleigh Run starting...");
}

/// Engine handle exported to JS
#[wasm_bindgen]
pub struct WebEngine {
    engine: Engine,
    held: HeldInputs,
}

#[wasm_bindgen]
impl WebEngine {
    /// `tuning_json` may be empty; malformed tuning falls back to defaults
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64, window_width: f32, touch: bool, tuning_json: &str) -> WebEngine {
        let scheme = if touch {
            ControlScheme::Touch
        } else {
            ControlScheme::Keyboard
        };
        let tuning = if tuning_json.trim().is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning_json).unwrap_or_else(|err| {
                log::warn!("Ignoring tuning overrides: {err}");
                Tuning::default()
            })
        };
        WebEngine {
            engine: Engine::with_config(
                seed as u64,
                tuning,
                Settings::for_window(window_width, scheme),
            ),
            held: HeldInputs::default(),
        }
    }

    /// Key or touch-button transition. Returns true when the name was bound,
    /// so the page can suppress default browser handling.
    pub fn input(&mut self, name: &str, down: bool) -> bool {
        let scheme = self.engine.settings().control_scheme;
        if scheme.apply(&mut self.held, name, down) {
            return true;
        }
        if !down {
            return false;
        }
        let command = match (name, self.engine.snapshot().mode) {
            ("Enter", Mode::Title) => Command::StartGame,
            ("Enter", Mode::Intro) => Command::StartStage,
            ("Enter", mode) if mode.is_terminal() => Command::Restart,
            ("Enter", Mode::DcInterstitial) => Command::ConfirmInterstitial,
            ("Escape" | "p" | "P", _) => Command::TogglePause,
            _ => return false,
        };
        self.engine.submit_command(command);
        true
    }

    /// Named command from an on-screen button
    pub fn command(&mut self, name: &str) -> bool {
        match Command::from_name(name) {
            Some(command) => {
                self.engine.submit_command(command);
                true
            }
            None => {
                log::warn!("Unknown command {name}");
                false
            }
        }
    }

    /// Window lost focus: release everything and pause
    pub fn blur(&mut self) {
        self.held = HeldInputs::default();
        let state = self.engine.snapshot();
        if state.mode.is_playing() && !state.paused {
            self.engine.submit_command(Command::TogglePause);
            log::info!("Auto-paused (window blur)");
        }
    }

    pub fn resize(&mut self, window_width: f32) {
        let scheme = self.engine.settings().control_scheme;
        self.engine
            .set_settings(Settings::for_window(window_width, scheme));
    }

    pub fn advance(&mut self, now_ms: f64) {
        self.engine.advance(now_ms, self.held);
    }

    /// Canvas scale factor (pixels per world unit)
    pub fn scale(&self) -> f32 {
        self.engine.settings().viewport.scale
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.engine
            .snapshot_json()
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }
}
