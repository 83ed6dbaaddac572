//! Host boundary
//!
//! A host drives the engine with one `advance` per display frame, passing its
//! own millisecond timestamp and the currently held controls. Discrete
//! commands are queued and applied at the start of the next frame. Rendering
//! reads the run through `snapshot`.

use crate::settings::Settings;
use crate::sim::{Command, HeldInputs, RunState, TickInput, tick};
use crate::tuning::Tuning;

/// Owns one run and its configuration
#[derive(Debug, Clone)]
pub struct Engine {
    state: RunState,
    tuning: Tuning,
    settings: Settings,
    pending: Vec<Command>,
}

impl Engine {
    /// Engine with default tuning and settings, sitting on the title screen
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), Settings::default())
    }

    pub fn with_config(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        log::info!(
            "Engine created (seed {seed}, {} controls)",
            settings.control_scheme.as_str()
        );
        Self {
            state: RunState::new(seed, &tuning),
            tuning,
            settings,
            pending: Vec::new(),
        }
    }

    /// Queue a command for the next frame
    pub fn submit_command(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Run one frame at host time `now_ms`
    pub fn advance(&mut self, now_ms: f64, held: HeldInputs) {
        let input = TickInput {
            now: now_ms,
            held,
            commands: std::mem::take(&mut self.pending),
        };
        tick(&mut self.state, &input, &self.tuning);
    }

    /// Read-only view of the run for renderers
    pub fn snapshot(&self) -> &RunState {
        &self.state
    }

    /// The run serialized for a JS or tooling host
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.state)
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap presentation settings (orientation change, window resize)
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }
}
