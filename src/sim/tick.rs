//! Per-frame simulation tick
//!
//! One call per host frame. Commands queued since the previous frame are
//! applied first, then the clamped frame multiplier is derived from the host
//! timestamp and the active mode's step runs.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, Goody, GoodyKind, Mode, RunState, Snowflake};
use super::{city, flight, machine};
use crate::consts::*;
use crate::frame_multiplier;
use crate::tuning::Tuning;

/// Control flags the host holds down between frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldInputs {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Thrust in flight, jump in a city
    pub action: bool,
    pub clear_fog: bool,
}

/// Discrete host commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    StartGame,
    StartStage,
    ClearFog,
    TogglePause,
    Restart,
    ConfirmInterstitial,
}

impl Command {
    /// Parse a host-side command name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start_game" => Some(Command::StartGame),
            "start_stage" => Some(Command::StartStage),
            "clear_fog" => Some(Command::ClearFog),
            "toggle_pause" => Some(Command::TogglePause),
            "restart" => Some(Command::Restart),
            "confirm_interstitial" => Some(Command::ConfirmInterstitial),
            _ => None,
        }
    }
}

/// Everything the host supplies for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Host timestamp in milliseconds
    pub now: f64,
    pub held: HeldInputs,
    /// Commands submitted since the previous frame, in order
    pub commands: Vec<Command>,
}

/// Advance the run by one host frame
pub fn tick(state: &mut RunState, input: &TickInput, tuning: &Tuning) {
    state.events.clear();
    let now = input.now;
    state.now = now;

    for command in &input.commands {
        machine::apply_command(state, *command, now, tuning);
    }

    // The frame clock stands still while paused
    if state.paused {
        return;
    }

    let dt = match state.last_frame_at {
        Some(prev) => frame_multiplier(now - prev),
        None => MIN_DT,
    };
    state.last_frame_at = Some(now);

    latch_inputs(state, &input.held);
    state.effects.prune(now);
    update_snow(state, dt);

    if state.mode.is_playing() && tuning.goodies_enabled {
        update_goodies(state, dt, now, tuning);
    }

    match state.mode {
        Mode::Flight => flight::step(state, &input.held, dt, now, tuning),
        Mode::City => city::step(state, &input.held, dt, now, tuning),
        Mode::DcInterstitial => machine::resolve_interstitial(state, now, tuning),
        Mode::Title | Mode::Intro | Mode::Win | Mode::GameOver => {}
    }
}

/// Arm the one-shot actions on their rising edge
fn latch_inputs(state: &mut RunState, held: &HeldInputs) {
    let in_flight = state.mode == Mode::Flight;
    let latch = &mut state.input;
    if held.action && !latch.prev.action {
        latch.jump_armed = true;
    } else if !held.action {
        latch.jump_armed = false;
    }
    if in_flight && held.clear_fog && !latch.prev.clear_fog {
        latch.clear_fog_armed = true;
    }
    latch.prev = *held;
}

// === Ambient snow ===

fn update_snow(state: &mut RunState, dt: f32) {
    while state.snow.len() < SNOWFLAKES {
        let rng = state.rng();
        let flake = Snowflake {
            pos: Vec2::new(rng.random::<f32>() * WORLD_W, -10.0),
            size: 2.0 + rng.random::<f32>() * 3.0,
            speed: 1.0 + rng.random::<f32>() * 2.0,
        };
        state.snow.push(flake);
    }
    for flake in &mut state.snow {
        flake.pos.y += flake.speed * dt;
        flake.pos.x += (flake.pos.y / 30.0).sin() * 0.3 * dt;
    }
    state.snow.retain(|f| f.pos.y < WORLD_H + 10.0);
}

// === Goodies ===

fn update_goodies(state: &mut RunState, dt: f32, now: f64, tuning: &Tuning) {
    if now - state.last_goody_at > tuning.goody_interval_ms {
        let rng = state.rng();
        let kind = GoodyKind::ALL[rng.random_range(0..GoodyKind::ALL.len())];
        let x = 100.0 + rng.random::<f32>() * (WORLD_W - 200.0);
        let speed = tuning.goody_speed_min + rng.random::<f32>() * tuning.goody_speed_spread;
        state.goodies.push(Goody {
            kind,
            center: Vec2::new(x, -30.0),
            speed,
        });
        state.last_goody_at = now;
    }

    state.goodies.retain(|g| g.center.y < WORLD_H + 50.0);
    for goody in &mut state.goodies {
        goody.center.y += goody.speed * dt;
    }

    let player = state.player.rect();
    let mut collected = Vec::new();
    state.goodies.retain(|g| {
        let hit = player.overlaps(&g.rect());
        if hit {
            collected.push(g.kind);
        }
        !hit
    });
    for kind in collected {
        state.score += tuning.points_per_goody;
        state
            .effects
            .show_message(format!("+{} pts!", tuning.points_per_goody), now, tuning.message_short_ms);
        state.collected.push(kind);
        state.events.push(GameEvent::GoodyCollected { kind });
        log::debug!("Collected {kind:?}, score {}", state.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_state(tuning: &Tuning) -> RunState {
        let mut state = RunState::new(42, tuning);
        machine::apply_command(&mut state, Command::StartGame, 0.0, tuning);
        machine::apply_command(&mut state, Command::StartStage, 0.0, tuning);
        state
    }

    fn frame(now: f64) -> TickInput {
        TickInput {
            now,
            ..Default::default()
        }
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::from_name("clear_fog"), Some(Command::ClearFog));
        assert_eq!(Command::from_name("jump"), None);
    }

    #[test]
    fn test_first_frame_uses_baseline_multiplier() {
        let tuning = Tuning::default();
        let mut state = playing_state(&tuning);
        tick(&mut state, &frame(1000.0), &tuning);
        assert_eq!(state.last_frame_at, Some(1000.0));
        assert_eq!(state.snow.len(), SNOWFLAKES);
        // Every flake moved by exactly one baseline frame of its speed
        assert!(state.snow.iter().all(|f| (f.pos.y - (-10.0 + f.speed)).abs() < 1e-4));
    }

    #[test]
    fn test_pause_freezes_everything() {
        let tuning = Tuning::default();
        let mut state = playing_state(&tuning);
        tick(&mut state, &frame(0.0), &tuning);
        tick(
            &mut state,
            &TickInput {
                now: 16.0,
                commands: vec![Command::TogglePause],
                ..Default::default()
            },
            &tuning,
        );
        assert!(state.paused);
        let snow_before: Vec<f32> = state.snow.iter().map(|f| f.pos.y).collect();
        tick(&mut state, &frame(5000.0), &tuning);
        let snow_after: Vec<f32> = state.snow.iter().map(|f| f.pos.y).collect();
        assert_eq!(snow_before, snow_after);
        assert_eq!(state.last_frame_at, Some(0.0));
    }

    #[test]
    fn test_jump_arms_on_rising_edge_only() {
        let tuning = Tuning::default();
        let mut state = playing_state(&tuning);
        let held = HeldInputs {
            action: true,
            ..Default::default()
        };
        latch_inputs(&mut state, &held);
        assert!(state.input.jump_armed);
        state.input.jump_armed = false;
        latch_inputs(&mut state, &held);
        assert!(!state.input.jump_armed);
        latch_inputs(&mut state, &HeldInputs::default());
        latch_inputs(&mut state, &held);
        assert!(state.input.jump_armed);
    }

    #[test]
    fn test_clear_fog_tap_on_title_is_ignored() {
        let tuning = Tuning::default();
        let mut state = RunState::new(42, &tuning);
        let tap = HeldInputs {
            clear_fog: true,
            ..Default::default()
        };
        tick(
            &mut state,
            &TickInput {
                now: 0.0,
                held: tap,
                ..Default::default()
            },
            &tuning,
        );
        assert!(!state.input.clear_fog_armed);

        let start = TickInput {
            now: 16.0,
            commands: vec![Command::StartGame, Command::StartStage],
            ..Default::default()
        };
        tick(&mut state, &start, &tuning);
        assert_eq!(state.mode, Mode::Flight);
        let level = state.flight.as_ref().unwrap();
        assert_eq!(level.fogs.len(), 1);
        assert!(!level.fogs[0].cleared);
        assert!(state.effects.beam.is_none());
    }

    #[test]
    fn test_clear_fog_tap_in_city_does_not_carry_into_flight() {
        let tuning = Tuning::default();
        let mut state = playing_state(&tuning);
        machine::enter_stage(&mut state, 1, 0.0, &tuning);
        let tap = HeldInputs {
            clear_fog: true,
            ..Default::default()
        };
        tick(
            &mut state,
            &TickInput {
                now: 16.0,
                held: tap,
                ..Default::default()
            },
            &tuning,
        );
        tick(&mut state, &frame(32.0), &tuning);
        assert!(!state.input.clear_fog_armed);

        state.effects.ready = None;
        state.can_exit = true;
        state.player.pos = state.city.as_ref().unwrap().sleigh.pos;
        tick(&mut state, &frame(48.0), &tuning);
        assert_eq!(state.mode, Mode::Flight);
        assert_eq!(state.stage().map(|s| s.id), Some("to_nyc"));

        tick(&mut state, &frame(64.0), &tuning);
        let level = state.flight.as_ref().unwrap();
        assert!(!level.fogs.is_empty());
        assert!(level.fogs.iter().all(|f| !f.cleared));
        assert!(state.effects.beam.is_none());
    }

    #[test]
    fn test_first_goody_spawns_immediately_then_waits() {
        let tuning = Tuning::default();
        let mut state = playing_state(&tuning);
        state.last_goody_at = 0.0;
        update_goodies(&mut state, 1.0, 6000.0, &tuning);
        assert_eq!(state.goodies.len(), 1);
        let goody = &state.goodies[0];
        assert!((100.0..=800.0).contains(&goody.center.x));
        assert!((0.75..=1.0).contains(&goody.speed));
        update_goodies(&mut state, 1.0, 9000.0, &tuning);
        assert_eq!(state.goodies.len(), 1);
    }

    #[test]
    fn test_goody_collection_scores() {
        let tuning = Tuning::default();
        let mut state = playing_state(&tuning);
        state.last_goody_at = 1000.0;
        state.goodies.push(Goody {
            kind: GoodyKind::Cocoa,
            center: state.player.rect().pos + Vec2::new(12.0, 7.0),
            speed: 0.0,
        });
        let score = state.score;
        update_goodies(&mut state, 1.0, 1500.0, &tuning);
        assert!(state.goodies.is_empty());
        assert_eq!(state.score, score + 500);
        assert_eq!(state.collected, vec![GoodyKind::Cocoa]);
        assert_eq!(state.effects.message_text(1500.0), Some("+500 pts!"));
    }

    #[test]
    fn test_goodies_fall_off_screen() {
        let tuning = Tuning::default();
        let mut state = playing_state(&tuning);
        state.last_goody_at = 1000.0;
        state.goodies.push(Goody {
            kind: GoodyKind::Candy,
            center: Vec2::new(500.0, 660.0),
            speed: 1.0,
        });
        update_goodies(&mut state, 1.0, 1500.0, &tuning);
        assert!(state.goodies.is_empty());
    }
}
