//! Campaign mode machine
//!
//! Owns every transition between modes and stages: command handling, stage
//! entry, life loss, and the terminal states.

use super::effects::TimedEffect;
use super::generate::{generate_city, generate_flight};
use super::state::{GameEvent, LossCause, Mode, RunState, STAGES, StageKind};
use super::tick::Command;
use crate::tuning::Tuning;

/// Apply one host command. Commands that make no sense in the current mode
/// are ignored.
pub fn apply_command(state: &mut RunState, command: Command, now: f64, tuning: &Tuning) {
    match (command, state.mode) {
        (Command::StartGame, Mode::Title) => state.set_mode(Mode::Intro),
        (Command::StartStage, Mode::Intro) => start_run(state, now, tuning),
        (Command::ClearFog, Mode::Flight) => state.input.clear_fog_armed = true,
        (Command::TogglePause, mode) if mode.is_playing() => {
            state.paused = !state.paused;
            log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
        }
        (Command::Restart, mode) if mode.is_terminal() => reset_run(state, tuning),
        (Command::ConfirmInterstitial, Mode::DcInterstitial) => {
            if state.effects.interstitial.is_none() {
                state.effects.interstitial = Some(TimedEffect::new(now, tuning.interstitial_ms));
            }
        }
        (command, mode) => log::debug!("Ignoring {command:?} in {mode:?}"),
    }
}

/// Fresh run from the first stage
pub fn start_run(state: &mut RunState, now: f64, tuning: &Tuning) {
    state.lives = tuning.starting_lives;
    state.energy = tuning.max_energy;
    state.score = 0;
    state.stage_index = 0;
    state.paused = false;
    state.collected.clear();
    state.last_goody_at = 0.0;
    state.last_frame_at = None;
    state.effects = Default::default();
    log::info!("Starting run (seed {})", state.seed);
    enter_stage(state, 0, now, tuning);
}

/// Back to the title screen with every run field reset
pub fn reset_run(state: &mut RunState, tuning: &Tuning) {
    let mut fresh = RunState::new(state.seed, tuning);
    // Keep the random stream moving so consecutive runs differ
    std::mem::swap(fresh.rng(), state.rng());
    fresh.events = std::mem::take(&mut state.events);
    let from = state.mode;
    *state = fresh;
    state.mode = from;
    state.set_mode(Mode::Title);
}

/// Enter the stage at `index`, dispatching on its kind. Running off the end
/// of the campaign wins.
pub fn enter_stage(state: &mut RunState, index: usize, now: f64, tuning: &Tuning) {
    debug_assert!(index >= state.stage_index);
    state.stage_index = index;
    let Some(stage) = STAGES.get(index) else {
        win(state);
        return;
    };

    log::info!("Entering stage {index}: {}", stage.name);
    state.goodies.clear();
    state.effects.clear_wind();
    state.effects.fog_pause = None;
    state.effects.beam = None;
    state.effects.dissolving_fogs.clear();
    state.effects.interstitial = None;
    state.in_shaft = false;
    state.player.grounded = false;
    state.input.disarm();

    match stage.kind {
        StageKind::Flight => {
            state.city = None;
            state.flight = Some(generate_flight(stage.id, tuning.flight_length));
            state.scroll_x = 0.0;
            state.player.reset_to(tuning.flight_spawn);
            state.effects.start_ready(now, tuning);
            state.set_mode(Mode::Flight);
        }
        StageKind::City => {
            let level = generate_city(stage.id);
            state.player.reset_to(level.spawn);
            state.player.grounded = true;
            state.city = Some(level);
            state.flight = None;
            state.delivered = 0;
            state.can_exit = false;
            state.last_gust_at = None;
            state.last_goody_at = now;
            state.effects.wind_calm = Some(TimedEffect::new(now, tuning.wind_calm_ms));
            state.effects.start_ready(now, tuning);
            state.set_mode(Mode::City);
        }
    }
    state.events.push(GameEvent::StageEntered { index });
}

/// Move on to the stage after the current one
pub fn advance_stage(state: &mut RunState, now: f64, tuning: &Tuning) {
    let next = state.stage_index + 1;
    enter_stage(state, next, now, tuning);
}

/// Take a life. Returns true when that was the last one and the run is over.
pub fn lose_life(state: &mut RunState, cause: LossCause) -> bool {
    state.lives = state.lives.saturating_sub(1);
    log::info!("Life lost ({cause:?}), {} left", state.lives);
    state.events.push(GameEvent::LifeLost {
        cause,
        lives_left: state.lives,
    });
    if state.lives == 0 {
        state.events.push(GameEvent::GameOver { score: state.score });
        state.set_mode(Mode::GameOver);
        true
    } else {
        false
    }
}

pub fn win(state: &mut RunState) {
    log::info!("Campaign complete, score {}", state.score);
    state.events.push(GameEvent::Won { score: state.score });
    state.set_mode(Mode::Win);
}

/// Interstitial screen: once the confirmed countdown runs out, fly on
pub fn resolve_interstitial(state: &mut RunState, now: f64, tuning: &Tuning) {
    if state
        .effects
        .interstitial
        .is_some_and(|countdown| !countdown.is_active(now))
    {
        state.effects.interstitial = None;
        enter_stage(state, state.stage_index, now, tuning);
    }
}
