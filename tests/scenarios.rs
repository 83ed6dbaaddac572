//! End-to-end runs through the public simulation API

use sleigh_run::Tuning;
use sleigh_run::sim::{
    Command, GameEvent, HeldInputs, Mode, RunState, TickInput, TimedEffect, apply_command,
    enter_stage, tick,
};

const FRAME_MS: f64 = 16.67;

fn started(seed: u64, tuning: &Tuning) -> RunState {
    let mut state = RunState::new(seed, tuning);
    apply_command(&mut state, Command::StartGame, 0.0, tuning);
    apply_command(&mut state, Command::StartStage, 0.0, tuning);
    state
}

fn frame(now: f64, held: HeldInputs) -> TickInput {
    TickInput {
        now,
        held,
        commands: Vec::new(),
    }
}

#[test]
fn thrust_approaches_max_rise_without_exceeding_it() {
    let tuning = Tuning::default();
    let mut state = started(1, &tuning);
    assert_eq!(state.stage().map(|s| s.id), Some("northpole"));
    let held = HeldInputs {
        action: true,
        ..Default::default()
    };

    let mut now = 0.0;
    // Ready window: nothing moves
    while now <= tuning.ready_ms {
        tick(&mut state, &frame(now, held), &tuning);
        assert_eq!(state.player.vel.y, 0.0);
        now += FRAME_MS;
    }

    let mut previous = state.player.vel.y;
    for _ in 0..40 {
        tick(&mut state, &frame(now, held), &tuning);
        let vy = state.player.vel.y;
        assert!(vy >= tuning.max_rise, "vy {vy} exceeded max rise");
        assert!(vy <= previous, "thrust should only accelerate upward");
        previous = vy;
        now += FRAME_MS;
    }
    assert_eq!(state.lives, 10);
    assert_eq!(state.player.vel.y, tuning.max_rise);
    assert!(state.energy < 100.0);
}

#[test]
fn nashville_gust_keeps_the_warned_direction() {
    let tuning = Tuning::default();
    let mut state = started(2, &tuning);
    enter_stage(&mut state, 7, 0.0, &tuning);
    assert_eq!(state.city.as_ref().map(|c| c.city_id.as_str()), Some("nashville"));

    let mut warning = None;
    let mut now = 0.0;
    while now < 20_000.0 {
        tick(&mut state, &frame(now, HeldInputs::default()), &tuning);
        if warning.is_none() {
            warning = state.effects.wind_warning;
        }
        if let Some(gust) = state.effects.wind_gust {
            let warned = warning.expect("gust without a warning");
            assert_eq!(gust.direction, warned.direction);
            let lead = gust.effect.started_at - warned.effect.started_at;
            assert!(lead > tuning.wind_warning_ms);
            assert!(lead <= tuning.wind_warning_ms + FRAME_MS + 1e-6);
            assert!(state.events.iter().any(|e| matches!(
                e,
                GameEvent::GustStarted { direction, .. } if *direction == warned.direction
            )));
            return;
        }
        now += FRAME_MS;
    }
    panic!("no gust within 20s");
}

#[test]
fn final_landing_pays_a_thousand_per_life() {
    let tuning = Tuning::default();
    let mut state = started(3, &tuning);
    enter_stage(&mut state, 8, 0.0, &tuning);
    state.effects.ready = None;
    state.effects.invincibility = Some(TimedEffect::new(0.0, 60_000.0));
    state.lives = 4;
    state.score = 2500;
    state.last_goody_at = 100.0;

    let landing = state.flight.as_ref().unwrap().landing;
    state.scroll_x = landing.left() - state.player.pos.x;
    state.player.pos.y = landing.top() + 10.0;

    tick(&mut state, &frame(100.0, HeldInputs::default()), &tuning);
    assert_eq!(state.mode, Mode::Win);
    assert_eq!(state.score, 2500 + 4 * 1000);
    assert!(state.events.contains(&GameEvent::Won { score: 6500 }));
}

#[test]
fn campaign_reaches_the_interstitial_and_flies_on() {
    let tuning = Tuning::default();
    let mut state = started(4, &tuning);
    enter_stage(&mut state, 5, 0.0, &tuning);
    state.effects.ready = None;
    state.can_exit = true;
    state.player.pos = state.city.as_ref().unwrap().sleigh.pos;
    state.last_goody_at = 1000.0;

    tick(&mut state, &frame(1000.0, HeldInputs::default()), &tuning);
    assert_eq!(state.mode, Mode::DcInterstitial);

    // Nothing happens until the player confirms
    tick(&mut state, &frame(9000.0, HeldInputs::default()), &tuning);
    assert_eq!(state.mode, Mode::DcInterstitial);

    let confirm = TickInput {
        now: 9100.0,
        held: HeldInputs::default(),
        commands: vec![Command::ConfirmInterstitial],
    };
    tick(&mut state, &confirm, &tuning);
    assert_eq!(state.mode, Mode::DcInterstitial);
    tick(&mut state, &frame(12_100.0, HeldInputs::default()), &tuning);
    assert_eq!(state.mode, Mode::Flight);
    assert_eq!(state.stage().map(|s| s.id), Some("to_nash"));
    assert!(state.effects.ready_active(12_100.0));
}

#[test]
fn restart_after_game_over_refills_lives() {
    let tuning = Tuning::default();
    let mut state = started(5, &tuning);
    state.lives = 1;
    state.effects.ready = None;
    state.player.pos.y = 495.0;

    tick(&mut state, &frame(100.0, HeldInputs::default()), &tuning);
    assert_eq!(state.mode, Mode::GameOver);
    assert_eq!(state.lives, 0);

    let restart = TickInput {
        now: 200.0,
        held: HeldInputs::default(),
        commands: vec![Command::Restart, Command::StartGame, Command::StartStage],
    };
    tick(&mut state, &restart, &tuning);
    assert_eq!(state.mode, Mode::Flight);
    assert_eq!(state.lives, 10);
    assert_eq!(state.score, 0);
    assert_eq!(state.stage_index, 0);
}
