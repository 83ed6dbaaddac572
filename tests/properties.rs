//! Randomized frame sequences against the run invariants

use proptest::prelude::*;

use sleigh_run::Tuning;
use sleigh_run::sim::{
    Command, FlightLevel, HeldInputs, Mode, RunState, TickInput, TimedEffect, apply_command,
    enter_stage, generate_city, generate_flight, tick,
};

/// One host frame: delta in ms, held-flag bits, and whether to press clear fog
fn frames() -> impl Strategy<Value = Vec<(f64, u8, bool)>> {
    prop::collection::vec((1.0f64..120.0, 0u8..64, prop::bool::weighted(0.05)), 1..600)
}

fn held_from_bits(bits: u8) -> HeldInputs {
    HeldInputs {
        up: bits & 1 != 0,
        down: bits & 2 != 0,
        left: bits & 4 != 0,
        right: bits & 8 != 0,
        action: bits & 16 != 0,
        clear_fog: bits & 32 != 0,
    }
}

fn started(seed: u64, stage: usize, tuning: &Tuning) -> RunState {
    let mut state = RunState::new(seed, tuning);
    apply_command(&mut state, Command::StartGame, 0.0, tuning);
    apply_command(&mut state, Command::StartStage, 0.0, tuning);
    if stage > 0 {
        enter_stage(&mut state, stage, 0.0, tuning);
    }
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn energy_stays_in_bounds_and_lives_never_grow(
        seed in any::<u64>(),
        stage in 0usize..9,
        frames in frames(),
    ) {
        let tuning = Tuning::default();
        let mut state = started(seed, stage, &tuning);
        let mut now = 0.0;
        let mut lives = state.lives;
        for (delta, bits, clear) in frames {
            now += delta;
            let commands = if clear { vec![Command::ClearFog] } else { Vec::new() };
            tick(&mut state, &TickInput { now, held: held_from_bits(bits), commands }, &tuning);
            prop_assert!((0.0..=tuning.max_energy).contains(&state.energy));
            prop_assert!(state.lives <= lives);
            lives = state.lives;
        }
    }

    #[test]
    fn ready_window_freezes_the_player(
        seed in any::<u64>(),
        stage in 0usize..9,
        frames in frames(),
    ) {
        let tuning = Tuning::default();
        let mut state = started(seed, stage, &tuning);
        let mut now = 0.0;
        for (delta, bits, _) in frames {
            now += delta;
            let before = state.clone();
            tick(&mut state, &TickInput { now, held: held_from_bits(bits), commands: Vec::new() }, &tuning);
            let same_stage = before.mode == state.mode
                && before.stage_index == state.stage_index
                && before.lives == state.lives;
            if before.effects.ready_active(now) && same_stage {
                prop_assert_eq!(before.player.pos, state.player.pos);
                prop_assert_eq!(before.scroll_x, state.scroll_x);
            }
        }
    }

    #[test]
    fn respawn_lands_on_the_stage_respawn_point(
        seed in any::<u64>(),
        stage in 0usize..9,
        frames in frames(),
    ) {
        let tuning = Tuning::default();
        let mut state = started(seed, stage, &tuning);
        let mut now = 0.0;
        for (delta, bits, _) in frames {
            now += delta;
            let lives = state.lives;
            tick(&mut state, &TickInput { now, held: held_from_bits(bits), commands: Vec::new() }, &tuning);
            if state.lives < lives && state.mode != Mode::GameOver {
                let ready = state.effects.ready.unwrap();
                let invincible = state.effects.invincibility.unwrap();
                prop_assert!(invincible.is_active(now));
                prop_assert!(invincible.duration >= ready.duration);
                match state.mode {
                    Mode::Flight => prop_assert_eq!(state.player.pos, tuning.flight_spawn),
                    Mode::City => {
                        let city = state.city.as_ref().unwrap();
                        let on_a_roof = city.platforms.iter().any(|p| {
                            (state.player.pos.x - (p.rect.center_x() - 12.5)).abs() < 1e-3
                                && (state.player.pos.y - (p.rect.top() - 20.0)).abs() < 1e-3
                        });
                        prop_assert!(on_a_roof);
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn cleared_fog_never_costs_energy(
        frames in frames(),
        fog_x in 0.0f32..400.0,
    ) {
        let tuning = Tuning::default();
        let mut state = started(9, 0, &tuning);
        state.effects.ready = None;
        state.effects.invincibility = Some(TimedEffect::new(0.0, f64::MAX));
        state.energy = 50.0;
        state.last_goody_at = f64::MAX;
        let level: &mut FlightLevel = state.flight.as_mut().unwrap();
        level.ground.clear();
        level.airborne.clear();
        for fog in &mut level.fogs {
            fog.cleared = true;
        }
        level.fogs.push(sleigh_run::sim::level::FogBand { x: fog_x, width: 300.0, cleared: true });

        let mut now = 0.0;
        for (delta, bits, _) in frames {
            now += delta;
            // No thrust, so the only way to lose energy would be fog
            let held = HeldInputs { action: false, ..held_from_bits(bits) };
            tick(&mut state, &TickInput { now, held, commands: Vec::new() }, &tuning);
            if state.mode != Mode::Flight || state.stage_index != 0 {
                break;
            }
            prop_assert_eq!(state.energy, 50.0);
        }
    }

    #[test]
    fn layouts_depend_only_on_the_stage_id(id in "[a-z_]{1,12}") {
        prop_assert_eq!(generate_flight(&id, 3000.0), generate_flight(&id, 3000.0));
        prop_assert_eq!(generate_city(&id), generate_city(&id));
    }
}
