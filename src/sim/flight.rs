//! Side-scrolling flight physics
//!
//! Order per frame: shaft latch, scroll and fog drift, forces and movement
//! (all frozen during the ready window), fog clearing, fog contact, ground,
//! obstacles, landing zone, end of stage.

use glam::Vec2;

use super::effects::{Beam, DissolvingFog, TimedEffect, Zap, is_active};
use super::level::FlightLevel;
use super::machine;
use super::state::{GameEvent, LossCause, RunState};
use super::tick::HeldInputs;
use crate::consts::WORLD_W;
use crate::tuning::Tuning;

/// Obstacles further than this outside the screen are not tested
const OFFSCREEN_MARGIN: f32 = 100.0;

/// How a flight frame ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Flying,
    Crashed(LossCause),
    Landed,
    PastEnd,
}

/// Run one flight frame
pub fn step(state: &mut RunState, held: &HeldInputs, dt: f32, now: f64, tuning: &Tuning) {
    let Some(mut level) = state.flight.take() else {
        return;
    };
    let outcome = simulate(state, &mut level, held, dt, now, tuning);
    state.flight = Some(level);

    match outcome {
        Outcome::Flying => {}
        Outcome::Crashed(cause) => crash(state, cause, now, tuning),
        Outcome::Landed => land(state, now, tuning),
        Outcome::PastEnd => machine::advance_stage(state, now, tuning),
    }
}

fn simulate(
    state: &mut RunState,
    level: &mut FlightLevel,
    held: &HeldInputs,
    dt: f32,
    now: f64,
    tuning: &Tuning,
) -> Outcome {
    let ready = state.effects.ready_active(now);

    if let Some(shaft) = &level.shaft
        && shaft.x - state.scroll_x < tuning.shaft_trigger_x
        && !state.in_shaft
    {
        log::debug!("Shaft latched at scroll {:.0}", state.scroll_x);
        state.in_shaft = true;
    }

    if !ready {
        if !state.in_shaft {
            state.scroll_x += tuning.scroll_speed * dt;
        }
        drift_fog(state, level, dt, now, tuning);
        apply_forces(state, held, dt, now, tuning);
    }

    if std::mem::take(&mut state.input.clear_fog_armed) {
        clear_nearest_fog(state, level, now, tuning);
    }
    touch_fog(state, level, now, tuning);

    let protected = ready || state.effects.invincible(now);
    let player = &mut state.player;
    if player.rect().bottom() > tuning.ground_y {
        if !protected {
            return Outcome::Crashed(LossCause::Ground);
        }
        player.pos.y = tuning.ground_y - player.size.y;
        player.vel.y = 0.0;
    }
    if player.pos.y < tuning.ceiling_y {
        player.pos.y = tuning.ceiling_y;
        player.vel.y = 0.0;
    }

    if !protected && let Some(cause) = hit_obstacle(state, level, dt, now) {
        return Outcome::Crashed(cause);
    }

    let body = state.player.rect();
    if body.overlaps(&level.landing.shifted(state.scroll_x)) {
        return Outcome::Landed;
    }
    if state.scroll_x > level.length {
        return Outcome::PastEnd;
    }
    Outcome::Flying
}

/// Fog drift and the soft-gravity window it opens
fn drift_fog(state: &mut RunState, level: &mut FlightLevel, dt: f32, now: f64, tuning: &Tuning) {
    for fog in level.fogs.iter_mut().filter(|f| !f.cleared) {
        fog.x -= tuning.fog_speed * dt;
    }
    let on_screen = level.fogs.iter().filter(|f| !f.cleared).any(|f| {
        let x = f.screen_x(state.scroll_x);
        x < WORLD_W && x + f.width > 0.0
    });
    if !on_screen {
        state.effects.fog_pause = None;
    } else if state.effects.fog_pause.is_none() {
        state.effects.fog_pause = Some(TimedEffect::new(now, tuning.fog_pause_ms));
    }
}

fn apply_forces(state: &mut RunState, held: &HeldInputs, dt: f32, now: f64, tuning: &Tuning) {
    let gravity_scale = if is_active(&state.effects.fog_pause, now) {
        tuning.fog_gravity_scale
    } else {
        1.0
    };
    let player = &mut state.player;

    if held.action && state.energy > 0.0 {
        player.vel.y -= tuning.thrust * dt;
        state.energy = (state.energy - tuning.energy_drain * dt).max(0.0);
    }
    player.vel.y += tuning.gravity * gravity_scale * dt;
    if held.up {
        player.vel.y -= tuning.flight_trim * dt;
    }
    if held.down {
        player.vel.y += tuning.flight_trim * dt;
    }
    if held.left {
        player.pos.x = (player.pos.x - tuning.flight_move_speed * dt).max(tuning.flight_min_x);
    }
    if held.right {
        player.pos.x = (player.pos.x + tuning.flight_move_speed * dt).min(tuning.flight_max_x);
    }

    player.vel.y = player.vel.y.clamp(tuning.max_rise, tuning.max_fall);
    player.pos.y += player.vel.y * dt;
}

/// Clear the nearest uncleared band ahead of the player
fn clear_nearest_fog(state: &mut RunState, level: &mut FlightLevel, now: f64, tuning: &Tuning) {
    let scroll = state.scroll_x;
    let px = state.player.pos.x;
    let target = level
        .fogs
        .iter_mut()
        .filter(|f| !f.cleared && f.screen_x(scroll) > px)
        .min_by(|a, b| a.x.total_cmp(&b.x));
    let Some(fog) = target else {
        log::debug!("Clear fog: nothing ahead");
        return;
    };

    fog.cleared = true;
    let target_x = fog.screen_x(scroll);
    state.effects.beam = Some(Beam {
        target_x,
        effect: TimedEffect::new(now, tuning.beam_ms),
    });
    state.effects.dissolving_fogs.push(DissolvingFog {
        x: fog.x,
        width: fog.width,
        effect: TimedEffect::new(now, tuning.dissolve_ms),
    });
    state.events.push(GameEvent::FogCleared { x: fog.x });
    log::debug!("Cleared fog at {:.0}", fog.x);
}

/// Flying into a band costs energy once, then the band is spent
fn touch_fog(state: &mut RunState, level: &mut FlightLevel, now: f64, tuning: &Tuning) {
    let body = state.player.rect();
    for fog in level.fogs.iter_mut().filter(|f| !f.cleared) {
        if fog.overlaps_span(state.scroll_x, body.left(), body.right()) {
            fog.cleared = true;
            state.energy = (state.energy - tuning.fog_penalty).max(0.0);
            state.effects.show_message(
                format!("Fog! Energy -{}%", tuning.fog_penalty),
                now,
                tuning.message_ms,
            );
            state.events.push(GameEvent::FogHit);
            log::debug!("Flew into fog, energy {:.0}", state.energy);
        }
    }
}

/// First obstacle the player touches, ground obstacles before airborne ones.
/// Airborne obstacles only move while collisions are being tested.
fn hit_obstacle(
    state: &RunState,
    level: &mut FlightLevel,
    dt: f32,
    now: f64,
) -> Option<LossCause> {
    let body = state.player.rect();
    let scroll = state.scroll_x;
    let visible = |x: f32, w: f32| x <= WORLD_W + OFFSCREEN_MARGIN && x + w >= -OFFSCREEN_MARGIN;

    for obstacle in &level.ground {
        let rect = obstacle.rect().shifted(scroll);
        if visible(rect.left(), rect.size.x) && body.overlaps(&rect) {
            return Some(LossCause::Obstacle(obstacle.kind()));
        }
    }
    for obstacle in &mut level.airborne {
        obstacle.advance(dt, now);
        let rect = obstacle.rect().shifted(scroll);
        if visible(rect.left(), rect.size.x) && body.overlaps(&rect) {
            return Some(LossCause::Obstacle(obstacle.kind()));
        }
    }
    if state.in_shaft
        && let Some(shaft) = &level.shaft
    {
        for tree in [&shaft.left_tree, &shaft.right_tree] {
            if body.overlaps(&tree.shifted(scroll)) {
                return Some(LossCause::ShaftTree);
            }
        }
    }
    None
}

/// Lose a life and restart the stage from its beginning
fn crash(state: &mut RunState, cause: LossCause, now: f64, tuning: &Tuning) {
    if machine::lose_life(state, cause) {
        return;
    }

    state.scroll_x = 0.0;
    state.in_shaft = false;
    state.energy = tuning.max_energy;
    state.player.reset_to(tuning.flight_spawn);
    state.effects.start_respawn(now, tuning);

    let (text, origin) = match cause {
        LossCause::Ground => (
            "Hit ground! Restarting stage...".to_string(),
            Vec2::new(tuning.flight_spawn.x, tuning.ground_y),
        ),
        LossCause::Obstacle(kind) => (
            format!("Hit {}! Restarting stage...", kind.as_str()),
            tuning.flight_spawn,
        ),
        LossCause::ShaftTree | LossCause::Fall => {
            ("Hit tree! Restarting...".to_string(), tuning.flight_spawn)
        }
    };
    state.effects.zap = Some(Zap {
        origin,
        effect: TimedEffect::new(now, tuning.zap_ms),
    });
    state.effects.show_message(text, now, tuning.message_long_ms);
}

/// Touched the landing zone
fn land(state: &mut RunState, now: f64, tuning: &Tuning) {
    if state.stage().is_some_and(|s| s.is_final) {
        state.score += state.lives as u64 * tuning.points_per_life;
        machine::win(state);
        return;
    }

    let points = state.energy.round() as u64 * tuning.points_per_energy;
    state.score += points;
    log::info!("Landed with {:.0} energy, +{points}", state.energy);
    state.events.push(GameEvent::Landed { points });
    machine::advance_stage(state, now, tuning);
    state
        .effects
        .show_message(format!("Landed! +{points} pts!"), now, tuning.message_long_ms);
}
