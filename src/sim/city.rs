//! Rooftop platforming
//!
//! Walk, jump (with two air jumps), ride out wind gusts, drop presents down
//! chimneys and get back to the sleigh.

use glam::Vec2;
use rand::Rng;

use super::collision::{lands_on, nearest_platform};
use super::effects::{TimedEffect, WindGust, WindWarning, is_active};
use super::level::CityLevel;
use super::machine;
use super::state::{GameEvent, LossCause, Mode, RunState};
use super::tick::HeldInputs;
use crate::consts::{WORLD_H, WORLD_W};
use crate::tuning::Tuning;

/// Respawn this far above the platform top
const RESPAWN_LIFT: f32 = 5.0;

/// Run one city frame
pub fn step(state: &mut RunState, held: &HeldInputs, dt: f32, now: f64, tuning: &Tuning) {
    let Some(mut level) = state.city.take() else {
        return;
    };
    let exit = simulate(state, &mut level, held, dt, now, tuning);
    state.city = Some(level);
    if exit {
        leave_city(state, now, tuning);
    }
}

/// Returns true when the player boarded the sleigh
fn simulate(
    state: &mut RunState,
    level: &mut CityLevel,
    held: &HeldInputs,
    dt: f32,
    now: f64,
    tuning: &Tuning,
) -> bool {
    if !state.effects.ready_active(now) {
        update_wind(state, &level.city_id, now, tuning);
        move_player(state, level, held, dt, now, tuning);
    }

    if state.player.pos.y > WORLD_H && !state.effects.invincible(now) {
        if machine::lose_life(state, LossCause::Fall) {
            return false;
        }
        respawn(state, level, now, tuning);
    }

    deliver_presents(state, level, now, tuning);

    state.can_exit && state.player.rect().overlaps(&level.sleigh)
}

/// Quiet interval, then a warning, then a gust from the warned direction
fn update_wind(state: &mut RunState, city_id: &str, now: f64, tuning: &Tuning) {
    let effects = &state.effects;
    let calm = is_active(&effects.wind_calm, now);
    if effects.wind_gust.is_none() && effects.wind_warning.is_none() && !calm {
        let last = *state.last_gust_at.get_or_insert(now);
        if now - last > tuning.wind_interval(city_id) {
            let direction = if state.rng().random::<f32>() < 0.5 {
                -1.0
            } else {
                1.0
            };
            state.effects.wind_warning = Some(WindWarning {
                direction,
                effect: TimedEffect::new(now, tuning.wind_warning_ms),
            });
            state.events.push(GameEvent::WindWarning { direction });
            log::debug!("Wind warning in {city_id}, direction {direction}");
        }
    }

    let Some(warning) = state.effects.wind_warning else {
        return;
    };
    if warning.effect.elapsed(now) <= warning.effect.duration {
        return;
    }
    let rng = state.rng();
    let strength = tuning.wind_strength_min + rng.random::<f32>() * tuning.wind_strength_spread;
    let duration =
        tuning.wind_duration_min_ms + rng.random::<f64>() * tuning.wind_duration_spread_ms;
    state.effects.wind_warning = None;
    state.effects.wind_gust = Some(WindGust {
        direction: warning.direction,
        strength,
        effect: TimedEffect::new(now, duration),
    });
    state.last_gust_at = Some(now);
    let from = if warning.direction < 0.0 { "right" } else { "left" };
    state
        .effects
        .show_message(format!("Wind from {from}!"), now, tuning.message_ms);
    state.events.push(GameEvent::GustStarted {
        direction: warning.direction,
        strength,
    });
}

fn move_player(
    state: &mut RunState,
    level: &CityLevel,
    held: &HeldInputs,
    dt: f32,
    now: f64,
    tuning: &Tuning,
) {
    let gust = state.effects.wind_gust.filter(|g| g.effect.is_active(now));
    let jump = std::mem::take(&mut state.input.jump_armed);
    let player = &mut state.player;

    if held.left {
        player.vel.x = -tuning.walk_speed;
    } else if held.right {
        player.vel.x = tuning.walk_speed;
    } else {
        player.vel.x *= tuning.walk_damping.powf(dt);
        if player.vel.x.abs() < tuning.walk_snap {
            player.vel.x = 0.0;
        }
    }

    if let Some(gust) = gust {
        let push = gust.direction * gust.strength * dt;
        player.vel.x += push * tuning.wind_velocity_factor;
        player.pos.x += push * tuning.wind_position_factor;
    }

    if jump {
        if player.grounded {
            player.vel.y = tuning.jump_velocity;
            player.grounded = false;
            player.air_jumps_used = 0;
        } else if player.air_jumps_used < tuning.air_jumps {
            player.vel.y = tuning.jump_velocity;
            player.air_jumps_used += 1;
        }
    }

    player.vel.y = (player.vel.y + tuning.gravity * dt).min(tuning.max_fall);
    player.pos += player.vel * dt;
    player.pos.x = player.pos.x.clamp(0.0, WORLD_W - player.size.x);

    player.grounded = false;
    for platform in &level.platforms {
        if lands_on(&player.rect(), player.vel.y, dt, &platform.rect) {
            player.pos.y = platform.rect.top() - player.size.y;
            player.vel.y = 0.0;
            player.grounded = true;
            player.air_jumps_used = 0;
        }
    }
}

/// Put the player back on the rooftop nearest to where they fell
fn respawn(state: &mut RunState, level: &CityLevel, now: f64, tuning: &Tuning) {
    let platforms = level.platform_rects();
    let target = nearest_platform(&platforms, state.player.pos.x)
        .map(|i| platforms[i])
        .map(|p| {
            Vec2::new(
                p.center_x() - state.player.size.x / 2.0,
                p.top() - state.player.size.y - RESPAWN_LIFT,
            )
        })
        .unwrap_or(level.spawn);

    state.player.reset_to(target);
    state.player.grounded = true;
    state.effects.start_respawn(now, tuning);
    state.effects.wind_calm = Some(TimedEffect::new(now, tuning.wind_calm_ms));
    state.effects.clear_wind();
    state
        .effects
        .show_message("Fell! Respawning...", now, tuning.message_ms);
}

fn deliver_presents(state: &mut RunState, level: &mut CityLevel, now: f64, tuning: &Tuning) {
    let body = state.player.rect();
    for chimney in level.chimneys.iter_mut().filter(|c| !c.delivered) {
        if !body.overlaps(&chimney.rect) {
            continue;
        }
        chimney.delivered = true;
        state.delivered += 1;
        log::debug!("Present down chimney {}", chimney.id);
        state.events.push(GameEvent::ChimneyDelivered {
            id: chimney.id,
            delivered: state.delivered,
        });
        state.effects.show_message(
            format!("Present! ({}/{})", state.delivered, tuning.presents_needed),
            now,
            tuning.message_ms,
        );
        if state.delivered >= tuning.presents_needed && !state.can_exit {
            state.energy = tuning.max_energy;
            state.can_exit = true;
            state.effects.show_message(
                "All delivered! Return to sleigh!",
                now,
                tuning.message_extra_long_ms,
            );
            state.events.push(GameEvent::AllDelivered);
            log::info!("All presents delivered in {}", level.city_id);
        }
    }
}

/// Board the sleigh: on to the next flight, the interstitial, or the win
fn leave_city(state: &mut RunState, now: f64, tuning: &Tuning) {
    let completed = state.stage().map(|s| s.id);
    state.goodies.clear();
    state.last_goody_at = now;

    if completed == Some(tuning.interstitial_city.as_str()) {
        state.stage_index += 1;
        state.effects.interstitial = None;
        state.set_mode(Mode::DcInterstitial);
    } else {
        machine::advance_stage(state, now, tuning);
    }
}
